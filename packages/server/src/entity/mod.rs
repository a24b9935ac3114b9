pub mod blacklisted_token;
pub mod event;
pub mod event_file;
pub mod gym_gallery;
pub mod live_update;
pub mod live_update_file;
pub mod site_info;
pub mod testimonial;
pub mod user;
