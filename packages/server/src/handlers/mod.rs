pub mod auth;
pub mod event;
pub mod gallery;
pub mod live_update;
pub mod media;
pub mod site_info;
pub mod testimonial;
