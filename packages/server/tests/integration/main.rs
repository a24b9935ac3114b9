mod auth;
mod event;
mod gallery;
mod live_update;
mod media;
mod site_info;
mod testimonial;
