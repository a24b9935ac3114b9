use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .merge(site_info_edit_routes())
        .merge(media_routes())
        .nest("/site_info", site_info_routes())
        .nest("/testimonials", testimonial_routes())
        .nest("/gallery", gallery_routes())
        .nest("/live-updates", live_update_routes())
        .nest("/events", event_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::refresh))
        .routes(routes!(handlers::auth::logout))
        .routes(routes!(handlers::auth::me))
}

fn media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::media::upload_signature))
}

fn site_info_edit_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::site_info::get_edit,
        handlers::site_info::put_edit
    ))
}

fn site_info_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::site_info::list_site_info,
            handlers::site_info::create_site_info
        ))
        .routes(routes!(
            handlers::site_info::get_site_info,
            handlers::site_info::replace_site_info,
            handlers::site_info::update_site_info
        ))
}

fn testimonial_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::testimonial::list_testimonials,
            handlers::testimonial::create_testimonial
        ))
        .routes(routes!(
            handlers::testimonial::get_testimonial,
            handlers::testimonial::replace_testimonial,
            handlers::testimonial::update_testimonial,
            handlers::testimonial::delete_testimonial
        ))
}

fn gallery_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::gallery::list_gallery,
            handlers::gallery::create_entry
        ))
        .routes(routes!(
            handlers::gallery::get_entry,
            handlers::gallery::replace_entry,
            handlers::gallery::update_entry,
            handlers::gallery::delete_entry
        ))
}

fn live_update_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::live_update::list_live_updates,
            handlers::live_update::create_live_update
        ))
        .routes(routes!(
            handlers::live_update::get_live_update,
            handlers::live_update::replace_live_update,
            handlers::live_update::update_live_update,
            handlers::live_update::delete_live_update
        ))
        .routes(routes!(handlers::live_update::delete_live_update_file))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::event::list_events,
            handlers::event::create_event
        ))
        .routes(routes!(
            handlers::event::get_event,
            handlers::event::replace_event,
            handlers::event::update_event,
            handlers::event::delete_event
        ))
        .routes(routes!(handlers::event::delete_event_photo))
}
