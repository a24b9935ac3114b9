mod v1;

use axum::extract::DefaultBodyLimit;
use utoipa_axum::router::OpenApiRouter;

use crate::config::AppConfig;
use crate::state::AppState;

/// Room for several attachments plus the text fields of a multipart body.
const MAX_FILES_PER_REQUEST: usize = 10;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let body_limit = config
        .media
        .max_upload_size
        .saturating_mul(MAX_FILES_PER_REQUEST);

    OpenApiRouter::new()
        .nest("/v1", v1::routes())
        .layer(DefaultBodyLimit::max(body_limit))
}
