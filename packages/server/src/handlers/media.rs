use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::media::UploadSignatureResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/cloudinary-signature",
    tag = "Media",
    operation_id = "getUploadSignature",
    summary = "Sign a direct gallery upload",
    description = "Returns a signature over the gallery folder and the current Unix time so the \
        client can upload straight to the media store. The resulting delivery URL is then \
        submitted as a gallery `image`.",
    responses(
        (status = 200, description = "Upload signature", body = UploadSignatureResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn upload_signature(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UploadSignatureResponse>, AppError> {
    let timestamp = chrono::Utc::now().timestamp();
    let folder = state.config.media.folders.gallery.clone();

    let signature = state.media.sign_upload(&folder, timestamp);
    let credentials = state.media.credentials();

    Ok(Json(UploadSignatureResponse {
        signature,
        timestamp,
        api_key: credentials.api_key,
        cloud_name: credentials.cloud_name,
        folder,
    }))
}
