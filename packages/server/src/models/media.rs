use serde::Serialize;

/// Everything a trusted client needs to upload straight to the media store.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadSignatureResponse {
    /// Hex digest over `folder` and `timestamp`.
    pub signature: String,
    /// Unix seconds the signature was computed at.
    #[schema(example = 1712345678)]
    pub timestamp: i64,
    pub api_key: String,
    pub cloud_name: String,
    #[schema(example = "gym_gallery")]
    pub folder: String,
}
