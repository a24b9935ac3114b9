use serde::{Deserialize, Serialize};

use super::shared::{REQUIRED, Validator};
use crate::error::AppError;

/// Request body for obtaining a token pair.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "frontdesk")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    let mut v = Validator::new();
    if payload.username.trim().is_empty() {
        v.error("username", REQUIRED);
    }
    if payload.password.is_empty() {
        v.error("password", REQUIRED);
    }
    v.finish()
}

/// Body of the refresh endpoint. The refresh token normally travels in the
/// `refresh_token` cookie; the body field is read only when the cookie is absent.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Body of the logout endpoint.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct LogoutRequest {
    /// Refresh token to revoke. Falls back to the cookie when omitted.
    pub refresh: Option<String>,
}

/// Access token response. The refresh token is only ever sent as a cookie.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AccessTokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DetailResponse {
    #[schema(example = "Successfully logged out.")]
    pub detail: String,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub username: String,
    pub is_staff: bool,
}
