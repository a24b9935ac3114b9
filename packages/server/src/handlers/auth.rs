use axum::{Json, body::Bytes, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::*;
use tracing::instrument;

use crate::blacklist;
use crate::config::AuthConfig;
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AccessTokenResponse, DetailResponse, LoginRequest, LogoutRequest, MeResponse, RefreshRequest,
    validate_login_request,
};
use crate::models::shared::REQUIRED;
use crate::state::AppState;
use crate::utils::{hash, jwt};

/// Build the HttpOnly cookie carrying a refresh token.
fn refresh_cookie(auth: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((auth.cookie.name.clone(), token))
        .http_only(true)
        .secure(auth.cookie.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(auth.refresh_ttl_days))
        .build()
}

fn parse_optional_body<T: serde::de::DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::Validation(e.to_string()))
}

#[utoipa::path(
    post,
    path = "/token",
    tag = "Auth",
    operation_id = "obtainToken",
    summary = "Log in",
    description = "Exchanges credentials for an access token. The refresh token is not part of \
        the body; it is set as an HttpOnly, SameSite=Lax `refresh_token` cookie.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AccessTokenResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<AccessTokenResponse>), AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.trim()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid || !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    let auth = &state.config.auth;
    let pair = jwt::sign_pair(user.id, &user.username, user.is_staff, auth)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok((
        jar.add(refresh_cookie(auth, pair.refresh)),
        Json(AccessTokenResponse { access: pair.access }),
    ))
}

#[utoipa::path(
    post,
    path = "/token/refresh",
    tag = "Auth",
    operation_id = "refreshToken",
    summary = "Rotate the refresh token",
    description = "Reads the refresh token from the `refresh_token` cookie, or from the `refresh` \
        body field when no cookie is present. The presented token is revoked and a new one is \
        set as the cookie; a new access token is returned in the body.",
    request_body(content = RefreshRequest, description = "Optional when the cookie is sent"),
    responses(
        (status = 200, description = "Token refreshed", body = AccessTokenResponse),
        (status = 400, description = "No refresh token presented (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid, expired or revoked token (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, body))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<AccessTokenResponse>), AppError> {
    let auth = &state.config.auth;

    let presented = match jar.get(&auth.cookie.name) {
        Some(cookie) => cookie.value().to_string(),
        None => parse_optional_body::<RefreshRequest>(&body)?
            .refresh
            .ok_or_else(|| AppError::field("refresh", REQUIRED))?,
    };

    let claims = jwt::verify(&presented, jwt::TokenType::Refresh, &auth.jwt_secret)
        .map_err(|_| AppError::TokenInvalid)?;

    let user = user::Entity::find_by_id(claims.uid)
        .one(&state.db)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::TokenInvalid)?;

    // Rotation: a refresh token is good for exactly one exchange.
    if !blacklist::blacklist(&state.db, &claims).await? {
        tracing::warn!(user_id = user.id, "Revoked refresh token presented");
        return Err(AppError::TokenInvalid);
    }

    let pair = jwt::sign_pair(user.id, &user.username, user.is_staff, auth)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok((
        jar.add(refresh_cookie(auth, pair.refresh)),
        Json(AccessTokenResponse { access: pair.access }),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Revoke a refresh token",
    description = "Blacklists the refresh token given as `refresh` (or, when omitted, the one in \
        the cookie) and clears the cookie.",
    request_body(content = LogoutRequest, description = "Optional when the cookie is sent"),
    responses(
        (status = 200, description = "Logged out", body = DetailResponse),
        (status = 400, description = "Invalid token (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, jar, body), fields(user_id = auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<DetailResponse>), AppError> {
    let auth = &state.config.auth;
    let invalid = || AppError::Validation("Invalid token.".into());

    let presented = parse_optional_body::<LogoutRequest>(&body)?
        .refresh
        .or_else(|| jar.get(&auth.cookie.name).map(|c| c.value().to_string()))
        .ok_or_else(invalid)?;

    let claims = jwt::verify(&presented, jwt::TokenType::Refresh, &auth.jwt_secret)
        .map_err(|_| invalid())?;
    if claims.uid != auth_user.user_id {
        return Err(invalid());
    }
    if !blacklist::blacklist(&state.db, &claims).await? {
        return Err(invalid());
    }

    let removal = Cookie::build(auth.cookie.name.clone()).path("/").build();
    Ok((
        jar.remove(removal),
        Json(DetailResponse {
            detail: "Successfully logged out.".into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current user",
    responses(
        (status = 200, description = "Authenticated user", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.user_id,
        username: auth_user.username,
        is_staff: auth_user.is_staff,
    })
}
