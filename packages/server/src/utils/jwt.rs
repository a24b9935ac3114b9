use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Username
    pub uid: i32,     // User ID
    pub staff: bool,
    pub jti: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// An access/refresh token pair issued at login or on refresh.
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Sign a token of the given type for a user.
pub fn sign(
    user_id: i32,
    username: &str,
    staff: bool,
    token_type: TokenType,
    auth: &AuthConfig,
) -> Result<String> {
    let now = Utc::now();
    let lifetime = match token_type {
        TokenType::Access => Duration::minutes(auth.access_ttl_minutes),
        TokenType::Refresh => Duration::days(auth.refresh_ttl_days),
    };
    let expiration = now
        .checked_add_signed(lifetime)
        .ok_or_else(|| anyhow!("token lifetime overflows"))?;

    let claims = Claims {
        sub: username.to_owned(),
        uid: user_id,
        staff,
        jti: Uuid::new_v4().simple().to_string(),
        token_type,
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Sign a fresh access/refresh pair.
pub fn sign_pair(user_id: i32, username: &str, staff: bool, auth: &AuthConfig) -> Result<TokenPair> {
    Ok(TokenPair {
        access: sign(user_id, username, staff, TokenType::Access, auth)?,
        refresh: sign(user_id, username, staff, TokenType::Refresh, auth)?,
    })
}

/// Verify and decode a JWT token, requiring the given token type.
pub fn verify(token: &str, expected: TokenType, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    if token_data.claims.token_type != expected {
        bail!("wrong token type");
    }
    Ok(token_data.claims)
}
