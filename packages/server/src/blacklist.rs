//! Revoked refresh tokens.

use std::time::Duration;

use chrono::Utc;
use sea_orm::*;
use tracing::{error, info};

use crate::entity::blacklisted_token;
use crate::utils::jwt::Claims;

pub async fn is_blacklisted<C: ConnectionTrait>(db: &C, jti: &str) -> Result<bool, DbErr> {
    Ok(blacklisted_token::Entity::find()
        .filter(blacklisted_token::Column::Jti.eq(jti))
        .one(db)
        .await?
        .is_some())
}

/// Revoke a refresh token.
///
/// Returns `false` when the token was already revoked, which includes losing
/// a race against a concurrent revocation of the same token.
pub async fn blacklist<C: ConnectionTrait>(db: &C, claims: &Claims) -> Result<bool, DbErr> {
    if is_blacklisted(db, &claims.jti).await? {
        return Ok(false);
    }

    let entry = blacklisted_token::ActiveModel {
        jti: Set(claims.jti.clone()),
        user_id: Set(claims.uid),
        expires_at: Set(claims.expires_at()),
        blacklisted_at: Set(Utc::now()),
        ..Default::default()
    };

    match entry.insert(db).await {
        Ok(_) => Ok(true),
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                tracing::debug!(jti = %claims.jti, "Token revoked concurrently");
                Ok(false)
            }
            _ => Err(e),
        },
    }
}

/// Delete entries whose token has expired anyway. Returns the number removed.
pub async fn purge_expired<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
    let result = blacklisted_token::Entity::delete_many()
        .filter(blacklisted_token::Column::ExpiresAt.lt(Utc::now()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Run the expired-entry purge as a background task.
pub async fn run_blacklist_purger(db: DatabaseConnection, interval_secs: u64) {
    info!(interval_secs, "Starting token blacklist purger");

    let mut interval = tokio::time::interval(Duration::from_secs(std::cmp::Ord::max(interval_secs, 1)));

    loop {
        interval.tick().await;

        match purge_expired(&db).await {
            Ok(0) => {}
            Ok(count) => info!(count, "Purged expired blacklist entries"),
            Err(e) => error!(error = %e, "Blacklist purge failed"),
        }
    }
}
