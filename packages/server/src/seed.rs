use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapAdmin;
use crate::entity::user;
use crate::utils::hash::hash_password;

/// Create the configured staff account if no user with that name exists.
///
/// An existing account is left untouched, including its password.
pub async fn ensure_admin_user(db: &DatabaseConnection, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    let username = admin.username.trim();
    if username.is_empty() || admin.password.is_empty() {
        anyhow::bail!("bootstrap admin needs both a username and a password");
    }

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let password = hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("failed to hash bootstrap password: {e}"))?;

    user::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password),
        is_staff: Set(true),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(%username, "Created bootstrap staff account");
    Ok(())
}
