use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A refresh token that may no longer be exchanged.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blacklisted_token")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `jti` claim of the refresh token.
    #[sea_orm(unique)]
    pub jti: String,
    pub user_id: i32,

    /// Copied from the token's `exp`; rows past this are purged.
    pub expires_at: DateTimeUtc,
    pub blacklisted_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
