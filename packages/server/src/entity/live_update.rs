use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "live_update")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub timestamp: DateTimeUtc,
    pub last_modified: DateTimeUtc,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(has_many)]
    pub files: HasMany<super::live_update_file::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
