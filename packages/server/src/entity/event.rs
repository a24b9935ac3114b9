use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub timestamp: DateTimeUtc,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub highlights: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub location: String,

    #[sea_orm(has_many)]
    pub files: HasMany<super::event_file::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
