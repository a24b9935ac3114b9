use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "live_update_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub live_update_id: i32,
    #[sea_orm(belongs_to, from = "live_update_id", to = "id", on_delete = "Cascade")]
    pub live_update: HasOne<super::live_update::Entity>,

    /// Delivery URL of a raw (document) asset.
    #[sea_orm(column_type = "Text")]
    pub file: String,
}

impl ActiveModelBehavior for ActiveModel {}
