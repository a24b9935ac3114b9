use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gym_gallery")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored verbatim. Holds a full delivery URL for anything uploaded
    /// through the API; older rows may carry a path relative to the upload root.
    #[sea_orm(column_type = "Text", nullable)]
    pub image: Option<String>,
    pub title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
