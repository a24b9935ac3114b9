use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Delivery URL of the hero background, empty when unset.
    #[sea_orm(column_type = "Text")]
    pub main_bg_image: String,
    /// Free-form plan table rendered by the pricing section.
    pub membership_plan: Json,

    pub phone1: i64,
    pub phone2: Option<i64>,
    pub email: String,
    #[sea_orm(column_type = "Text")]
    pub gym_address: String,

    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub footer_description: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
