use common::{MediaStore, ResourceType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::shared::{
    NULL, Validator, coerce_i64, coerce_json, double_option, is_valid_email, resolve_media_url,
};
use crate::entity::site_info;
use crate::error::AppError;

/// Multipart field carrying a new background image.
pub const IMAGE_FIELD: &str = "main_bg_image";

/// Default contact address when none is supplied.
pub const DEFAULT_EMAIL: &str = "exampleEmail@gmail.com";

/// Create/update body for the site settings.
///
/// Numeric and JSON fields accept either native JSON values or their string
/// encodings, since multipart bodies can only carry text.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct SiteInfoRequest {
    /// Delivery URL of the hero background. May also be sent as a file part.
    pub main_bg_image: Option<String>,
    /// Membership plan table.
    #[serde(rename = "membershi_plan")]
    #[schema(value_type = Option<Object>, example = json!({"monthly": 1200, "yearly": 12000}))]
    pub membership_plan: Option<Value>,
    #[schema(value_type = Option<i64>, example = 9876543210i64)]
    pub phone1: Option<Value>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub phone2: Option<Option<Value>>,
    pub email: Option<String>,
    /// Max 350 characters.
    pub gym_address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub instagram: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub facebook: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub twitter: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub youtube: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub footer_description: Option<Option<String>>,
}

/// Validated, typed changes to apply to a site settings row.
#[derive(Debug, Default, PartialEq)]
pub struct SiteInfoChanges {
    pub main_bg_image: Option<String>,
    pub membership_plan: Option<Value>,
    pub phone1: Option<i64>,
    pub phone2: Option<Option<i64>>,
    pub email: Option<String>,
    pub gym_address: Option<String>,
    pub instagram: Option<Option<String>>,
    pub facebook: Option<Option<String>>,
    pub twitter: Option<Option<String>>,
    pub youtube: Option<Option<String>>,
    pub footer_description: Option<Option<String>>,
}

impl SiteInfoRequest {
    /// Validate the request and convert loosely typed fields.
    ///
    /// `has_image_upload` tells whether a background file part accompanies the
    /// body, which satisfies the image requirement on create.
    pub fn into_changes(
        self,
        partial: bool,
        has_image_upload: bool,
    ) -> Result<SiteInfoChanges, AppError> {
        let mut v = Validator::new();

        if !partial && !has_image_upload {
            v.require("main_bg_image", &self.main_bg_image, partial);
        }

        v.require("membershi_plan", &self.membership_plan, partial);
        let membership_plan = match self.membership_plan.as_ref().map(coerce_json) {
            Some(Ok(Value::Null)) => {
                v.error("membershi_plan", NULL);
                None
            }
            Some(Ok(plan)) => Some(plan),
            Some(Err(msg)) => {
                v.error("membershi_plan", msg);
                None
            }
            None => None,
        };

        v.require("phone1", &self.phone1, partial);
        let phone1 = match self.phone1.as_ref().map(coerce_i64) {
            Some(Ok(Some(n))) => Some(n),
            Some(Ok(None)) => {
                v.error("phone1", NULL);
                None
            }
            Some(Err(msg)) => {
                v.error("phone1", msg);
                None
            }
            None => None,
        };

        let phone2 = match self.phone2 {
            Some(Some(ref value)) => match coerce_i64(value) {
                Ok(n) => Some(n),
                Err(msg) => {
                    v.error("phone2", msg);
                    None
                }
            },
            Some(None) => Some(None),
            None => None,
        };

        if let Some(ref email) = self.email
            && !is_valid_email(email)
        {
            v.error("email", "Enter a valid email address.");
        }

        v.require("gym_address", &self.gym_address, partial);
        v.text("gym_address", self.gym_address.as_deref(), Some(350));

        for (field, value) in [
            ("instagram", &self.instagram),
            ("facebook", &self.facebook),
            ("twitter", &self.twitter),
            ("youtube", &self.youtube),
        ] {
            v.max_chars(field, value.as_ref().and_then(|s| s.as_deref()), Some(600));
        }

        v.finish()?;

        Ok(SiteInfoChanges {
            main_bg_image: self.main_bg_image,
            membership_plan,
            phone1,
            phone2,
            email: self.email.map(|e| e.trim().to_string()),
            gym_address: self.gym_address,
            instagram: self.instagram,
            facebook: self.facebook,
            twitter: self.twitter,
            youtube: self.youtube,
            footer_description: self.footer_description,
        })
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SiteInfoResponse {
    pub id: i32,
    /// Absolute delivery URL, or null when unset.
    pub main_bg_image: Option<String>,
    #[serde(rename = "membershi_plan")]
    #[schema(value_type = Object)]
    pub membership_plan: Value,
    pub phone1: i64,
    pub phone2: Option<i64>,
    pub email: String,
    pub gym_address: String,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub footer_description: Option<String>,
}

impl SiteInfoResponse {
    pub fn from_model(m: site_info::Model, store: &dyn MediaStore) -> Self {
        Self {
            id: m.id,
            main_bg_image: resolve_media_url(&m.main_bg_image, store, ResourceType::Image),
            membership_plan: m.membership_plan,
            phone1: m.phone1,
            phone2: m.phone2,
            email: m.email,
            gym_address: m.gym_address,
            instagram: m.instagram,
            facebook: m.facebook,
            twitter: m.twitter,
            youtube: m.youtube,
            footer_description: m.footer_description,
        }
    }
}
