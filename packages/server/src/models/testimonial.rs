use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::Validator;
use crate::entity::testimonial;
use crate::error::AppError;

/// Rating given when the client omits one.
pub const DEFAULT_RATING: i32 = 5;

/// Create/update body for a testimonial. On PATCH every field is optional.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct TestimonialRequest {
    /// Reviewer's display name (max 120 characters).
    #[schema(example = "Arjun")]
    pub name: Option<String>,
    #[schema(example = "Best equipment in town.")]
    pub text: Option<String>,
    /// Defaults to 5 on create.
    #[schema(example = 5)]
    pub rating: Option<i32>,
}

pub fn validate_testimonial(req: &TestimonialRequest, partial: bool) -> Result<(), AppError> {
    let mut v = Validator::new();
    v.require("name", &req.name, partial);
    v.text("name", req.name.as_deref(), Some(120));
    v.require("text", &req.text, partial);
    v.text("text", req.text.as_deref(), None);
    v.finish()
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TestimonialResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub name: String,
    pub text: String,
    #[schema(example = 5)]
    pub rating: i32,
    pub created: DateTime<Utc>,
}

impl From<testimonial::Model> for TestimonialResponse {
    fn from(m: testimonial::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            text: m.text,
            rating: m.rating,
            created: m.created,
        }
    }
}
