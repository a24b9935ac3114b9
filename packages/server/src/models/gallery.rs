use common::{MediaStore, ResourceType};
use serde::{Deserialize, Serialize};

use super::shared::{Validator, double_option, resolve_media_url};
use crate::entity::gym_gallery;
use crate::error::AppError;

/// Create/update body for a gallery entry.
///
/// `image` is a delivery URL produced by a direct client upload. A multipart
/// body may instead carry an `image` file part, which is uploaded first.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct GalleryRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, example = "https://res.cloudinary.com/demo/image/upload/v1/gym_gallery/floor.jpg")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, example = "Main floor")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

pub fn validate_gallery(req: &GalleryRequest) -> Result<(), AppError> {
    let mut v = Validator::new();
    v.max_chars("title", req.title.as_ref().and_then(|t| t.as_deref()), Some(250));
    v.finish()
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GalleryResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Absolute delivery URL, or null when the entry has no image.
    pub image: Option<String>,
}

impl GalleryResponse {
    pub fn from_model(m: gym_gallery::Model, store: &dyn MediaStore) -> Self {
        let image = m
            .image
            .as_deref()
            .and_then(|stored| resolve_media_url(stored, store, ResourceType::Image));
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            image,
        }
    }
}
