use chrono::{DateTime, Utc};
use common::{MediaStore, ResourceType};
use serde::{Deserialize, Serialize};

use super::shared::{Validator, resolve_media_url};
use crate::entity::{event, event_file};
use crate::error::AppError;

/// Multipart field carrying new event photos.
pub const UPLOAD_FIELD: &str = "uploaded_images";

/// Text fields of an event. Photos arrive as `uploaded_images` file parts.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct EventRequest {
    /// Max 250 characters.
    #[schema(example = "Summer deadlift meet")]
    pub title: Option<String>,
    pub highlights: Option<String>,
    pub description: Option<String>,
    /// Max 500 characters.
    pub location: Option<String>,
}

pub fn validate_event(req: &EventRequest, partial: bool) -> Result<(), AppError> {
    let mut v = Validator::new();
    v.require("title", &req.title, partial);
    v.text("title", req.title.as_deref(), Some(250));
    v.require("highlights", &req.highlights, partial);
    v.text("highlights", req.highlights.as_deref(), None);
    v.require("description", &req.description, partial);
    v.text("description", req.description.as_deref(), None);
    v.require("location", &req.location, partial);
    v.text("location", req.location.as_deref(), Some(500));
    v.finish()
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventFileResponse {
    pub id: i32,
    /// Absolute delivery URL of the photo.
    pub file_url: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub title: String,
    pub highlights: String,
    pub description: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub files: Vec<EventFileResponse>,
}

impl EventResponse {
    pub fn from_parts(
        m: event::Model,
        files: Vec<event_file::Model>,
        store: &dyn MediaStore,
    ) -> Self {
        Self {
            id: m.id,
            title: m.title,
            highlights: m.highlights,
            description: m.description,
            location: m.location,
            timestamp: m.timestamp,
            files: files
                .into_iter()
                .map(|f| EventFileResponse {
                    id: f.id,
                    file_url: resolve_media_url(&f.file, store, ResourceType::Image),
                })
                .collect(),
        }
    }
}
