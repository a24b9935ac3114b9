use chrono::{DateTime, Utc};
use common::{MediaStore, ResourceType};
use serde::{Deserialize, Serialize};

use super::shared::{Validator, resolve_media_url};
use crate::entity::{live_update, live_update_file};
use crate::error::AppError;

/// Multipart field carrying new attachments.
pub const UPLOAD_FIELD: &str = "uploaded_files";

/// Text fields of a live update post. Attachments arrive as
/// `uploaded_files` file parts in a multipart body.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct LiveUpdateRequest {
    /// Max 300 characters.
    #[schema(example = "Gym closed on Sunday")]
    pub subject: Option<String>,
    #[schema(example = "Maintenance on the cardio floor.")]
    pub description: Option<String>,
}

pub fn validate_live_update(req: &LiveUpdateRequest, partial: bool) -> Result<(), AppError> {
    let mut v = Validator::new();
    v.require("subject", &req.subject, partial);
    v.text("subject", req.subject.as_deref(), Some(300));
    v.require("description", &req.description, partial);
    v.text("description", req.description.as_deref(), None);
    v.finish()
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LiveUpdateFileResponse {
    pub id: i32,
    /// Absolute delivery URL of the attachment.
    pub file: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LiveUpdateResponse {
    pub id: i32,
    pub subject: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub files: Vec<LiveUpdateFileResponse>,
}

impl LiveUpdateResponse {
    pub fn from_parts(
        m: live_update::Model,
        files: Vec<live_update_file::Model>,
        store: &dyn MediaStore,
    ) -> Self {
        Self {
            id: m.id,
            subject: m.subject,
            description: m.description,
            timestamp: m.timestamp,
            last_modified: m.last_modified,
            files: files
                .into_iter()
                .map(|f| LiveUpdateFileResponse {
                    id: f.id,
                    file: resolve_media_url(&f.file, store, ResourceType::Raw),
                })
                .collect(),
        }
    }
}
