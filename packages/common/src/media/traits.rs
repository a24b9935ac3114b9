use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::MediaError;

/// Delivery class of a remote asset. The hosted API namespaces public ids per
/// resource type, so deletes must name the same type the asset was uploaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    /// Documents and other files served byte-for-byte (PDF, DOCX, ...).
    Raw,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file to push to the remote store.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    /// Original filename as sent by the client.
    pub filename: String,
    pub content_type: Option<String>,
    pub folder: String,
    pub resource_type: ResourceType,
}

/// What the remote store reports back after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub public_id: String,
    /// Absolute HTTPS URL the asset is served from.
    pub secure_url: String,
    pub resource_type: ResourceType,
}

/// Identifies the account a direct upload is made against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredentials {
    pub api_key: String,
    pub cloud_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Deleted,
    NotFound,
}

/// Hosted media storage.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload a file and return its public id and delivery URL.
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError>;

    /// Delete an asset by public id, invalidating cached copies.
    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<DestroyOutcome, MediaError>;

    /// Build the delivery URL for a path stored relative to the upload root.
    fn delivery_url(&self, path: &str, resource_type: ResourceType) -> String;

    /// Signature a client submits with a direct upload into `folder`.
    fn sign_upload(&self, folder: &str, timestamp: i64) -> String;

    fn credentials(&self) -> UploadCredentials;
}
