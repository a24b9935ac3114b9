//! Keeping remote media in step with the records that reference it.

use common::media::public_id::public_id_for;
use common::{DestroyOutcome, MediaStore, ResourceType, UploadRequest, UploadedAsset};
use tracing::{info, warn};

use crate::error::AppError;
use crate::extractors::form::UploadedFile;

/// Record kinds that own exactly one remote asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// `gym_gallery.image`
    GalleryImage,
    /// `live_update_file.file`
    LiveUpdateFile,
    /// `event_file.file`
    EventFile,
    /// `site_info.main_bg_image`
    SiteBackground,
}

impl AttachmentKind {
    /// Column holding the remote reference.
    pub fn field(&self) -> &'static str {
        match self {
            AttachmentKind::GalleryImage => "image",
            AttachmentKind::LiveUpdateFile | AttachmentKind::EventFile => "file",
            AttachmentKind::SiteBackground => "main_bg_image",
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            AttachmentKind::LiveUpdateFile => ResourceType::Raw,
            AttachmentKind::GalleryImage
            | AttachmentKind::EventFile
            | AttachmentKind::SiteBackground => ResourceType::Image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Nothing recognizable to delete.
    Skipped,
    Deleted(String),
    /// The store reported no such asset.
    Missing(String),
    /// The delete call failed; the failure was logged.
    Failed(String),
}

/// Delete the remote asset behind `reference`.
///
/// Best effort: parse failures mean there is nothing to delete and store
/// errors are logged, so the caller's local deletion always proceeds.
pub async fn purge_remote_asset(
    store: &dyn MediaStore,
    kind: AttachmentKind,
    reference: &str,
) -> CleanupOutcome {
    let Some(public_id) = public_id_for(reference, kind.resource_type()) else {
        return CleanupOutcome::Skipped;
    };

    match store.destroy(&public_id, kind.resource_type()).await {
        Ok(DestroyOutcome::Deleted) => {
            info!(%public_id, field = kind.field(), "Deleted remote asset");
            CleanupOutcome::Deleted(public_id)
        }
        Ok(DestroyOutcome::NotFound) => {
            warn!(%public_id, field = kind.field(), "Remote asset already gone");
            CleanupOutcome::Missing(public_id)
        }
        Err(e) => {
            warn!(%public_id, field = kind.field(), error = %e, "Remote asset cleanup failed");
            CleanupOutcome::Failed(public_id)
        }
    }
}

/// Purge every reference in order. One call per reference, no retries.
pub async fn purge_remote_assets<I, S>(
    store: &dyn MediaStore,
    kind: AttachmentKind,
    references: I,
) -> Vec<CleanupOutcome>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcomes = Vec::new();
    for reference in references {
        outcomes.push(purge_remote_asset(store, kind, reference.as_ref()).await);
    }
    outcomes
}

/// Upload files in order, stopping at the first failure.
///
/// Assets uploaded before the failure are purged again so that a rejected
/// request leaves nothing behind.
pub async fn upload_files(
    store: &dyn MediaStore,
    files: Vec<UploadedFile>,
    folder: &str,
    kind: AttachmentKind,
) -> Result<Vec<UploadedAsset>, AppError> {
    let mut uploaded: Vec<UploadedAsset> = Vec::with_capacity(files.len());
    for file in files {
        let request = UploadRequest {
            bytes: file.bytes,
            filename: file.filename,
            content_type: file.content_type,
            folder: folder.to_string(),
            resource_type: kind.resource_type(),
        };
        match store.upload(request).await {
            Ok(asset) => uploaded.push(asset),
            Err(e) => {
                discard_uploads(store, kind, &uploaded).await;
                return Err(e.into());
            }
        }
    }
    Ok(uploaded)
}

/// Roll back uploads whose records never made it into the database.
pub async fn discard_uploads(store: &dyn MediaStore, kind: AttachmentKind, assets: &[UploadedAsset]) {
    let references: Vec<&str> = assets.iter().map(|a| a.secure_url.as_str()).collect();
    purge_remote_assets(store, kind, references).await;
}
