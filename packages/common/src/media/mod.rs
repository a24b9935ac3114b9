mod cloudinary;
mod config;
mod error;
mod memory;
mod traits;

pub mod public_id;
pub mod signature;

use std::sync::Arc;

pub use cloudinary::CloudinaryStore;
pub use config::{MediaBackend, MediaConfig, SignatureAlgorithm};
pub use error::MediaError;
pub use memory::MemoryStore;
pub use traits::{
    DestroyOutcome, MediaStore, ResourceType, UploadCredentials, UploadRequest, UploadedAsset,
};

/// Build the media store selected by `config.backend`.
pub fn build_store(config: &MediaConfig) -> Result<Arc<dyn MediaStore>, MediaError> {
    match config.backend {
        MediaBackend::Cloudinary => Ok(Arc::new(CloudinaryStore::new(config.clone())?)),
        MediaBackend::Memory => Ok(Arc::new(MemoryStore::from_config(config))),
    }
}
