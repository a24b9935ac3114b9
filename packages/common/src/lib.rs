pub mod media;

pub use media::{
    CloudinaryStore, DestroyOutcome, MediaBackend, MediaConfig, MediaError, MediaStore,
    MemoryStore, ResourceType, SignatureAlgorithm, UploadCredentials, UploadRequest, UploadedAsset,
};
