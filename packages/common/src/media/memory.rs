use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::config::{MediaConfig, SignatureAlgorithm};
use super::error::MediaError;
use super::signature::api_sign_request;
use super::traits::{
    DestroyOutcome, MediaStore, ResourceType, UploadCredentials, UploadRequest, UploadedAsset,
};

const DELIVERY_BASE: &str = "https://res.cloudinary.com";
const UNLIMITED: usize = usize::MAX;

/// In-process media store.
///
/// Serves URLs and public ids shaped like the hosted store's so that
/// identifier parsing behaves the same, and records every destroy call for
/// inspection.
pub struct MemoryStore {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    signature_algorithm: SignatureAlgorithm,
    version: AtomicU64,
    assets: Mutex<HashMap<(ResourceType, String), UploadedAsset>>,
    destroyed: Mutex<Vec<(String, ResourceType)>>,
    fail_destroys: AtomicBool,
    /// Uploads still allowed to succeed. `UNLIMITED` disables the countdown.
    upload_budget: AtomicUsize,
}

impl MemoryStore {
    pub fn new(cloud_name: &str) -> Self {
        Self {
            cloud_name: cloud_name.to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            signature_algorithm: SignatureAlgorithm::default(),
            version: AtomicU64::new(1),
            assets: Mutex::new(HashMap::new()),
            destroyed: Mutex::new(Vec::new()),
            fail_destroys: AtomicBool::new(false),
            upload_budget: AtomicUsize::new(UNLIMITED),
        }
    }

    /// A store that signs with the configured credentials.
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            signature_algorithm: config.signature_algorithm,
            ..Self::new(&config.cloud_name)
        }
    }

    /// Make every subsequent `destroy` call fail with a rejection.
    pub fn set_fail_destroys(&self, fail: bool) {
        self.fail_destroys.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `upload` call fail with a rejection.
    pub fn set_fail_uploads(&self, fail: bool) {
        let budget = if fail { 0 } else { UNLIMITED };
        self.upload_budget.store(budget, Ordering::SeqCst);
    }

    /// Let the next `count` uploads succeed and fail every one after.
    pub fn fail_uploads_after(&self, count: usize) {
        self.upload_budget.store(count, Ordering::SeqCst);
    }

    /// Public ids passed to `destroy`, in call order.
    pub fn destroyed(&self) -> Vec<(String, ResourceType)> {
        self.destroyed
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// Number of assets currently held.
    pub fn asset_count(&self) -> usize {
        self.assets.lock().map(|a| a.len()).unwrap_or_default()
    }

    pub fn contains(&self, public_id: &str, resource_type: ResourceType) -> bool {
        self.assets
            .lock()
            .map(|a| a.contains_key(&(resource_type, public_id.to_string())))
            .unwrap_or(false)
    }

    fn take_upload_slot(&self) -> bool {
        self.upload_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                UNLIMITED => Some(UNLIMITED),
                0 => None,
                n => Some(n - 1),
            })
            .is_ok()
    }
}

fn poisoned() -> MediaError {
    MediaError::InvalidResponse("memory store lock poisoned".into())
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError> {
        if !self.take_upload_slot() {
            return Err(MediaError::Rejected {
                status: 500,
                message: "upload failed".into(),
            });
        }

        let version = self.version.fetch_add(1, Ordering::SeqCst);
        let (stem, ext) = match request.filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (request.filename.as_str(), None),
        };
        let stem: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();

        let base = format!("{}/{}_{}", request.folder, stem, version);
        let file_name = match ext {
            Some(ext) => format!("{base}.{ext}"),
            None => base.clone(),
        };
        // Raw assets are addressed with their extension, images without.
        let public_id = match request.resource_type {
            ResourceType::Raw => file_name.clone(),
            ResourceType::Image => base,
        };
        let secure_url = format!(
            "{DELIVERY_BASE}/{}/{}/upload/v{version}/{file_name}",
            self.cloud_name, request.resource_type
        );

        let asset = UploadedAsset {
            public_id: public_id.clone(),
            secure_url,
            resource_type: request.resource_type,
        };
        self.assets
            .lock()
            .map_err(|_| poisoned())?
            .insert((request.resource_type, public_id), asset.clone());
        Ok(asset)
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<DestroyOutcome, MediaError> {
        self.destroyed
            .lock()
            .map_err(|_| poisoned())?
            .push((public_id.to_string(), resource_type));

        if self.fail_destroys.load(Ordering::SeqCst) {
            return Err(MediaError::Rejected {
                status: 500,
                message: "destroy failed".into(),
            });
        }

        let removed = self
            .assets
            .lock()
            .map_err(|_| poisoned())?
            .remove(&(resource_type, public_id.to_string()));
        Ok(match removed {
            Some(_) => DestroyOutcome::Deleted,
            None => DestroyOutcome::NotFound,
        })
    }

    fn delivery_url(&self, path: &str, resource_type: ResourceType) -> String {
        format!(
            "{DELIVERY_BASE}/{}/{}/upload/{}",
            self.cloud_name,
            resource_type,
            path.trim_start_matches('/')
        )
    }

    fn sign_upload(&self, folder: &str, timestamp: i64) -> String {
        api_sign_request(
            &[("folder", folder.to_string()), ("timestamp", timestamp.to_string())],
            &self.api_secret,
            self.signature_algorithm,
        )
    }

    fn credentials(&self) -> UploadCredentials {
        UploadCredentials {
            api_key: self.api_key.clone(),
            cloud_name: self.cloud_name.clone(),
        }
    }
}
