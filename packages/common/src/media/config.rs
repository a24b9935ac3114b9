use serde::Deserialize;

/// Which media store implementation to run against.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    #[default]
    Cloudinary,
    /// In-process store. Uploads are kept in memory and never leave the host.
    Memory,
}

/// Digest used when signing requests for the hosted media API.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

/// Media store configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    #[serde(default)]
    pub backend: MediaBackend,
    /// Cloud identifier. Default: "demo".
    #[serde(default = "default_cloud_name")]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,
    /// Base URL of the upload/admin API. Default: "https://api.cloudinary.com/v1_1".
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL assets are delivered from. Default: "https://res.cloudinary.com".
    #[serde(default = "default_delivery_base_url")]
    pub delivery_base_url: String,
    #[serde(default)]
    pub folders: MediaFolders,
    /// Largest single upload accepted, in bytes. Default: 20 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

/// Target folders per kind of uploaded asset.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaFolders {
    #[serde(default = "default_gallery_folder")]
    pub gallery: String,
    #[serde(default = "default_site_info_folder")]
    pub site_info: String,
    #[serde(default = "default_live_update_folder")]
    pub live_update_files: String,
    #[serde(default = "default_event_folder")]
    pub event_photos: String,
}

fn default_cloud_name() -> String {
    "demo".into()
}
fn default_api_base_url() -> String {
    "https://api.cloudinary.com/v1_1".into()
}
fn default_delivery_base_url() -> String {
    "https://res.cloudinary.com".into()
}
fn default_max_upload_size() -> usize {
    20 * 1024 * 1024
}
fn default_gallery_folder() -> String {
    "gym_gallery".into()
}
fn default_site_info_folder() -> String {
    "site_info_media".into()
}
fn default_live_update_folder() -> String {
    "live_update_files".into()
}
fn default_event_folder() -> String {
    "event_photos".into()
}

impl Default for MediaFolders {
    fn default() -> Self {
        Self {
            gallery: default_gallery_folder(),
            site_info: default_site_info_folder(),
            live_update_files: default_live_update_folder(),
            event_photos: default_event_folder(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            backend: MediaBackend::default(),
            cloud_name: default_cloud_name(),
            api_key: String::new(),
            api_secret: String::new(),
            signature_algorithm: SignatureAlgorithm::default(),
            api_base_url: default_api_base_url(),
            delivery_base_url: default_delivery_base_url(),
            folders: MediaFolders::default(),
            max_upload_size: default_max_upload_size(),
        }
    }
}
