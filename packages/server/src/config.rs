use common::MediaConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Refresh-token cookie settings.
#[derive(Debug, Deserialize, Clone)]
pub struct CookieConfig {
    /// Cookie name. Default: "refresh_token".
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// Send the cookie only over HTTPS. Default: false.
    #[serde(default)]
    pub secure: bool,
}

/// Staff account created on startup when it does not exist yet.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime in minutes. Default: 60.
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days. Default: 15.
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    #[serde(default)]
    pub cookie: CookieConfig,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// How often expired blacklist entries are purged, in seconds. Default: 3600.
    #[serde(default = "default_blacklist_purge_interval_secs")]
    pub blacklist_purge_interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

fn default_cookie_name() -> String {
    "refresh_token".into()
}
fn default_access_ttl_minutes() -> i64 {
    60
}
fn default_refresh_ttl_days() -> i64 {
    15
}
fn default_blacklist_purge_interval_secs() -> u64 {
    3600
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            secure: false,
        }
    }
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl_minutes: default_access_ttl_minutes(),
            refresh_ttl_days: default_refresh_ttl_days(),
            cookie: CookieConfig::default(),
            bootstrap_admin: None,
            blacklist_purge_interval_secs: default_blacklist_purge_interval_secs(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", vec!["http://localhost:5173"])?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., GYM__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("GYM")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
