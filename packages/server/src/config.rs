use common::UploadPolicy;
use common::upload::DEFAULT_ACCEPTED_IMAGE_TYPES;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: Vec::new(),
            max_age: default_cors_max_age(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool ceiling. Default: 20.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection. Default: 8.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    20
}
fn default_acquire_timeout_secs() -> u64 {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Session token lifetime. Default: 168 (7 days).
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24 * 7
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    /// Process-local store for development; signed URLs are not reachable.
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom S3-compatible endpoint.
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    /// Base URL media URLs are derived from (`{public_base_url}/{key}`).
    pub public_base_url: String,
    /// Lifetime of issued upload URLs. Default: 60.
    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: u64,
    /// Check the object exists before registering a media row. Default: false.
    #[serde(default)]
    pub verify_uploads: bool,
}

fn default_region() -> String {
    "us-east-1".into()
}
fn default_presign_expiry_secs() -> u64 {
    60
}

/// Upload policy per call site.
///
/// Recipe creation and image replacement have historically used different
/// ceilings; both are kept as separate settings.
#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_accepted_image_types")]
    pub accepted_image_types: Vec<String>,
    /// Ceiling for images uploaded while creating a recipe. Default: 10 MiB.
    #[serde(default = "default_create_max_bytes")]
    pub create_max_bytes: u64,
    /// Ceiling for images replacing a recipe's existing image. Default: 5 MiB.
    #[serde(default = "default_replace_max_bytes")]
    pub replace_max_bytes: u64,
}

fn default_accepted_image_types() -> Vec<String> {
    DEFAULT_ACCEPTED_IMAGE_TYPES
        .iter()
        .map(|t| t.to_string())
        .collect()
}
fn default_create_max_bytes() -> u64 {
    10 * MIB
}
fn default_replace_max_bytes() -> u64 {
    5 * MIB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            accepted_image_types: default_accepted_image_types(),
            create_max_bytes: default_create_max_bytes(),
            replace_max_bytes: default_replace_max_bytes(),
        }
    }
}

impl UploadConfig {
    /// Whether `mime_type` is on the allow-list shared by both call sites.
    pub fn accepts(&self, mime_type: &str) -> bool {
        self.accepted_image_types.iter().any(|t| t == mime_type)
    }

    pub fn create_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.accepted_image_types.iter().cloned(), self.create_max_bytes)
    }

    pub fn replace_policy(&self) -> UploadPolicy {
        UploadPolicy::new(
            self.accepted_image_types.iter().cloned(),
            self.replace_max_bytes,
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., RECIPES__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("RECIPES").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
