use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_MAX_UPLOAD_FILES: usize = 10;
pub const DEFAULT_THUMBNAIL_MAX_DIMENSION: u32 = 800;
pub const DEFAULT_THUMBNAIL_QUALITY: u8 = 80;

/// Which backend holds image bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    Inline,
    Local,
    Remote(RemoteStoreConfig),
}

impl StorageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StorageKind::Inline => "inline",
            StorageKind::Local => "local",
            StorageKind::Remote(_) => "remote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    /// Base URL objects are PUT to and DELETEd from
    pub endpoint: String,
    /// Base URL clients are redirected to
    pub public_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Limits {
    pub max_upload_bytes: usize,
    pub max_upload_files: usize,
    pub thumbnail_max_dimension: u32,
    pub thumbnail_quality: u8,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_upload_files: DEFAULT_MAX_UPLOAD_FILES,
            thumbnail_max_dimension: DEFAULT_THUMBNAIL_MAX_DIMENSION,
            thumbnail_quality: DEFAULT_THUMBNAIL_QUALITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// External base URL, no trailing slash
    pub api_url: String,
    pub database_path: String,
    pub storage: StorageKind,
    pub upload_dir: PathBuf,
    pub limits: Limits,
    pub pending_image_ttl: Duration,
    pub image_cache_ttl: Duration,
    pub image_cache_capacity: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let port = parse_or("MEMORY_WALL_PORT", DEFAULT_PORT);
        let host = env::var("MEMORY_WALL_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_url = env::var("API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("http://127.0.0.1:{}", port));

        let storage = match env::var("IMAGE_STORAGE")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "inline" => StorageKind::Inline,
            "local" => StorageKind::Local,
            "remote" => StorageKind::Remote(remote_from_env()?),
            other => return Err(format!("Unknown IMAGE_STORAGE '{}'", other)),
        };

        Ok(Self {
            host,
            port,
            api_url,
            database_path: env::var("MEMORY_WALL_DB_PATH")
                .unwrap_or_else(|_| "./memory_wall.db".to_string()),
            storage,
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            ),
            limits: Limits {
                max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
                max_upload_files: parse_or("MAX_UPLOAD_FILES", DEFAULT_MAX_UPLOAD_FILES),
                thumbnail_max_dimension: parse_or(
                    "THUMBNAIL_MAX_DIMENSION",
                    DEFAULT_THUMBNAIL_MAX_DIMENSION,
                ),
                thumbnail_quality: parse_or("THUMBNAIL_QUALITY", DEFAULT_THUMBNAIL_QUALITY),
            },
            pending_image_ttl: Duration::from_secs(parse_or("PENDING_IMAGE_TTL_SECS", 3600)),
            image_cache_ttl: Duration::from_secs(parse_or("IMAGE_CACHE_TTL_SECS", 300)),
            image_cache_capacity: parse_or("IMAGE_CACHE_CAPACITY", 256),
        })
    }

    /// Largest request body the upload endpoint can legitimately receive.
    pub fn max_request_bytes(&self) -> usize {
        self.limits.max_upload_files * self.limits.max_upload_bytes + 1024 * 1024
    }
}

fn remote_from_env() -> Result<RemoteStoreConfig, String> {
    let bucket = env::var("OBJECT_STORE_BUCKET")
        .map_err(|_| "OBJECT_STORE_BUCKET must be set for remote storage".to_string())?;
    let region = env::var("OBJECT_STORE_REGION")
        .map_err(|_| "OBJECT_STORE_REGION must be set for remote storage".to_string())?;

    let public_url = env::var("OBJECT_STORE_PUBLIC_URL")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| format!("https://{}.cos.{}.myqcloud.com", bucket, region));
    let endpoint = env::var("OBJECT_STORE_ENDPOINT")
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| public_url.clone());

    Ok(RemoteStoreConfig {
        endpoint,
        public_url,
        token: env::var("OBJECT_STORE_TOKEN").ok().filter(|t| !t.is_empty()),
    })
}

fn parse_or<T: FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{}='{}' is not valid, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
