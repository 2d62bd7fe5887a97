//! Pluggable image storage backends.
//!
//! Every backend stores opaque bytes under a key such as
//! `original/<id>.png` and hands back an [`ImageLocation`] that is embedded
//! in the memory document. Retrieval goes back through the same trait so
//! the ingestion and retrieval code never knows which backend is active.

mod inline;
mod local;
pub(crate) mod remote;

pub use inline::InlineStore;
pub use local::LocalStore;
pub use remote::RemoteStore;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use memory_wall_types::{ImageLocation, ImageSize};
use std::sync::Arc;

use crate::config::{Config, StorageKind};

/// Result of reading a location back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    Bytes(Vec<u8>),
    Redirect(String),
}

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Http(String),
    Decode(String),
    /// Location kind this backend cannot serve
    Unsupported(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O error: {}", e),
            StorageError::Http(e) => write!(f, "object store request failed: {}", e),
            StorageError::Decode(e) => write!(f, "corrupt inline image: {}", e),
            StorageError::Unsupported(e) => write!(f, "unsupported location: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Persist `data` under `key` and return where it ended up.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<ImageLocation, StorageError>;

    async fn fetch(&self, location: &ImageLocation) -> Result<Fetched, StorageError>;

    async fn delete(&self, location: &ImageLocation) -> Result<(), StorageError>;
}

/// Storage key for one variant of an image.
pub fn object_key(id: &str, size: ImageSize, extension: &str) -> String {
    format!("{}/{}.{}", size.as_str(), id, extension)
}

/// Locations that need no backend state to resolve. Lets a backend serve
/// records written before the storage mode was switched.
fn fetch_portable(location: &ImageLocation) -> Option<Result<Fetched, StorageError>> {
    match location {
        ImageLocation::Inline { data } => Some(
            STANDARD
                .decode(data)
                .map(Fetched::Bytes)
                .map_err(|e| StorageError::Decode(e.to_string())),
        ),
        ImageLocation::Remote { url } => Some(Ok(Fetched::Redirect(url.clone()))),
        ImageLocation::File { .. } => None,
    }
}

pub fn build_store(config: &Config) -> Result<Arc<dyn ImageStore>, StorageError> {
    let store: Arc<dyn ImageStore> = match &config.storage {
        StorageKind::Inline => Arc::new(InlineStore),
        StorageKind::Local => Arc::new(LocalStore::new(config.upload_dir.clone())?),
        StorageKind::Remote(remote) => Arc::new(RemoteStore::new(remote.clone())?),
    };
    Ok(store)
}
