//! Images written to a directory on local disk.

use async_trait::async_trait;
use memory_wall_types::ImageLocation;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use super::{Fetched, ImageStore, StorageError, fetch_portable};

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(relative);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StorageError::Unsupported(format!(
                "path outside upload directory: {}",
                relative
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl ImageStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<ImageLocation, StorageError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        Ok(ImageLocation::File {
            path: key.to_string(),
        })
    }

    async fn fetch(&self, location: &ImageLocation) -> Result<Fetched, StorageError> {
        match location {
            ImageLocation::File { path } => {
                let bytes = fs::read(self.resolve(path)?).await?;
                Ok(Fetched::Bytes(bytes))
            }
            other => fetch_portable(other).unwrap_or_else(|| {
                Err(StorageError::Unsupported("unknown location".to_string()))
            }),
        }
    }

    async fn delete(&self, location: &ImageLocation) -> Result<(), StorageError> {
        let ImageLocation::File { path } = location else {
            return Ok(());
        };
        match fs::remove_file(self.resolve(path)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
