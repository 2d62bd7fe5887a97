//! Images embedded in the memory document itself.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use memory_wall_types::ImageLocation;

use super::{Fetched, ImageStore, StorageError, fetch_portable};

pub struct InlineStore;

#[async_trait]
impl ImageStore for InlineStore {
    fn name(&self) -> &'static str {
        "inline"
    }

    async fn put(
        &self,
        _key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<ImageLocation, StorageError> {
        Ok(ImageLocation::Inline {
            data: STANDARD.encode(data),
        })
    }

    async fn fetch(&self, location: &ImageLocation) -> Result<Fetched, StorageError> {
        fetch_portable(location).unwrap_or_else(|| {
            Err(StorageError::Unsupported(
                "file locations need the local backend".to_string(),
            ))
        })
    }

    // Bytes go away with the document.
    async fn delete(&self, _location: &ImageLocation) -> Result<(), StorageError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inline_round_trip() {
        let store = InlineStore;
        let location = store
            .put("original/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert!(matches!(location, ImageLocation::Inline { .. }));
        assert_eq!(
            store.fetch(&location).await.unwrap(),
            Fetched::Bytes(vec![1, 2, 3])
        );
    }

    #[tokio::test]
    async fn test_inline_rejects_file_location() {
        let location = ImageLocation::File {
            path: "original/a.png".to_string(),
        };
        assert!(matches!(
            InlineStore.fetch(&location).await,
            Err(StorageError::Unsupported(_))
        ));
    }
}
