//! Short-lived cache of image bytes read from durable storage.

use memory_wall_types::ImageSize;
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct ImageCache {
    entries: Cache<(String, ImageSize), Arc<CachedImage>>,
}

impl ImageCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(capacity)
                .build(),
        }
    }

    pub fn get(&self, id: &str, size: ImageSize) -> Option<Arc<CachedImage>> {
        self.entries.get(&(id.to_string(), size))
    }

    pub fn insert(&self, id: &str, size: ImageSize, image: CachedImage) -> Arc<CachedImage> {
        let image = Arc::new(image);
        self.entries.insert((id.to_string(), size), image.clone());
        image
    }
}
