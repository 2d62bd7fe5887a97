//! Image ingestion and retrieval, memory creation and listing, guestbook.
//!
//! `MemoryWall` owns every moving part (document store, image backend,
//! pending-image registry, byte cache) and is handed to the HTTP layer as
//! shared state. Each operation returns `Result<_, AppError>` and the
//! route handlers only translate that into a response.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use memory_wall_types::*;
use std::sync::Arc;

use crate::cache::{CachedImage, ImageCache};
use crate::config::{Config, Limits};
use crate::db::Db;
use crate::error::AppError;
use crate::registry::{ExpiryHook, PendingImages};
use crate::storage::{Fetched, ImageStore, object_key};
use crate::thumbnail;

pub const MAX_PAGE_SIZE: u32 = 100;

/// One file from a multipart upload, fully buffered.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// What the image endpoint should send back.
#[derive(Debug, Clone)]
pub enum ImagePayload {
    Bytes(Arc<CachedImage>),
    Redirect(String),
}

pub struct MemoryWall {
    db: Arc<Db>,
    store: Arc<dyn ImageStore>,
    pending: PendingImages,
    cache: ImageCache,
    limits: Limits,
    api_url: String,
}

impl MemoryWall {
    pub fn new(db: Arc<Db>, store: Arc<dyn ImageStore>, config: &Config) -> Self {
        let pending = PendingImages::new(
            config.pending_image_ttl,
            Some(orphan_cleanup_hook(store.clone())),
        );
        Self {
            db,
            store,
            pending,
            cache: ImageCache::new(config.image_cache_ttl, config.image_cache_capacity),
            limits: config.limits.clone(),
            api_url: config.api_url.clone(),
        }
    }

    pub fn storage_name(&self) -> &'static str {
        self.store.name()
    }

    fn image_url(&self, id: &str) -> String {
        format!("{}/api/images/{}", self.api_url, id)
    }

    // =====================================================
    // Ingestion
    // =====================================================

    /// Validate, thumbnail, store and register a batch of uploads.
    /// Nothing is stored unless every file in the batch is acceptable.
    pub async fn upload(&self, files: Vec<UploadedFile>) -> Result<UploadResponse, AppError> {
        validate_batch(&files, &self.limits)?;

        let mut prepared = Vec::with_capacity(files.len());
        for file in files {
            let (max, quality) = (
                self.limits.thumbnail_max_dimension,
                self.limits.thumbnail_quality,
            );
            let data = file.data;
            let (data, thumb) = tokio::task::spawn_blocking(move || {
                let thumb = thumbnail::make_thumbnail(&data, max, quality);
                (data, thumb)
            })
            .await
            .map_err(|e| AppError::Backend(format!("thumbnail task failed: {}", e)))?;

            let thumb = thumb.map_err(|e| {
                AppError::Validation(format!(
                    "{}: {}",
                    file.file_name.as_deref().unwrap_or("upload"),
                    e
                ))
            })?;
            prepared.push((file.content_type, data, thumb));
        }

        let mut stored: Vec<ImageRef> = Vec::with_capacity(prepared.len());
        for (content_type, data, thumb) in prepared {
            match self.store_image(content_type, data, thumb).await {
                Ok(image) => stored.push(image),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e.into());
                }
            }
        }

        log::info!(
            "Stored {} uploaded image(s) in {} storage",
            stored.len(),
            self.store.name()
        );

        let image_ids: Vec<String> = stored.iter().map(|img| img.id.clone()).collect();
        let image_urls = image_ids
            .iter()
            .map(|id| format!("/api/images/{}", id))
            .collect();
        for image in stored {
            self.pending.register(image);
        }
        Ok(UploadResponse {
            image_urls,
            image_ids,
        })
    }

    async fn store_image(
        &self,
        content_type: String,
        data: Vec<u8>,
        thumb: Vec<u8>,
    ) -> Result<ImageRef, crate::storage::StorageError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let original_key = object_key(
            &id,
            ImageSize::Original,
            thumbnail::extension_for(&content_type),
        );
        let original = self.store.put(&original_key, data, &content_type).await?;

        let thumbnail_key = object_key(&id, ImageSize::Thumbnail, "jpg");
        let thumbnail = match self
            .store
            .put(&thumbnail_key, thumb, THUMBNAIL_CONTENT_TYPE)
            .await
        {
            Ok(location) => location,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&original).await {
                    log::warn!("Failed to remove orphaned original {}: {}", id, cleanup);
                }
                return Err(e);
            }
        };

        Ok(ImageRef {
            id,
            content_type,
            original,
            thumbnail,
        })
    }

    /// Best-effort removal of images stored earlier in a failed batch.
    async fn discard(&self, images: &[ImageRef]) {
        for image in images {
            for location in [&image.original, &image.thumbnail] {
                if let Err(e) = self.store.delete(location).await {
                    log::warn!("Failed to remove image {} after failed batch: {}", image.id, e);
                }
            }
        }
    }

    // =====================================================
    // Retrieval
    // =====================================================

    /// Cache, then pending uploads, then persisted memories.
    pub async fn fetch_image(&self, id: &str, size: ImageSize) -> Result<ImagePayload, AppError> {
        if let Some(hit) = self.cache.get(id, size) {
            log::debug!("Image cache hit: {} ({})", id, size.as_str());
            return Ok(ImagePayload::Bytes(hit));
        }

        if let Some(image) = self.pending.lookup(id) {
            return self.read(&image, size).await;
        }

        let image = self
            .db
            .find_image(id)
            .map_err(AppError::Backend)?
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        let payload = self.read(&image, size).await?;
        if let ImagePayload::Bytes(bytes) = &payload {
            self.cache.insert(id, size, (**bytes).clone());
        }
        Ok(payload)
    }

    async fn read(&self, image: &ImageRef, size: ImageSize) -> Result<ImagePayload, AppError> {
        match self.store.fetch(image.location(size)).await? {
            Fetched::Bytes(bytes) => Ok(ImagePayload::Bytes(Arc::new(CachedImage {
                content_type: image.content_type_for(size).to_string(),
                bytes,
            }))),
            Fetched::Redirect(url) => Ok(ImagePayload::Redirect(url)),
        }
    }

    // =====================================================
    // Memories
    // =====================================================

    pub async fn create_memory(&self, req: CreateMemoryRequest) -> Result<MemoryView, AppError> {
        let title = req.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        let date = req
            .date
            .as_deref()
            .ok_or_else(|| AppError::Validation("date is required".to_string()))
            .and_then(|raw| {
                normalize_date(raw)
                    .ok_or_else(|| AppError::Validation(format!("invalid date '{}'", raw)))
            })?;

        let images = self.pending.claim(&req.image_ids);
        if images.is_empty() {
            return Err(AppError::Validation("No valid images".to_string()));
        }

        let memory = Memory {
            id: uuid::Uuid::new_v4().simple().to_string(),
            title,
            date,
            description: req.description,
            tags: req.tags,
            images,
            created_at: now_timestamp(),
        };

        if let Err(e) = self.db.insert_memory(&memory) {
            self.pending.restore(memory.images);
            return Err(AppError::Backend(e));
        }

        log::info!(
            "Created memory {} with {} image(s)",
            memory.id,
            memory.images.len()
        );

        Ok(MemoryView {
            images: memory.images.iter().map(|img| self.image_url(&img.id)).collect(),
            id: memory.id,
            title: memory.title,
            date: memory.date,
            description: memory.description,
            tags: memory.tags,
            created_at: memory.created_at,
        })
    }

    /// `page` is 1-based; `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn list_memories(&self, page: u32, limit: u32) -> Result<Vec<MemorySummary>, AppError> {
        let listings = self
            .db
            .list_memories(page.max(1), limit.clamp(1, MAX_PAGE_SIZE))
            .map_err(AppError::Backend)?;

        Ok(listings
            .into_iter()
            .map(|m| MemorySummary {
                images: m.image_ids.iter().map(|id| self.image_url(id)).collect(),
                id: m.id,
                title: m.title,
                date: m.date,
                description: m.description,
                tags: m.tags,
            })
            .collect())
    }

    // =====================================================
    // Guestbook
    // =====================================================

    pub fn post_message(&self, req: CreateMessageRequest) -> Result<Message, AppError> {
        let visitor_name = req.visitor_name.trim();
        if visitor_name.is_empty() {
            return Err(AppError::Validation("visitorName is required".to_string()));
        }
        if req.content.trim().is_empty() {
            return Err(AppError::Validation("content is required".to_string()));
        }
        let time = match req.time.as_deref() {
            Some(raw) => normalize_date(raw)
                .ok_or_else(|| AppError::Validation(format!("invalid time '{}'", raw)))?,
            None => now_timestamp(),
        };

        self.db
            .insert_message(
                visitor_name,
                &req.content,
                req.mood.as_deref().unwrap_or_default(),
                &time,
            )
            .map_err(AppError::Backend)
    }

    pub fn list_messages(&self) -> Result<Vec<Message>, AppError> {
        self.db.list_messages().map_err(AppError::Backend)
    }

    // =====================================================
    // Status
    // =====================================================

    pub fn status(&self, uptime_secs: u64) -> ServiceStatus {
        ServiceStatus {
            running: true,
            uptime_secs,
            storage: self.store.name().to_string(),
            total_memories: self.db.count_memories().unwrap_or_else(|e| {
                log::warn!("Status: failed to count memories: {}", e);
                0
            }),
            total_messages: self.db.count_messages().unwrap_or_else(|e| {
                log::warn!("Status: failed to count messages: {}", e);
                0
            }),
            pending_images: self.pending.pending_count(),
        }
    }
}

/// Every file must be an image within the size limit, and the batch must
/// hold between one and `max_upload_files` files.
pub fn validate_batch(files: &[UploadedFile], limits: &Limits) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }
    if files.len() > limits.max_upload_files {
        return Err(AppError::Validation(format!(
            "Too many files: at most {} per upload",
            limits.max_upload_files
        )));
    }
    for file in files {
        let name = file.file_name.as_deref().unwrap_or("upload");
        if !file.content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "{}: only image files can be uploaded",
                name
            )));
        }
        if file.data.len() > limits.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "{}: file exceeds {} bytes",
                name, limits.max_upload_bytes
            )));
        }
    }
    Ok(())
}

/// Accept `YYYY-MM-DD` or RFC 3339 and produce a fixed-width UTC RFC 3339
/// string, so string order in the database is chronological order.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(
        day.and_hms_opt(0, 0, 0)?
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Delete stored bytes of pending images nobody claimed before expiry.
fn orphan_cleanup_hook(store: Arc<dyn ImageStore>) -> ExpiryHook {
    Arc::new(move |image: ImageRef| {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::warn!("No runtime to clean up expired image {}", image.id);
            return;
        };
        let store = store.clone();
        handle.spawn(async move {
            for location in [&image.original, &image.thumbnail] {
                if let Err(e) = store.delete(location).await {
                    log::warn!("Failed to remove expired image {}: {}", image.id, e);
                }
            }
        });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKind;
    use crate::storage::{InlineStore, LocalStore, StorageError};
    use crate::thumbnail::tests::png;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            api_url: "http://wall.test".to_string(),
            database_path: ":memory:".to_string(),
            storage: StorageKind::Inline,
            upload_dir: PathBuf::from("./uploads"),
            limits: Limits::default(),
            pending_image_ttl: Duration::from_secs(600),
            image_cache_ttl: Duration::from_secs(60),
            image_cache_capacity: 64,
        }
    }

    fn wall_with(store: Arc<dyn ImageStore>) -> MemoryWall {
        let db = Arc::new(Db::open(":memory:").unwrap());
        MemoryWall::new(db, store, &config())
    }

    fn wall_with_ttl(store: Arc<dyn ImageStore>, ttl: Duration) -> MemoryWall {
        let db = Arc::new(Db::open(":memory:").unwrap());
        let mut config = config();
        config.pending_image_ttl = ttl;
        MemoryWall::new(db, store, &config)
    }

    fn stored_files(root: &Path) -> usize {
        ["original", "thumbnail"]
            .iter()
            .filter_map(|dir| std::fs::read_dir(root.join(dir)).ok())
            .map(|entries| entries.count())
            .sum()
    }

    /// Local disk store whose `put` fails once `fail_at` writes have happened.
    struct FailingStore {
        inner: LocalStore,
        puts: AtomicUsize,
        fail_at: usize,
    }

    #[async_trait]
    impl ImageStore for FailingStore {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn put(
            &self,
            key: &str,
            data: Vec<u8>,
            content_type: &str,
        ) -> Result<ImageLocation, StorageError> {
            if self.puts.fetch_add(1, Ordering::SeqCst) >= self.fail_at {
                return Err(StorageError::Http("bucket unavailable".to_string()));
            }
            self.inner.put(key, data, content_type).await
        }

        async fn fetch(&self, location: &ImageLocation) -> Result<Fetched, StorageError> {
            self.inner.fetch(location).await
        }

        async fn delete(&self, location: &ImageLocation) -> Result<(), StorageError> {
            self.inner.delete(location).await
        }
    }

    fn file(content_type: &str, data: Vec<u8>) -> UploadedFile {
        UploadedFile {
            file_name: Some("photo".to_string()),
            content_type: content_type.to_string(),
            data,
        }
    }

    fn memory_request(date: &str, image_ids: Vec<String>) -> CreateMemoryRequest {
        CreateMemoryRequest {
            title: "Picnic".to_string(),
            date: Some(date.to_string()),
            description: "by the lake".to_string(),
            tags: vec!["summer".to_string()],
            image_ids,
        }
    }

    async fn bytes_of(wall: &MemoryWall, id: &str, size: ImageSize) -> Vec<u8> {
        match wall.fetch_image(id, size).await.unwrap() {
            ImagePayload::Bytes(img) => img.bytes.clone(),
            ImagePayload::Redirect(url) => panic!("unexpected redirect to {}", url),
        }
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(
            normalize_date("2024-05-01").as_deref(),
            Some("2024-05-01T00:00:00.000Z")
        );
        assert_eq!(
            normalize_date("2024-05-01T10:30:00+02:00").as_deref(),
            Some("2024-05-01T08:30:00.000Z")
        );
        assert!(normalize_date("yesterday").is_none());
    }

    #[test]
    fn test_batch_rejected_by_single_bad_file() {
        let limits = Limits::default();
        let files = vec![
            file("image/png", png(10, 10)),
            file("text/plain", b"hello".to_vec()),
        ];
        assert!(matches!(
            validate_batch(&files, &limits),
            Err(AppError::Validation(_))
        ));

        let oversized = vec![file("image/png", vec![0; limits.max_upload_bytes + 1])];
        assert!(matches!(
            validate_batch(&oversized, &limits),
            Err(AppError::Validation(_))
        ));

        let too_many: Vec<_> = (0..=limits.max_upload_files)
            .map(|_| file("image/png", png(2, 2)))
            .collect();
        assert!(validate_batch(&too_many, &limits).is_err());
        assert!(validate_batch(&[], &limits).is_err());
    }

    #[tokio::test]
    async fn test_undecodable_image_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let wall = wall_with(Arc::new(LocalStore::new(dir.path().to_path_buf()).unwrap()));

        let err = wall
            .upload(vec![
                file("image/png", png(20, 20)),
                file("image/png", b"not really a png".to_vec()),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!dir.path().join("original").exists());
        assert_eq!(wall.pending.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_then_claim_keeps_bytes() {
        let wall = wall_with(Arc::new(InlineStore));
        let original = png(1200, 900);
        let uploaded = wall
            .upload(vec![file("image/png", original.clone())])
            .await
            .unwrap();
        assert_eq!(uploaded.image_ids.len(), 1);
        let id = uploaded.image_ids[0].clone();
        assert_eq!(uploaded.image_urls[0], format!("/api/images/{}", id));

        let thumb_before = bytes_of(&wall, &id, ImageSize::Thumbnail).await;
        let original_before = bytes_of(&wall, &id, ImageSize::Original).await;
        assert_eq!(original_before, original);
        assert_ne!(thumb_before, original_before);

        let view = wall
            .create_memory(memory_request("2024-07-04", vec![id.clone()]))
            .await
            .unwrap();
        assert_eq!(view.images, vec![format!("http://wall.test/api/images/{}", id)]);
        assert!(wall.pending.lookup(&id).is_none());

        assert_eq!(bytes_of(&wall, &id, ImageSize::Thumbnail).await, thumb_before);
        assert_eq!(bytes_of(&wall, &id, ImageSize::Original).await, original_before);
        // Second read is served from the cache
        assert!(wall.cache.get(&id, ImageSize::Original).is_some());
    }

    #[tokio::test]
    async fn test_memory_keeps_only_valid_images() {
        let wall = wall_with(Arc::new(InlineStore));
        let uploaded = wall
            .upload(vec![file("image/png", png(8, 8)), file("image/png", png(9, 9))])
            .await
            .unwrap();
        let mut ids = uploaded.image_ids.clone();
        ids.push("does-not-exist".to_string());

        let view = wall
            .create_memory(memory_request("2024-01-01", ids.clone()))
            .await
            .unwrap();
        assert_eq!(view.images.len(), 2);

        // Everything already claimed
        let err = wall
            .create_memory(memory_request("2024-01-02", ids))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Validation("No valid images".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_memory_fields_do_not_claim() {
        let wall = wall_with(Arc::new(InlineStore));
        let uploaded = wall
            .upload(vec![file("image/png", png(8, 8))])
            .await
            .unwrap();

        let mut req = memory_request("not a date", uploaded.image_ids.clone());
        assert!(matches!(
            wall.create_memory(req).await,
            Err(AppError::Validation(_))
        ));
        req = memory_request("2024-01-01", uploaded.image_ids.clone());
        req.title = "  ".to_string();
        assert!(wall.create_memory(req).await.is_err());

        assert!(wall.pending.lookup(&uploaded.image_ids[0]).is_some());
    }

    #[tokio::test]
    async fn test_storage_failure_discards_earlier_images() {
        let dir = tempfile::tempdir().unwrap();
        // Two writes per image: the second image's original fails.
        let store = FailingStore {
            inner: LocalStore::new(dir.path().to_path_buf()).unwrap(),
            puts: AtomicUsize::new(0),
            fail_at: 2,
        };
        let wall = wall_with(Arc::new(store));

        let err = wall
            .upload(vec![file("image/png", png(20, 20)), file("image/png", png(30, 30))])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
        assert_eq!(stored_files(dir.path()), 0);
        assert_eq!(wall.pending.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_insert_returns_images_to_pending() {
        let wall = wall_with(Arc::new(InlineStore));
        let uploaded = wall
            .upload(vec![file("image/png", png(8, 8))])
            .await
            .unwrap();
        let id = uploaded.image_ids[0].clone();

        // Another memory already owns this image id, so the insert conflicts.
        let existing = Memory {
            id: "existing".to_string(),
            title: "Earlier".to_string(),
            date: "2023-01-01T00:00:00.000Z".to_string(),
            description: String::new(),
            tags: Vec::new(),
            images: vec![wall.pending.lookup(&id).unwrap()],
            created_at: "2023-01-01T00:00:00.000Z".to_string(),
        };
        wall.db.insert_memory(&existing).unwrap();

        let err = wall
            .create_memory(memory_request("2024-01-01", vec![id.clone()]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(wall.pending.lookup(&id).is_some());
    }

    #[tokio::test]
    async fn test_expired_upload_files_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().to_path_buf()).unwrap());
        let wall = wall_with_ttl(store, Duration::from_millis(50));

        let uploaded = wall
            .upload(vec![file("image/png", png(16, 16))])
            .await
            .unwrap();
        assert_eq!(stored_files(dir.path()), 2);

        tokio::time::sleep(Duration::from_millis(150)).await;
        let err = wall
            .create_memory(memory_request("2024-01-01", uploaded.image_ids.clone()))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::Validation("No valid images".to_string()));

        // Let the spawned deletions run
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(stored_files(dir.path()), 0);
        assert!(matches!(
            wall.fetch_image(&uploaded.image_ids[0], ImageSize::Original).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_claimed_files_survive_ttl() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(LocalStore::new(dir.path().to_path_buf()).unwrap());
        let wall = wall_with_ttl(store, Duration::from_millis(50));

        let original = png(16, 16);
        let uploaded = wall
            .upload(vec![file("image/png", original.clone())])
            .await
            .unwrap();
        let id = uploaded.image_ids[0].clone();
        wall.create_memory(memory_request("2024-01-01", vec![id.clone()]))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(wall.pending.pending_count(), 0);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(stored_files(dir.path()), 2);
        assert_eq!(bytes_of(&wall, &id, ImageSize::Original).await, original);
    }

    #[tokio::test]
    async fn test_status_survives_database_failure() {
        let wall = wall_with(Arc::new(InlineStore));
        wall.upload(vec![file("image/png", png(8, 8))]).await.unwrap();
        wall.db.poison();

        let status = wall.status(5);
        assert!(status.running);
        assert_eq!(status.total_memories, 0);
        assert_eq!(status.total_messages, 0);
        assert_eq!(status.pending_images, 1);
        assert!(wall.list_messages().is_err());
    }

    #[tokio::test]
    async fn test_unknown_image_not_found() {
        let wall = wall_with(Arc::new(InlineStore));
        assert!(matches!(
            wall.fetch_image("nope", ImageSize::Thumbnail).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_messages() {
        let wall = wall_with(Arc::new(InlineStore));
        wall.post_message(CreateMessageRequest {
            visitor_name: "ann".to_string(),
            content: "first".to_string(),
            mood: Some("happy".to_string()),
            time: Some("2024-01-01T00:00:00Z".to_string()),
        })
        .unwrap();
        let latest = wall
            .post_message(CreateMessageRequest {
                visitor_name: "bob".to_string(),
                content: "second".to_string(),
                mood: None,
                time: None,
            })
            .unwrap();
        assert_eq!(latest.mood, "");

        let listed = wall.list_messages().unwrap();
        assert_eq!(listed[0].visitor_name, "bob");

        assert!(matches!(
            wall.post_message(CreateMessageRequest {
                visitor_name: String::new(),
                content: "x".to_string(),
                mood: None,
                time: None,
            }),
            Err(AppError::Validation(_))
        ));
    }
}
