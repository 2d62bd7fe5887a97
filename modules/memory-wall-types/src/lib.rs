//! Shared types for the memory wall service and its HTTP clients.

use serde::{Deserialize, Serialize};

// =====================================================
// Domain Types
// =====================================================

/// A guestbook entry left by a visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub visitor_name: String,
    pub content: String,
    pub mood: String,
    pub time: String,
}

/// Where one variant (original or thumbnail) of an image lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageLocation {
    /// Base64 payload embedded in the owning document
    Inline { data: String },
    /// Path relative to the upload directory
    File { path: String },
    /// Public URL on a remote object store
    Remote { url: String },
}

/// A stored image: original plus thumbnail, addressed by a generated id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub id: String,
    /// Content type of the original upload. Thumbnails are always JPEG.
    pub content_type: String,
    pub original: ImageLocation,
    pub thumbnail: ImageLocation,
}

pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

impl ImageRef {
    pub fn location(&self, size: ImageSize) -> &ImageLocation {
        match size {
            ImageSize::Original => &self.original,
            ImageSize::Thumbnail => &self.thumbnail,
        }
    }

    pub fn content_type_for(&self, size: ImageSize) -> &str {
        match size {
            ImageSize::Original => &self.content_type,
            ImageSize::Thumbnail => THUMBNAIL_CONTENT_TYPE,
        }
    }
}

/// Which variant of an image a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    Thumbnail,
    Original,
}

impl ImageSize {
    /// Only an explicit `original` selects the full image; anything else
    /// (absent, `thumb`, `thumbnail`, garbage) gets the thumbnail.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("original") => ImageSize::Original,
            _ => ImageSize::Thumbnail,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Thumbnail => "thumbnail",
            ImageSize::Original => "original",
        }
    }
}

/// A persisted memory record with fully resolved image references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    pub images: Vec<ImageRef>,
    pub created_at: String,
}

// =====================================================
// Request Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub visitor_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_ids: Vec<String>,
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_urls: Vec<String>,
    pub image_ids: Vec<String>,
}

/// A memory as returned to clients: images rewritten to retrieval URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryView {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
    pub created_at: String,
}

/// Listing projection of a memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// =====================================================
// Service Status
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub running: bool,
    pub uptime_secs: u64,
    pub storage: String,
    pub total_memories: i64,
    pub total_messages: i64,
    pub pending_images: u64,
}
