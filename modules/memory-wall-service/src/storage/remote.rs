//! Images uploaded to an HTTP object store (COS/S3-style bucket).
//!
//! Objects are PUT to `{endpoint}/images/{key}` and served to clients by
//! redirecting them to `{public_url}/images/{key}`.

use async_trait::async_trait;
use memory_wall_types::ImageLocation;
use reqwest::Client;
use std::time::Duration;

use super::{Fetched, ImageStore, StorageError, fetch_portable};
use crate::config::RemoteStoreConfig;

const KEY_PREFIX: &str = "images";

pub struct RemoteStore {
    client: Client,
    config: RemoteStoreConfig,
}

impl RemoteStore {
    pub fn new(config: RemoteStoreConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::Http(format!("failed to build client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn object_path(key: &str) -> String {
        format!("{}/{}", KEY_PREFIX, key)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Map a public URL back onto the write endpoint.
    fn endpoint_url_for(&self, public: &str) -> Option<String> {
        public
            .strip_prefix(&self.config.public_url)
            .map(|rest| format!("{}{}", self.config.endpoint, rest))
    }
}

#[async_trait]
impl ImageStore for RemoteStore {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<ImageLocation, StorageError> {
        let path = Self::object_path(key);
        let target = format!("{}/{}", self.config.endpoint, path);
        log::debug!("Uploading {} ({} bytes)", target, data.len());

        self.authorize(self.client.put(&target))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| StorageError::Http(format!("PUT {}: {}", target, e)))?;

        Ok(ImageLocation::Remote {
            url: format!("{}/{}", self.config.public_url, path),
        })
    }

    async fn fetch(&self, location: &ImageLocation) -> Result<Fetched, StorageError> {
        fetch_portable(location).unwrap_or_else(|| {
            Err(StorageError::Unsupported(
                "file locations need the local backend".to_string(),
            ))
        })
    }

    async fn delete(&self, location: &ImageLocation) -> Result<(), StorageError> {
        let ImageLocation::Remote { url } = location else {
            return Ok(());
        };
        let target = self.endpoint_url_for(url).ok_or_else(|| {
            StorageError::Unsupported(format!("{} is not in this bucket", url))
        })?;

        let resp = self
            .authorize(self.client.delete(&target))
            .send()
            .await
            .map_err(|e| StorageError::Http(format!("DELETE {}: {}", target, e)))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        resp.error_for_status()
            .map_err(|e| StorageError::Http(format!("DELETE {}: {}", target, e)))?;
        Ok(())
    }
}
