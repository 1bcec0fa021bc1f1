//! Remote image store. Forwards the uploaded bytes as a multipart form
//! to an external image-host service and records the URL + reference it
//! returns. Enabled by setting IMAGE_STORE_URL.

use async_trait::async_trait;
use serde::Deserialize;

use super::{ObjectStorage, StorageError, StoredImage, image_extension, mime_for_ext};

pub struct RemoteImageStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
    reference: String,
}

impl RemoteImageStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ObjectStorage for RemoteImageStore {
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<StoredImage, StorageError> {
        let ext = image_extension(filename)
            .ok_or_else(|| StorageError::UnsupportedType(filename.to_string()))?;

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(mime_for_ext(&ext))
            .map_err(|e| StorageError::Upstream(e.to_string()))?;

        let form = reqwest::multipart::Form::new().part("image", part);

        let resp = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| StorageError::Upstream(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            log::error!("Image store returned {}: {}", status, body);
            return Err(StorageError::Upstream(format!("{}", status)));
        }

        let parsed: UploadResponse = resp
            .json()
            .await
            .map_err(|e| StorageError::Upstream(e.to_string()))?;

        Ok(StoredImage {
            url: parsed.url,
            reference: parsed.reference,
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        if reference.is_empty() {
            return Ok(());
        }

        let resp = self
            .client
            .delete(format!("{}/images/{}", self.base_url, reference))
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| StorageError::Upstream(e.to_string()))?;

        // 404 from the remote means the object is already gone
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::Upstream(format!("{}", resp.status())));
        }

        Ok(())
    }
}
