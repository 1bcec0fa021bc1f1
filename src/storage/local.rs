//! Local-disk image store. Files land in the uploads directory under a
//! UUID name and are served back by the uploads controller at
//! `{self_url}/public/{name}`.

use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

use super::{ObjectStorage, StorageError, StoredImage, image_extension};

pub struct LocalImageStore {
    dir: PathBuf,
    public_base: String,
}

impl LocalImageStore {
    pub fn new(dir: PathBuf, public_base: String) -> Self {
        Self {
            dir,
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalImageStore {
    async fn upload(&self, data: Vec<u8>, filename: &str) -> Result<StoredImage, StorageError> {
        let ext = image_extension(filename)
            .ok_or_else(|| StorageError::UnsupportedType(filename.to_string()))?;

        let name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.join(&name);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, data).await?;

        Ok(StoredImage {
            url: format!("{}/public/{}", self.public_base, name),
            reference: name,
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), StorageError> {
        // The reference is a bare filename we generated; refuse anything else
        if reference.is_empty()
            || reference.contains('/')
            || reference.contains('\\')
            || reference.contains("..")
        {
            return Ok(());
        }

        match tokio::fs::remove_file(self.dir.join(reference)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_upload_and_delete() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().to_path_buf(), "http://localhost:8080".into());

        let stored = store.upload(vec![1, 2, 3], "avatar.png").await.unwrap();
        assert!(stored.url.starts_with("http://localhost:8080/public/"));
        assert!(stored.reference.ends_with(".png"));
        assert!(dir.path().join(&stored.reference).exists());

        store.delete(&stored.reference).await.unwrap();
        assert!(!dir.path().join(&stored.reference).exists());

        // Deleting again is not an error
        store.delete(&stored.reference).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().to_path_buf(), "http://localhost:8080".into());

        let result = store.upload(vec![0u8; 4], "payload.exe").await;
        assert!(matches!(result, Err(StorageError::UnsupportedType(_))));
    }

    #[tokio::test]
    async fn test_delete_ignores_traversal_references() {
        let dir = tempdir().unwrap();
        let store = LocalImageStore::new(dir.path().to_path_buf(), "http://localhost:8080".into());
        store.delete("../outside.png").await.unwrap();
    }
}
