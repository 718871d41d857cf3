//! Filesystem-backed blob store: one file per blob id under a root directory.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, instrument};

use crate::blobs::{BlobRef, BlobStore};
use crate::domain::BlobId;
use crate::errors::{Error, Result};

#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn blob_path(&self, id: &BlobId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    #[instrument(skip(self, reader), fields(filename = %filename), name = "blob_put")]
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<BlobRef> {
        fs::create_dir_all(&self.root).await.map_err(|err| Error::Io {
            source: err,
            context: format!("Failed to create blob root {}", self.root.display()),
        })?;

        let id = BlobId::new();
        let path = self.blob_path(&id);

        let mut file = fs::File::create(&path).await.map_err(|err| Error::Io {
            source: err,
            context: format!("Failed to create blob file {}", path.display()),
        })?;

        let size_bytes = tokio::io::copy(reader, &mut file).await.map_err(|err| Error::Io {
            source: err,
            context: format!("Failed to stream blob {}", path.display()),
        })?;

        file.flush().await.map_err(|err| Error::Io {
            source: err,
            context: format!("Failed to flush blob {}", path.display()),
        })?;

        debug!(blob_id = %id, size_bytes, "blob stored");

        Ok(BlobRef {
            id,
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size_bytes: size_bytes as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_streams_bytes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let mut data: &[u8] = b"%PDF-1.4 test document";
        let blob =
            store.put("file_report.pdf", "application/pdf", &mut data).await.unwrap();

        assert_eq!(blob.filename, "file_report.pdf");
        assert_eq!(blob.content_type, "application/pdf");
        assert_eq!(blob.size_bytes, 22);

        let stored = std::fs::read(dir.path().join(blob.id.as_str())).unwrap();
        assert_eq!(stored, b"%PDF-1.4 test document");
    }

    #[tokio::test]
    async fn put_creates_root_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("nested/blobs"));

        let mut data: &[u8] = b"png-bytes";
        let blob = store.put("file_logo.png", "image/png", &mut data).await.unwrap();
        assert!(store.root().join(blob.id.as_str()).exists());
    }

    #[tokio::test]
    async fn blobs_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let mut a: &[u8] = b"one";
        let mut b: &[u8] = b"two";
        let first = store.put("file_a.gif", "image/gif", &mut a).await.unwrap();
        let second = store.put("file_a.gif", "image/gif", &mut b).await.unwrap();
        assert_ne!(first.id, second.id);
    }
}
