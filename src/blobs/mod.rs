//! # Blob Store
//!
//! Large-object storage for uploaded documents. Records reference blobs by
//! opaque id; bytes are streamed in, never buffered whole in memory.

mod fs;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;
use utoipa::ToSchema;

use crate::domain::BlobId;
use crate::errors::Result;

pub use fs::FsBlobStore;

/// Reference returned by the blob store once a write stream completes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    pub id: BlobId,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// Streaming write interface to the blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stream the reader's bytes into a new blob under a generated id and
    /// return its reference. The reader is consumed chunk by chunk with
    /// flow-controlled backpressure.
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<BlobRef>;
}
