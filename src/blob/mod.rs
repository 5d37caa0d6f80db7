pub mod fs;
#[cfg(feature = "s3-blobs")]
pub mod s3;

use crate::error::Result;
use crate::types::RowRecord;
use async_trait::async_trait;

pub use fs::FsRowStore;
#[cfg(feature = "s3-blobs")]
pub use s3::{S3Config, S3RowStore};

/// Storage backend for full row data, addressed as "row N of file".
///
/// Phase 1 search never touches this layer; Phase 2 fetches exactly one row
/// per call so blob reads stay proportional to user attention, not to
/// result-set size. Implementations report transient faults as
/// [`crate::RegscanError::BlobUnavailable`] so callers can retry — a failed
/// fetch must never degrade to "not found".
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Fetch one row of a dataset's blob.
    async fn fetch_row(&self, blob_ref: &str, row_no: u64) -> Result<RowRecord>;

    /// Write a dataset's full rows. Called by the ingestion pipeline, not
    /// by the search path.
    async fn put_rows(&self, blob_ref: &str, rows: &[RowRecord]) -> Result<()>;

    /// Remove a dataset's blob as part of the deletion cascade.
    async fn delete_blob(&self, blob_ref: &str) -> Result<()>;
}
