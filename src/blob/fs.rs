use crate::blob::RowStore;
use crate::error::{RegscanError, Result};
use crate::types::RowRecord;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Filesystem-backed row store: one JSON-Lines file per dataset under a
/// base directory, line number = row number.
pub struct FsRowStore {
    base: PathBuf,
}

impl FsRowStore {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        FsRowStore {
            base: base.as_ref().to_path_buf(),
        }
    }

    fn blob_path(&self, blob_ref: &str) -> PathBuf {
        self.base.join(format!("{}.jsonl", blob_ref))
    }
}

#[async_trait]
impl RowStore for FsRowStore {
    async fn fetch_row(&self, blob_ref: &str, row_no: u64) -> Result<RowRecord> {
        let path = self.blob_path(blob_ref);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| RegscanError::BlobUnavailable(format!("{}: {}", path.display(), e)))?;
        let line = contents
            .lines()
            .nth(row_no as usize)
            .ok_or_else(|| RegscanError::EntryNotFound(format!("{}:{}", blob_ref, row_no)))?;
        serde_json::from_str(line)
            .map_err(|e| RegscanError::Json(format!("malformed blob row {}:{}: {}", blob_ref, row_no, e)))
    }

    async fn put_rows(&self, blob_ref: &str, rows: &[RowRecord]) -> Result<()> {
        tokio::fs::create_dir_all(&self.base).await?;
        let mut out = String::new();
        for row in rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        tokio::fs::write(self.blob_path(blob_ref), out).await?;
        Ok(())
    }

    async fn delete_blob(&self, blob_ref: &str) -> Result<()> {
        match tokio::fs::remove_file(self.blob_path(blob_ref)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RegscanError::BlobUnavailable(e.to_string())),
        }
    }
}
