use crate::blob::RowStore;
use crate::error::{RegscanError, Result};
use crate::types::RowRecord;
use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;

#[derive(Clone)]
pub struct S3Config {
    pub bucket_name: String,
    pub region: String,
    pub endpoint: Option<String>,
}

impl S3Config {
    pub fn from_env() -> Option<Self> {
        let bucket_name = std::env::var("REGSCAN_S3_BUCKET").ok()?;
        let region = std::env::var("REGSCAN_S3_REGION").unwrap_or_else(|_| "us-east-1".into());
        let endpoint = std::env::var("REGSCAN_S3_ENDPOINT").ok();
        Some(Self {
            bucket_name,
            region,
            endpoint,
        })
    }

    fn bucket_internal(&self) -> Result<Box<Bucket>> {
        let region = match &self.endpoint {
            Some(ep) => Region::Custom {
                region: self.region.clone(),
                endpoint: ep.clone(),
            },
            None => self
                .region
                .parse()
                .map_err(|e| RegscanError::S3(format!("Invalid region: {}", e)))?,
        };
        let creds = Credentials::default()
            .map_err(|e| RegscanError::S3(format!("S3 credentials: {}", e)))?;
        let bucket = Bucket::new(&self.bucket_name, region, creds)
            .map_err(|e| RegscanError::S3(format!("S3 bucket: {}", e)))?;
        Ok(bucket)
    }
}

/// S3-backed row store: one JSON-Lines object per dataset under
/// `datasets/`, line number = row number. A detail fetch downloads the
/// object and picks one line; the fetch-by-key contract matches the
/// filesystem backend.
pub struct S3RowStore {
    config: S3Config,
}

impl S3RowStore {
    pub fn new(config: S3Config) -> Self {
        S3RowStore { config }
    }

    fn object_key(blob_ref: &str) -> String {
        format!("datasets/{}.jsonl", blob_ref)
    }
}

#[async_trait]
impl RowStore for S3RowStore {
    async fn fetch_row(&self, blob_ref: &str, row_no: u64) -> Result<RowRecord> {
        let bucket = self.config.bucket_internal()?;
        let key = Self::object_key(blob_ref);
        let response = bucket
            .get_object(&key)
            .await
            .map_err(|e| RegscanError::BlobUnavailable(format!("S3 download: {}", e)))?;
        if response.status_code() != 200 {
            return Err(RegscanError::BlobUnavailable(format!(
                "S3 download failed: HTTP {}",
                response.status_code()
            )));
        }
        let contents = String::from_utf8(response.to_vec())
            .map_err(|e| RegscanError::Json(format!("blob {} is not UTF-8: {}", blob_ref, e)))?;
        let line = contents
            .lines()
            .nth(row_no as usize)
            .ok_or_else(|| RegscanError::EntryNotFound(format!("{}:{}", blob_ref, row_no)))?;
        serde_json::from_str(line)
            .map_err(|e| RegscanError::Json(format!("malformed blob row {}:{}: {}", blob_ref, row_no, e)))
    }

    async fn put_rows(&self, blob_ref: &str, rows: &[RowRecord]) -> Result<()> {
        let bucket = self.config.bucket_internal()?;
        let mut out = String::new();
        for row in rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        let key = Self::object_key(blob_ref);
        bucket
            .put_object(&key, out.as_bytes())
            .await
            .map_err(|e| RegscanError::S3(format!("S3 upload: {}", e)))?;
        tracing::info!("Uploaded blob s3://{}/{}", self.config.bucket_name, key);
        Ok(())
    }

    async fn delete_blob(&self, blob_ref: &str) -> Result<()> {
        let bucket = self.config.bucket_internal()?;
        let key = Self::object_key(blob_ref);
        bucket
            .delete_object(&key)
            .await
            .map_err(|e| RegscanError::S3(format!("S3 delete: {}", e)))?;
        tracing::info!("Deleted blob s3://{}/{}", self.config.bucket_name, key);
        Ok(())
    }
}
