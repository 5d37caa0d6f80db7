use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RegscanError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Quota exceeded: ceiling {ceiling}, used {used}, requested {requested} (over by {shortfall})")]
    QuotaExceeded {
        ceiling: u64,
        used: u64,
        requested: u64,
        shortfall: u64,
    },

    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    #[error("Dataset not found: {0}")]
    DatasetNotFound(String),

    #[error("Blob storage unavailable: {0}")]
    BlobUnavailable(String),

    #[error("No storage limit configured for role: {0}")]
    MisconfiguredRole(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Tantivy error: {0}")]
    Tantivy(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[cfg(feature = "s3-blobs")]
    #[error("S3 error: {0}")]
    S3(String),
}

pub type Result<T> = std::result::Result<T, RegscanError>;

impl From<std::io::Error> for RegscanError {
    fn from(e: std::io::Error) -> Self {
        RegscanError::Io(e.to_string())
    }
}

impl From<tantivy::TantivyError> for RegscanError {
    fn from(e: tantivy::TantivyError) -> Self {
        RegscanError::Tantivy(e.to_string())
    }
}

impl From<serde_json::Error> for RegscanError {
    fn from(e: serde_json::Error) -> Self {
        RegscanError::Json(e.to_string())
    }
}

impl RegscanError {
    /// True for transient faults the caller may retry as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegscanError::BlobUnavailable(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RegscanError::AccessDenied(_) => StatusCode::FORBIDDEN,
            RegscanError::QuotaExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RegscanError::EntryNotFound(_) => StatusCode::NOT_FOUND,
            RegscanError::DatasetNotFound(_) => StatusCode::NOT_FOUND,
            RegscanError::BlobUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RegscanError::MisconfiguredRole(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RegscanError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            RegscanError::InvalidDataset(_) => StatusCode::BAD_REQUEST,
            RegscanError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RegscanError::Tantivy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RegscanError::Json(_) => StatusCode::BAD_REQUEST,
            RegscanError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            #[cfg(feature = "s3-blobs")]
            RegscanError::S3(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Axum IntoResponse implementation (feature-gated)
#[cfg(feature = "axum-support")]
use axum::response::{IntoResponse, Json, Response};
#[cfg(feature = "axum-support")]
use serde::Serialize;

#[cfg(feature = "axum-support")]
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[cfg(feature = "axum-support")]
impl IntoResponse for RegscanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_code, message, suggestion) = match &self {
            RegscanError::AccessDenied(msg) => (
                "access_denied",
                format!("Access denied: {}", msg),
                None,
            ),
            RegscanError::QuotaExceeded {
                ceiling,
                used,
                requested,
                shortfall,
            } => (
                "quota_exceeded",
                format!(
                    "Upload of {} records rejected: {} of {} already used, over by {}",
                    requested, used, ceiling, shortfall
                ),
                Some("Trim the upload or request a higher storage limit".to_string()),
            ),
            RegscanError::EntryNotFound(id) => (
                "entry_not_found",
                format!("Record entry '{}' does not exist", id),
                None,
            ),
            RegscanError::DatasetNotFound(id) => (
                "dataset_not_found",
                format!("Dataset '{}' does not exist", id),
                None,
            ),
            RegscanError::BlobUnavailable(msg) => (
                "blob_unavailable",
                format!("Blob storage unavailable: {}", msg),
                Some("Retry after a short delay".to_string()),
            ),
            RegscanError::MisconfiguredRole(role) => (
                "misconfigured_role",
                format!("No storage limit configured for role '{}'", role),
                Some("A root administrator must configure role defaults".to_string()),
            ),
            RegscanError::InvalidQuery(msg) => ("invalid_query", msg.clone(), None),
            RegscanError::InvalidDataset(msg) => ("invalid_dataset", msg.clone(), None),
            RegscanError::Io(e) => ("io_error", format!("IO error: {}", e), None),
            RegscanError::Tantivy(e) => ("internal_error", format!("Internal error: {}", e), None),
            RegscanError::Json(e) => ("json_error", format!("JSON error: {}", e), None),
            RegscanError::Config(e) => ("config_error", format!("Configuration error: {}", e), None),
            #[cfg(feature = "s3-blobs")]
            RegscanError::S3(e) => (
                "s3_error",
                format!("S3 error: {}", e),
                Some("Check REGSCAN_S3_BUCKET, REGSCAN_S3_REGION, and AWS credentials".to_string()),
            ),
        };

        let error_response = ErrorResponse {
            error: error_code.to_string(),
            message,
            request_id: format!("req_rs_{}", uuid::Uuid::new_v4()),
            suggestion,
        };

        let mut response = (status, Json(error_response)).into_response();
        if matches!(&self, RegscanError::BlobUnavailable(_)) {
            response
                .headers_mut()
                .insert("Retry-After", "5".parse().unwrap());
        }
        response
    }
}
