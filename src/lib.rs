//! # Regscan
//!
//! A search engine for ingested vehicle-record datasets with hierarchical
//! visibility, storage quotas, and a two-phase query protocol. Built on
//! [Tantivy](https://github.com/quickwit-oss/tantivy).
//!
//! The index holds only the two searchable keys (registration and chassis
//! id) plus provenance; full rows live in a pluggable blob backend and are
//! fetched one at a time, on demand. Every request is evaluated against the
//! caller's position in the organizational hierarchy: who may see a row at
//! all, whether filenames are masked, and which field tier is visible.
//!
//! Regscan is an embeddable library — transport, authentication, and
//! spreadsheet parsing are the caller's concern.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use regscan::blob::FsRowStore;
//! use regscan::types::FieldHint;
//! use regscan::SearchService;
//! use std::sync::Arc;
//!
//! # fn main() -> regscan::Result<()> {
//! # let admin: regscan::types::Principal = todo!();
//! let blobs = Arc::new(FsRowStore::new("./data/blobs"));
//! let service = SearchService::new("./data", blobs)?;
//!
//! // Phase 1: fast, index-only listing (no blob reads)
//! let page = service.search(&admin, "MH12AB1234", FieldHint::Either, 0)?;
//! println!("{} matches", page.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Dependencies | Use case |
//! |---------|-------------|----------|
//! | `axum-support` | axum | [`RegscanError`] implements `IntoResponse` |
//! | `s3-blobs` | rust-s3 | S3-backed row storage via [`blob::s3`] |

pub mod access;
pub mod blob;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod index;
pub mod quota;
pub mod search;
pub mod service;
pub mod types;

pub use access::visibility::AccessDecision;
pub use blob::RowStore;
pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use error::{RegscanError, Result};
pub use quota::StorageLimit;
pub use service::{SearchService, ServiceConfig};
pub use types::*;
