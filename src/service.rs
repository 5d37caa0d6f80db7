use crate::access::hierarchy;
use crate::access::visibility::{decide_access, display_filename, is_own_data, project_record};
use crate::blob::RowStore;
use crate::cache::{Clock, SystemClock, TtlCache};
use crate::catalog::DatasetCatalog;
use crate::error::{RegscanError, Result};
use crate::index::{writer, RecordIndex};
use crate::quota::{LimitStore, StorageLimit};
use crate::search::executor;
use crate::search::plate::{self, QueryPlan};
use crate::types::{
    Dataset, DatasetDraft, DatasetId, DatasetStatus, DatasetSummary, FieldHint, IndexRow,
    IngestOutcome, Principal, QuotaStatus, RecordDetail, Role, SearchPage,
};
use chrono::Utc;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// Root-tier principals all resolve to the same accessible set.
const ALL_ACTIVE_KEY: &str = "root:all-active";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Rows per index-insertion batch during ingest.
    pub index_batch_size: usize,
    /// Accessible-set cache TTL. Bounds read staleness after an
    /// out-of-band mutation in multi-instance deployments.
    pub access_ttl_secs: u64,
    pub access_cache_cap: usize,
    /// Phase 2 blob fetch timeout.
    pub blob_timeout_ms: u64,
    pub hits_per_page: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            index_batch_size: 500,
            access_ttl_secs: 300,
            access_cache_cap: 1024,
            blob_timeout_ms: 5_000,
            hits_per_page: 20,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = ServiceConfig::default();
        ServiceConfig {
            index_batch_size: env::var("REGSCAN_INDEX_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.index_batch_size),
            access_ttl_secs: env::var("REGSCAN_ACCESS_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_ttl_secs),
            access_cache_cap: env::var("REGSCAN_ACCESS_CACHE_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_cache_cap),
            blob_timeout_ms: env::var("REGSCAN_BLOB_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.blob_timeout_ms),
            hits_per_page: env::var("REGSCAN_HITS_PER_PAGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.hits_per_page),
        }
    }
}

/// The search engine facade.
///
/// Owns the record index, the dataset catalog, the storage-limit store, a
/// caller-supplied blob backend, and the per-process accessible-set cache.
/// Requests are stateless; datasets are immutable once ingested, so no
/// request-level locking is needed.
///
/// Create one with [`SearchService::new`], which returns
/// `Arc<SearchService>` (it is `Send + Sync` and designed to be shared).
pub struct SearchService {
    pub base_path: PathBuf,
    index: RecordIndex,
    catalog: DatasetCatalog,
    limits: LimitStore,
    blobs: Arc<dyn RowStore>,
    access_cache: TtlCache<Arc<HashSet<DatasetId>>>,
    config: ServiceConfig,
}

impl SearchService {
    pub fn new<P: AsRef<Path>>(base_path: P, blobs: Arc<dyn RowStore>) -> Result<Arc<Self>> {
        Self::with_config(base_path, blobs, ServiceConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(
        base_path: P,
        blobs: Arc<dyn RowStore>,
        config: ServiceConfig,
    ) -> Result<Arc<Self>> {
        Self::with_config_and_clock(base_path, blobs, config, Arc::new(SystemClock))
    }

    /// Full constructor with an injected clock, for deterministic cache
    /// expiry in tests.
    pub fn with_config_and_clock<P: AsRef<Path>>(
        base_path: P,
        blobs: Arc<dyn RowStore>,
        config: ServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<Self>> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        let index = RecordIndex::open_or_create_in_dir(base_path.join("index"))?;
        let catalog = DatasetCatalog::load_or_create(&base_path);
        let limits = LimitStore::load_or_create(&base_path);
        let access_cache = TtlCache::new(
            Duration::from_secs(config.access_ttl_secs),
            config.access_cache_cap,
            clock,
        );
        Ok(Arc::new(SearchService {
            base_path,
            index,
            catalog,
            limits,
            blobs,
            access_cache,
            config,
        }))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn catalog(&self) -> &DatasetCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &RecordIndex {
        &self.index
    }

    // ---- access resolution ------------------------------------------------

    /// The caller's accessible dataset set, memoized per principal (shared
    /// entry for root tier) until TTL or explicit invalidation.
    pub fn accessible_datasets(&self, principal: &Principal) -> Arc<HashSet<DatasetId>> {
        let key = if principal.role.is_root_tier() {
            ALL_ACTIVE_KEY.to_string()
        } else {
            format!("principal:{}", principal.id)
        };
        if let Some(cached) = self.access_cache.get(&key) {
            return cached;
        }
        let set = Arc::new(hierarchy::accessible_datasets(principal, &self.catalog));
        self.access_cache.insert(key, Arc::clone(&set));
        set
    }

    /// Invalidate one principal's cached accessible set, e.g. after an
    /// out-of-band sharing or supervision change.
    pub fn invalidate_access(&self, principal_id: &str) {
        self.access_cache
            .invalidate(&format!("principal:{}", principal_id));
    }

    /// Invalidate every cached accessible set. Called on any dataset
    /// lifecycle mutation.
    pub fn invalidate_all_access(&self) {
        self.access_cache.invalidate_all();
    }

    // ---- phase 1: fast list ----------------------------------------------

    pub fn search(
        &self,
        principal: &Principal,
        query: &str,
        hint: FieldHint,
        page: usize,
    ) -> Result<SearchPage> {
        self.search_with_page_size(principal, query, hint, page, self.config.hits_per_page)
    }

    pub fn search_with_page_size(
        &self,
        principal: &Principal,
        query: &str,
        hint: FieldHint,
        page: usize,
        hits_per_page: usize,
    ) -> Result<SearchPage> {
        let plan = plate::plan_query(query, hint);
        if let QueryPlan::Guidance(msg) = plan {
            tracing::debug!("[SEARCH] query '{}' returned guidance", query);
            return Ok(SearchPage::with_guidance(page, hits_per_page, msg));
        }

        let accessible = self.accessible_datasets(principal);
        if accessible.is_empty() {
            return Ok(SearchPage::empty(page, hits_per_page));
        }

        executor::execute_phase1(
            &self.index,
            &self.catalog,
            principal,
            &accessible,
            &plan,
            hint,
            page,
            hits_per_page,
        )
    }

    // ---- phase 2: detail on demand ----------------------------------------

    /// Fetch one record's full data.
    ///
    /// The entry's dataset membership is re-verified against the caller's
    /// accessible set — a capability check, never trust the id alone. Blob
    /// faults and timeouts surface as retryable [`RegscanError::BlobUnavailable`].
    pub async fn get_detail(&self, principal: &Principal, entry_id: &str) -> Result<RecordDetail> {
        let entry = self
            .index
            .get_entry(entry_id)?
            .ok_or_else(|| RegscanError::EntryNotFound(entry_id.to_string()))?;

        let accessible = self.accessible_datasets(principal);
        if !accessible.contains(&entry.dataset_ref) {
            return Err(RegscanError::AccessDenied(
                "no access to the requested record".to_string(),
            ));
        }

        let dataset = self
            .catalog
            .get(&entry.dataset_ref)
            .ok_or_else(|| RegscanError::DatasetNotFound(entry.dataset_ref.clone()))?;

        let decision = decide_access(principal, &dataset);

        let timeout = Duration::from_millis(self.config.blob_timeout_ms);
        let row = match tokio::time::timeout(
            timeout,
            self.blobs.fetch_row(&dataset.blob_ref, entry.row_no),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(RegscanError::BlobUnavailable(format!(
                    "row fetch timed out after {}ms",
                    self.config.blob_timeout_ms
                )))
            }
        };

        let record = project_record(decision, &row).ok_or_else(|| {
            RegscanError::AccessDenied("no access to the requested record".to_string())
        })?;

        Ok(RecordDetail {
            entry_id: entry.entry_id,
            dataset_id: dataset.id.clone(),
            file_name: display_filename(principal, &dataset),
            record,
        })
    }

    // ---- quota -------------------------------------------------------------

    pub fn check_quota(&self, principal: &Principal) -> Result<QuotaStatus> {
        self.limits.status(&self.catalog, principal)
    }

    pub fn check_ingest(&self, principal: &Principal, record_count: usize) -> Result<()> {
        self.limits
            .check_ingest(&self.catalog, principal, record_count)
    }

    pub fn set_limit(
        &self,
        caller: &Principal,
        target: &str,
        record_ceiling: u64,
        description: &str,
    ) -> Result<StorageLimit> {
        self.limits
            .set_override(caller, target, record_ceiling, description)
    }

    pub fn clear_limit(&self, caller: &Principal, target: &str) -> Result<()> {
        self.limits.clear_override(caller, target)
    }

    pub fn set_role_default(
        &self,
        caller: &Principal,
        role: Role,
        record_ceiling: u64,
    ) -> Result<()> {
        self.limits.set_role_default(caller, role, record_ceiling)
    }

    // ---- ingestion & lifecycle ---------------------------------------------

    /// Register and index one uploaded dataset.
    ///
    /// Quota is enforced up front; sharing grants are validated against the
    /// uploader's flags; index insertion is batched and best-effort, ending
    /// in Completed, Partial (with a failure count), or Failed.
    pub fn ingest_dataset(&self, draft: DatasetDraft, rows: &[IndexRow]) -> Result<IngestOutcome> {
        let DatasetDraft {
            id,
            file_name,
            uploader,
            assigned_to,
            co_assignees,
            share_targets,
            blob_ref,
        } = draft;

        if !matches!(uploader.role, Role::RootAdmin | Role::OrgAdmin | Role::Admin) {
            return Err(RegscanError::AccessDenied(
                "only admins may upload datasets".to_string(),
            ));
        }

        self.check_ingest(&uploader, rows.len())?;

        let top_down = uploader.role.is_root_tier();
        if top_down && assigned_to.is_none() {
            return Err(RegscanError::InvalidDataset(
                "a top-down upload must designate an assignee".to_string(),
            ));
        }
        if !top_down && !share_targets.is_empty() {
            if !uploader.can_share {
                return Err(RegscanError::AccessDenied(
                    "uploader is not allowed to share datasets".to_string(),
                ));
            }
            if !uploader.allowed_share_targets.is_empty() {
                for target in &share_targets {
                    if !uploader.allowed_share_targets.contains(target) {
                        return Err(RegscanError::AccessDenied(format!(
                            "sharing with '{}' is outside the uploader's allow-list",
                            target
                        )));
                    }
                }
            }
        }

        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let dataset = Dataset {
            id: id.clone(),
            file_name,
            uploaded_by: uploader.id.clone(),
            // Snapshot: visibility decisions for this dataset must not
            // change if the uploader's role changes later.
            uploader_role: uploader.role,
            assigned_to: if top_down { assigned_to } else { None },
            co_assignees: if top_down { co_assignees } else { Vec::new() },
            share_targets: if top_down { Vec::new() } else { share_targets },
            record_count: rows.len(),
            status: DatasetStatus::Processing,
            failed_batches: 0,
            blob_ref,
            created_at: Utc::now().timestamp_millis(),
        };
        self.catalog.insert(dataset);

        let stats = match writer::insert_entries(&self.index, &id, rows, self.config.index_batch_size)
        {
            Ok(stats) => stats,
            Err(e) => {
                self.catalog
                    .finish_ingest(&id, DatasetStatus::Failed, 0, 0);
                self.invalidate_all_access();
                return Err(e);
            }
        };

        let status = if stats.failed_batches == 0 {
            DatasetStatus::Completed
        } else if stats.indexed_rows > 0 {
            DatasetStatus::Partial
        } else {
            DatasetStatus::Failed
        };
        self.catalog
            .finish_ingest(&id, status, stats.indexed_rows, stats.failed_batches);
        self.invalidate_all_access();

        Ok(IngestOutcome {
            dataset_id: id,
            received_rows: rows.len(),
            indexed_rows: stats.indexed_rows,
            failed_batches: stats.failed_batches,
            status,
        })
    }

    /// Delete a dataset: index entries en masse, catalog row, and (best
    /// effort) the blob. Allowed for root tier and the primary owner.
    pub async fn delete_dataset(&self, caller: &Principal, dataset_id: &str) -> Result<()> {
        let dataset = self
            .catalog
            .get(dataset_id)
            .ok_or_else(|| RegscanError::DatasetNotFound(dataset_id.to_string()))?;

        let allowed = caller.role.is_root_tier()
            || (caller.role == Role::Admin && dataset.primary_owner() == Some(caller.id.as_str()));
        if !allowed {
            return Err(RegscanError::AccessDenied(
                "only the primary owner or a root-tier admin may delete a dataset".to_string(),
            ));
        }

        writer::delete_dataset_entries(&self.index, dataset_id)?;
        self.catalog.remove(dataset_id);
        if let Err(e) = self.blobs.delete_blob(&dataset.blob_ref).await {
            tracing::warn!(
                "[DELETE {}] blob {} not removed: {}",
                dataset_id,
                dataset.blob_ref,
                e
            );
        }
        self.invalidate_all_access();
        Ok(())
    }

    /// Accessible datasets with viewer-appropriate filenames, own data
    /// first, newest first within each group.
    pub fn list_datasets(&self, principal: &Principal) -> Vec<DatasetSummary> {
        let accessible = self.accessible_datasets(principal);
        let mut out: Vec<DatasetSummary> = accessible
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .map(|ds| DatasetSummary {
                id: ds.id.clone(),
                file_name: display_filename(principal, &ds),
                record_count: ds.record_count,
                status: ds.status,
                created_at: ds.created_at,
                own_data: is_own_data(principal, &ds),
            })
            .collect();
        out.sort_by(|a, b| {
            b.own_data
                .cmp(&a.own_data)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }
}
