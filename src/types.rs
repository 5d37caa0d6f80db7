use serde::{Deserialize, Serialize};

/// Principal identifier — a plain string supplied by the auth layer.
pub type PrincipalId = String;
/// Dataset identifier — one ingested spreadsheet.
pub type DatasetId = String;
/// Index entry identifier — `"{dataset_id}:{row_no}"`.
pub type EntryId = String;

/// Fixed role hierarchy. Auditors and field agents act under a supervising
/// admin; root-tier roles see the whole catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    RootAdmin,
    OrgAdmin,
    Admin,
    Auditor,
    FieldAgent,
}

impl Role {
    /// RootAdmin and OrgAdmin: catalog-wide access, always real filenames.
    pub fn is_root_tier(&self) -> bool {
        matches!(self, Role::RootAdmin | Role::OrgAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::RootAdmin => "rootAdmin",
            Role::OrgAdmin => "orgAdmin",
            Role::Admin => "admin",
            Role::Auditor => "auditor",
            Role::FieldAgent => "fieldAgent",
        }
    }
}

/// An authenticated actor, supplied by the auth layer on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    pub role: Role,
    /// Set for Auditor/FieldAgent. A subordinate without a supervisor is
    /// orphaned and resolves to an empty accessible set.
    #[serde(default)]
    pub supervising_admin: Option<PrincipalId>,
    /// Admin only: whether this admin may name share targets on upload.
    #[serde(default)]
    pub can_share: bool,
    /// Admin only: once populated this is an allow-list of admins that may
    /// be named as share targets; empty means no restriction.
    #[serde(default)]
    pub allowed_share_targets: Vec<PrincipalId>,
}

impl Principal {
    /// The admin identity this principal acts under: an Admin is its own
    /// scope, subordinates inherit their supervising admin, root-tier
    /// principals have none.
    pub fn admin_scope(&self) -> Option<&str> {
        match self.role {
            Role::Admin => Some(&self.id),
            Role::Auditor | Role::FieldAgent => self.supervising_admin.as_deref(),
            Role::RootAdmin | Role::OrgAdmin => None,
        }
    }
}

/// Dataset ingestion lifecycle. `Partial` is a first-class terminal state:
/// some index batches failed but the rest of the dataset is searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    Processing,
    Completed,
    Partial,
    Failed,
}

/// One ingested spreadsheet and its ownership/sharing metadata.
///
/// `uploader_role` is a snapshot taken at upload time and is never
/// re-derived from the live principal record: a later role change must not
/// retroactively change access to old datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: DatasetId,
    pub file_name: String,
    pub uploaded_by: PrincipalId,
    pub uploader_role: Role,
    /// Top-down uploads: the admin the dataset is assigned to.
    #[serde(default)]
    pub assigned_to: Option<PrincipalId>,
    /// Top-down uploads: other admins with restricted access.
    #[serde(default)]
    pub co_assignees: Vec<PrincipalId>,
    /// Admin uploads: peer admins granted restricted access.
    #[serde(default)]
    pub share_targets: Vec<PrincipalId>,
    pub record_count: usize,
    pub status: DatasetStatus,
    #[serde(default)]
    pub failed_batches: usize,
    pub blob_ref: String,
    pub created_at: i64,
}

impl Dataset {
    /// The admin canonically responsible for this dataset.
    ///
    /// Single source of truth for both visibility and search-priority
    /// ordering: top-down uploads are owned by the designated assignee,
    /// admin uploads by the uploader. A top-down upload with no assignee
    /// has no owner.
    pub fn primary_owner(&self) -> Option<&str> {
        if self.uploader_role.is_root_tier() {
            self.assigned_to.as_deref()
        } else {
            Some(&self.uploaded_by)
        }
    }

    /// Whether the dataset was assigned downward by a root-tier uploader.
    pub fn is_top_down(&self) -> bool {
        self.uploader_role.is_root_tier()
    }
}

/// One full row as stored in the blob layer.
///
/// The first five fields form the restricted (identification) tier; the
/// optional remainder is the full tier and is stripped by the visibility
/// engine for restricted viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    pub registration_id: String,
    pub chassis_id: String,
    pub engine_id: String,
    pub customer_name: String,
    pub make: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outstanding_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmer_phone: Option<String>,
}

/// Which index field a query should match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldHint {
    Registration,
    Chassis,
    #[default]
    Either,
}

/// One Phase 1 hit: index data plus provenance, never blob fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub entry_id: EntryId,
    pub registration_id: String,
    pub chassis_id: String,
    pub dataset_id: DatasetId,
    /// Real or masked, per the visibility engine.
    pub file_name: String,
    /// True when the dataset's primary owner matches the requester's scope;
    /// own data sorts first.
    pub own_data: bool,
}

/// A page of Phase 1 results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub page: usize,
    pub hits_per_page: usize,
    /// Total matches before pagination.
    pub total: usize,
    /// Set when the query was too short or ambiguous to run; the page is
    /// then empty but the call is not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl SearchPage {
    pub fn empty(page: usize, hits_per_page: usize) -> Self {
        SearchPage {
            hits: Vec::new(),
            page,
            hits_per_page,
            total: 0,
            guidance: None,
        }
    }

    pub fn with_guidance(page: usize, hits_per_page: usize, guidance: &str) -> Self {
        SearchPage {
            hits: Vec::new(),
            page,
            hits_per_page,
            total: 0,
            guidance: Some(guidance.to_string()),
        }
    }
}

/// Phase 2 result: one full row, projected to the caller's field tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDetail {
    pub entry_id: EntryId,
    pub dataset_id: DatasetId,
    /// Real or masked, per the visibility engine.
    pub file_name: String,
    /// Full-tier fields are `None` for restricted viewers.
    pub record: RowRecord,
}

/// Quota standing for one principal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    pub ceiling: u64,
    pub used: u64,
    pub remaining: u64,
}

/// One searchable row handed over by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRow {
    pub registration_id: String,
    pub chassis_id: String,
}

/// Dataset metadata handed over by the ingestion pipeline before indexing.
#[derive(Debug, Clone)]
pub struct DatasetDraft {
    /// Caller-supplied id; generated when absent.
    pub id: Option<DatasetId>,
    pub file_name: String,
    pub uploader: Principal,
    pub assigned_to: Option<PrincipalId>,
    pub co_assignees: Vec<PrincipalId>,
    pub share_targets: Vec<PrincipalId>,
    pub blob_ref: String,
}

/// Outcome of one dataset ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    pub dataset_id: DatasetId,
    pub received_rows: usize,
    pub indexed_rows: usize,
    pub failed_batches: usize,
    pub status: DatasetStatus,
}

/// Accessible-dataset listing row, filename already masked for the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub id: DatasetId,
    pub file_name: String,
    pub record_count: usize,
    pub status: DatasetStatus,
    pub created_at: i64,
    pub own_data: bool,
}
