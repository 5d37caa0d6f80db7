use crate::types::{Dataset, Principal, Role, RowRecord};
use sha2::{Digest, Sha256};

/// Field-level access to a dataset's rows, computed once per request and
/// threaded through; no other code path re-derives ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// No access at all. Rows are filtered out of lists and detail fetches
    /// return an access error — never a masked row.
    Denied,
    /// Identification fields only.
    Restricted,
    /// All fields, including financial/contact/confirmation data.
    Full,
}

impl AccessDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Denied)
    }
}

/// The single access rule keyed off the primary owner.
///
/// Top-down datasets: the assignee and its subordinates get full fields,
/// co-assignee chains get the restricted tier, everyone else is denied.
/// Admin-uploaded datasets are tighter: only the uploading admin itself
/// gets full fields — its subordinates and share-target chains get the
/// restricted tier, everyone else is denied outright. Root-tier requesters
/// see everything.
///
/// Pure function of (principal, dataset) so it is independently testable.
pub fn decide_access(principal: &Principal, dataset: &Dataset) -> AccessDecision {
    if principal.role.is_root_tier() {
        return AccessDecision::Full;
    }
    let scope = match principal.admin_scope() {
        Some(s) => s,
        None => return AccessDecision::Denied,
    };

    if dataset.is_top_down() {
        if dataset.primary_owner() == Some(scope) {
            return AccessDecision::Full;
        }
        if dataset.co_assignees.iter().any(|a| a == scope) {
            return AccessDecision::Restricted;
        }
        return AccessDecision::Denied;
    }

    if principal.role == Role::Admin && dataset.uploaded_by == principal.id {
        return AccessDecision::Full;
    }
    let restricted = dataset.primary_owner() == Some(scope)
        || dataset.share_targets.iter().any(|t| t == scope);
    if restricted {
        AccessDecision::Restricted
    } else {
        AccessDecision::Denied
    }
}

/// Stable masked filename for viewers outside the owner chain: derived
/// from the dataset id alone, so it never leaks the real name and cannot
/// be reversed.
pub fn masked_filename(dataset_id: &str) -> String {
    let digest = Sha256::digest(format!("regscan-file:{}", dataset_id).as_bytes());
    let hex = hex::encode(digest);
    format!("records-{}.xlsx", &hex[..10])
}

/// Real filename for root tier, the assignee chain of a top-down dataset,
/// and the uploading admin of its own dataset; masked for everyone else.
pub fn display_filename(principal: &Principal, dataset: &Dataset) -> String {
    if principal.role.is_root_tier() {
        return dataset.file_name.clone();
    }
    let real = if dataset.is_top_down() {
        is_own_data(principal, dataset)
    } else {
        principal.role == Role::Admin && dataset.uploaded_by == principal.id
    };
    if real {
        dataset.file_name.clone()
    } else {
        masked_filename(&dataset.id)
    }
}

/// Whether the dataset's primary owner matches the requester's admin
/// scope. Shared by filename visibility and the own-data-first sort so the
/// two can never disagree.
pub fn is_own_data(principal: &Principal, dataset: &Dataset) -> bool {
    match principal.admin_scope() {
        Some(scope) => dataset.primary_owner() == Some(scope),
        None => false,
    }
}

/// Project a full blob row down to the caller's tier. `None` means the
/// caller must not see the row at all.
pub fn project_record(decision: AccessDecision, row: &RowRecord) -> Option<RowRecord> {
    match decision {
        AccessDecision::Denied => None,
        AccessDecision::Full => Some(row.clone()),
        AccessDecision::Restricted => Some(RowRecord {
            registration_id: row.registration_id.clone(),
            chassis_id: row.chassis_id.clone(),
            engine_id: row.engine_id.clone(),
            customer_name: row.customer_name.clone(),
            make: row.make.clone(),
            agreement_no: None,
            branch: None,
            outstanding_amount: None,
            customer_phone: None,
            customer_address: None,
            confirmer_name: None,
            confirmer_phone: None,
        }),
    }
}
