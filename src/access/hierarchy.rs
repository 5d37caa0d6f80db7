use crate::catalog::DatasetCatalog;
use crate::types::{Dataset, DatasetId, DatasetStatus, Principal};
use std::collections::HashSet;

/// The set of datasets a principal may touch at all.
///
/// Root-tier principals see the whole live catalog. An admin sees its own
/// uploads, top-down uploads assigned to it (as assignee or co-assignee),
/// and peer uploads explicitly shared with it — peer visibility is opt-in,
/// never implied. Subordinates run the identical test under their
/// supervising admin; an orphaned subordinate resolves to the empty set.
pub fn accessible_datasets(principal: &Principal, catalog: &DatasetCatalog) -> HashSet<DatasetId> {
    let mut out = HashSet::new();

    if principal.role.is_root_tier() {
        for ds in catalog.all() {
            if ds.status != DatasetStatus::Failed {
                out.insert(ds.id);
            }
        }
        return out;
    }

    let scope = match principal.admin_scope() {
        Some(s) => s.to_string(),
        // No supervising admin: fail closed.
        None => return out,
    };

    for ds in catalog.all() {
        if ds.status == DatasetStatus::Failed {
            continue;
        }
        if scope_has_path(&ds, &scope) {
            out.insert(ds.id);
        }
    }
    out
}

/// Whether an admin scope has an ownership, assignment, or sharing path to
/// a dataset.
pub(crate) fn scope_has_path(dataset: &Dataset, scope: &str) -> bool {
    if dataset.uploaded_by == scope {
        return true;
    }
    if dataset.is_top_down() {
        return dataset.assigned_to.as_deref() == Some(scope)
            || dataset.co_assignees.iter().any(|a| a == scope);
    }
    dataset.share_targets.iter().any(|t| t == scope)
}
