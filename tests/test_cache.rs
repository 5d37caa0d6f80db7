/// Accessible-set caching: TTL-bounded staleness, explicit invalidation.
mod common;

use common::*;
use regscan::types::{Dataset, DatasetStatus, FieldHint, Role};
use std::time::Duration;

fn out_of_band_dataset(id: &str, owner: &str) -> Dataset {
    Dataset {
        id: id.to_string(),
        file_name: format!("{}.xlsx", id),
        uploaded_by: owner.to_string(),
        uploader_role: Role::Admin,
        assigned_to: None,
        co_assignees: vec![],
        share_targets: vec![],
        record_count: 1,
        status: DatasetStatus::Completed,
        failed_batches: 0,
        blob_ref: format!("blob-{}", id),
        created_at: 0,
    }
}

/// A catalog mutation that bypasses the service (another instance, in a
/// multi-process deployment) is invisible until the TTL elapses.
#[test]
fn test_staleness_is_bounded_by_ttl() {
    let ctx = spawn_service();
    let a1 = admin("admin-1");

    assert!(ctx.service.accessible_datasets(&a1).is_empty());

    ctx.service
        .catalog()
        .insert(out_of_band_dataset("oob-1", "admin-1"));

    // Still the cached empty set.
    assert!(ctx.service.accessible_datasets(&a1).is_empty());

    // One TTL later the new dataset is visible.
    ctx.clock.advance(Duration::from_secs(301));
    let set = ctx.service.accessible_datasets(&a1);
    assert!(set.contains("oob-1"));
}

#[test]
fn test_per_principal_invalidation() {
    let ctx = spawn_service();
    let a1 = admin("admin-1");
    let root = root_admin("root-1");

    assert!(ctx.service.accessible_datasets(&a1).is_empty());
    let root_before = ctx.service.accessible_datasets(&root).len();

    ctx.service
        .catalog()
        .insert(out_of_band_dataset("oob-2", "admin-1"));
    ctx.service.invalidate_access("admin-1");

    // admin-1 recomputes immediately; the root-tier entry is untouched and
    // still stale.
    assert!(ctx.service.accessible_datasets(&a1).contains("oob-2"));
    assert_eq!(ctx.service.accessible_datasets(&root).len(), root_before);

    ctx.service.invalidate_all_access();
    assert!(ctx.service.accessible_datasets(&root).contains("oob-2"));
}

/// Service-driven mutations invalidate on their own: a fresh ingest is
/// searchable with no TTL wait.
#[test]
fn test_ingest_invalidates_the_cache() {
    let ctx = spawn_service();
    let a1 = admin("admin-1");

    // Prime the (empty) cached set.
    let page = ctx
        .service
        .search(&a1, "MH12AB1234", FieldHint::Either, 0)
        .unwrap();
    assert_eq!(page.total, 0);

    ctx.service
        .ingest_dataset(
            admin_draft("new.xlsx", &a1, &[], "blob-1"),
            &rows(&[("MH12AB1234", "CH1")]),
        )
        .unwrap();

    let page = ctx
        .service
        .search(&a1, "MH12AB1234", FieldHint::Either, 0)
        .unwrap();
    assert_eq!(page.total, 1);
}

/// Root-tier principals share one cached "all active" entry.
#[test]
fn test_root_tier_shares_one_cache_entry() {
    let ctx = spawn_service();

    ctx.service
        .catalog()
        .insert(out_of_band_dataset("oob-3", "admin-1"));

    // Prime via one root principal, read via another: same cached set.
    let first = ctx.service.accessible_datasets(&root_admin("root-a"));
    ctx.service
        .catalog()
        .insert(out_of_band_dataset("oob-4", "admin-1"));
    let second = ctx.service.accessible_datasets(&org_admin("org-b"));
    assert_eq!(*first, *second, "second root-tier reader hits the shared entry");
}
