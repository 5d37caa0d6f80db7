/// End-to-end visibility scenarios: assignment and sharing chains through
/// both search phases.
mod common;

use common::*;
use regscan::blob::RowStore;
use regscan::types::FieldHint;
use regscan::RegscanError;

/// Root admin uploads X assigned to admin-1 with co-assignee admin-2.
#[tokio::test]
async fn test_top_down_assignment_chains() {
    let ctx = spawn_service();
    let root = root_admin("root-1");

    ctx.blobs
        .put_rows("blob-x", &[full_row("MH12AB1234", "CHX1")])
        .await
        .unwrap();
    let outcome = ctx
        .service
        .ingest_dataset(
            top_down_draft("finance_feb.xlsx", &root, "admin-1", &["admin-2"], "blob-x"),
            &rows(&[("MH12AB1234", "CHX1")]),
        )
        .unwrap();

    // Owner chain: full fields, real filename, own data.
    for principal in [admin("admin-1"), field_agent("fa-1", "admin-1")] {
        let page = ctx
            .service
            .search(&principal, "MH12AB1234", FieldHint::Either, 0)
            .unwrap();
        assert_eq!(page.total, 1);
        let hit = &page.hits[0];
        assert_eq!(hit.file_name, "finance_feb.xlsx");
        assert!(hit.own_data);

        let detail = ctx.service.get_detail(&principal, &hit.entry_id).await.unwrap();
        assert_eq!(detail.file_name, "finance_feb.xlsx");
        assert!(detail.record.agreement_no.is_some());
        assert!(detail.record.outstanding_amount.is_some());
    }

    // Co-assignee chain: restricted fields, masked filename.
    for principal in [admin("admin-2"), field_agent("fa-2", "admin-2")] {
        let page = ctx
            .service
            .search(&principal, "MH12AB1234", FieldHint::Either, 0)
            .unwrap();
        assert_eq!(page.total, 1);
        let hit = &page.hits[0];
        assert_ne!(hit.file_name, "finance_feb.xlsx");
        assert!(!hit.own_data);

        let detail = ctx.service.get_detail(&principal, &hit.entry_id).await.unwrap();
        assert_ne!(detail.file_name, "finance_feb.xlsx");
        assert_eq!(detail.record.registration_id, "MH12AB1234");
        assert!(detail.record.agreement_no.is_none());
        assert!(detail.record.outstanding_amount.is_none());
        assert!(detail.record.customer_phone.is_none());
    }

    // Unrelated admin-3: nothing for X — filtered rows, denied detail.
    let a3 = admin("admin-3");
    let page = ctx
        .service
        .search(&a3, "MH12AB1234", FieldHint::Either, 0)
        .unwrap();
    assert_eq!(page.total, 0);

    let entry_id = format!("{}:0", outcome.dataset_id);
    let err = ctx.service.get_detail(&a3, &entry_id).await.unwrap_err();
    assert!(matches!(err, RegscanError::AccessDenied(_)));

    // Root tier: full fields, real filename.
    let detail = ctx.service.get_detail(&root, &entry_id).await.unwrap();
    assert_eq!(detail.file_name, "finance_feb.xlsx");
    assert!(detail.record.agreement_no.is_some());
}

/// Admin-1 (canShare) uploads Y and shares it with admin-2.
#[tokio::test]
async fn test_admin_share_chains() {
    let ctx = spawn_service();
    let a1 = sharing_admin("admin-1", &[]);

    ctx.blobs
        .put_rows("blob-y", &[full_row("KA01MX0007", "CHY1")])
        .await
        .unwrap();
    let outcome = ctx
        .service
        .ingest_dataset(
            admin_draft("recoveries_q1.xlsx", &a1, &["admin-2"], "blob-y"),
            &rows(&[("KA01MX0007", "CHY1")]),
        )
        .unwrap();

    // The uploading admin itself: full fields, real filename.
    let page = ctx
        .service
        .search(&a1, "KA01MX0007", FieldHint::Either, 0)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.hits[0].file_name, "recoveries_q1.xlsx");
    let detail = ctx
        .service
        .get_detail(&a1, &page.hits[0].entry_id)
        .await
        .unwrap();
    assert!(detail.record.agreement_no.is_some());

    // Admin-1's field agent: restricted fields, no real filename.
    let fa1 = field_agent("fa-1", "admin-1");
    let page = ctx
        .service
        .search(&fa1, "KA01MX0007", FieldHint::Either, 0)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_ne!(page.hits[0].file_name, "recoveries_q1.xlsx");
    let detail = ctx
        .service
        .get_detail(&fa1, &page.hits[0].entry_id)
        .await
        .unwrap();
    assert_eq!(detail.record.registration_id, "KA01MX0007");
    assert!(detail.record.agreement_no.is_none());

    // Share target and its subordinate: restricted fields, masked filename.
    for principal in [admin("admin-2"), auditor("aud-2", "admin-2")] {
        let page = ctx
            .service
            .search(&principal, "KA01MX0007", FieldHint::Either, 0)
            .unwrap();
        assert_eq!(page.total, 1);
        assert_ne!(page.hits[0].file_name, "recoveries_q1.xlsx");
        assert!(page.hits[0].file_name.starts_with("records-"));

        let detail = ctx
            .service
            .get_detail(&principal, &page.hits[0].entry_id)
            .await
            .unwrap();
        assert!(detail.record.agreement_no.is_none());
        assert!(detail.record.confirmer_name.is_none());
    }

    // Not shared: zero rows, not masked rows; detail is owner-or-nothing.
    let a3 = admin("admin-3");
    let page = ctx
        .service
        .search(&a3, "KA01MX0007", FieldHint::Either, 0)
        .unwrap();
    assert_eq!(page.total, 0);
    let err = ctx
        .service
        .get_detail(&a3, &format!("{}:0", outcome.dataset_id))
        .await
        .unwrap_err();
    assert!(matches!(err, RegscanError::AccessDenied(_)));
}

/// Masked names are stable per dataset, distinct across datasets, and
/// never collide with the real name.
#[tokio::test]
async fn test_masked_filenames_stable_and_distinct() {
    let ctx = spawn_service();
    let root = root_admin("root-1");

    let mut masked = Vec::new();
    for i in 0..4 {
        let blob = format!("blob-{}", i);
        let reg = format!("MH1{}AB123{}", i, i);
        ctx.service
            .ingest_dataset(
                top_down_draft(
                    &format!("upload_{}.xlsx", i),
                    &root,
                    "admin-1",
                    &["admin-2"],
                    &blob,
                ),
                &rows(&[(&reg, "CH1")]),
            )
            .unwrap();
    }

    let viewer = admin("admin-2");
    for summary_pass in 0..2 {
        let listing = ctx.service.list_datasets(&viewer);
        assert_eq!(listing.len(), 4);
        let mut names: Vec<String> = listing.iter().map(|d| d.file_name.clone()).collect();
        for name in &names {
            assert!(name.starts_with("records-"), "masked, not real: {}", name);
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 4, "masked names must not collide");
        if summary_pass == 0 {
            masked = names;
        } else {
            assert_eq!(masked, names, "masked names must be stable across calls");
        }
    }
}
