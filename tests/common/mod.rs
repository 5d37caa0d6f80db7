#![allow(dead_code)]

use regscan::blob::FsRowStore;
use regscan::cache::{Clock, ManualClock};
use regscan::types::*;
use regscan::{SearchService, ServiceConfig};
use std::sync::{Arc, Once};
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Honors RUST_LOG for test diagnostics; safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct TestCtx {
    pub service: Arc<SearchService>,
    pub blobs: Arc<FsRowStore>,
    pub clock: Arc<ManualClock>,
    _tmp: TempDir,
}

/// A service in a temp dir with generous role defaults already configured.
pub fn spawn_service() -> TestCtx {
    let ctx = spawn_unconfigured(ServiceConfig::default());
    seed_role_defaults(&ctx.service);
    ctx
}

pub fn spawn_service_with_config(config: ServiceConfig) -> TestCtx {
    let ctx = spawn_unconfigured(config);
    seed_role_defaults(&ctx.service);
    ctx
}

/// A service with no storage limits configured at all (quota lookups fail
/// closed until a root admin sets defaults).
pub fn spawn_unconfigured(config: ServiceConfig) -> TestCtx {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let blobs = Arc::new(FsRowStore::new(tmp.path().join("blobs")));
    let clock = Arc::new(ManualClock::new());
    let service = SearchService::with_config_and_clock(
        tmp.path(),
        blobs.clone(),
        config,
        clock.clone() as Arc<dyn Clock>,
    )
    .unwrap();
    TestCtx {
        service,
        blobs,
        clock,
        _tmp: tmp,
    }
}

pub fn seed_role_defaults(service: &SearchService) {
    let root = root_admin("limits-root");
    for role in [
        Role::RootAdmin,
        Role::OrgAdmin,
        Role::Admin,
        Role::Auditor,
        Role::FieldAgent,
    ] {
        service.set_role_default(&root, role, 1_000_000).unwrap();
    }
}

// ---- principals -----------------------------------------------------------

pub fn root_admin(id: &str) -> Principal {
    Principal {
        id: id.to_string(),
        name: format!("{} (root)", id),
        role: Role::RootAdmin,
        supervising_admin: None,
        can_share: false,
        allowed_share_targets: vec![],
    }
}

pub fn org_admin(id: &str) -> Principal {
    Principal {
        id: id.to_string(),
        name: format!("{} (org)", id),
        role: Role::OrgAdmin,
        supervising_admin: None,
        can_share: false,
        allowed_share_targets: vec![],
    }
}

pub fn admin(id: &str) -> Principal {
    Principal {
        id: id.to_string(),
        name: format!("{} (admin)", id),
        role: Role::Admin,
        supervising_admin: None,
        can_share: false,
        allowed_share_targets: vec![],
    }
}

pub fn sharing_admin(id: &str, allowed_share_targets: &[&str]) -> Principal {
    Principal {
        id: id.to_string(),
        name: format!("{} (admin)", id),
        role: Role::Admin,
        supervising_admin: None,
        can_share: true,
        allowed_share_targets: allowed_share_targets.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn auditor(id: &str, supervisor: &str) -> Principal {
    Principal {
        id: id.to_string(),
        name: format!("{} (auditor)", id),
        role: Role::Auditor,
        supervising_admin: Some(supervisor.to_string()),
        can_share: false,
        allowed_share_targets: vec![],
    }
}

pub fn field_agent(id: &str, supervisor: &str) -> Principal {
    Principal {
        id: id.to_string(),
        name: format!("{} (agent)", id),
        role: Role::FieldAgent,
        supervising_admin: Some(supervisor.to_string()),
        can_share: false,
        allowed_share_targets: vec![],
    }
}

// ---- datasets -------------------------------------------------------------

pub fn top_down_draft(
    file_name: &str,
    uploader: &Principal,
    assignee: &str,
    co_assignees: &[&str],
    blob_ref: &str,
) -> DatasetDraft {
    DatasetDraft {
        id: None,
        file_name: file_name.to_string(),
        uploader: uploader.clone(),
        assigned_to: Some(assignee.to_string()),
        co_assignees: co_assignees.iter().map(|s| s.to_string()).collect(),
        share_targets: vec![],
        blob_ref: blob_ref.to_string(),
    }
}

pub fn admin_draft(
    file_name: &str,
    uploader: &Principal,
    share_targets: &[&str],
    blob_ref: &str,
) -> DatasetDraft {
    DatasetDraft {
        id: None,
        file_name: file_name.to_string(),
        uploader: uploader.clone(),
        assigned_to: None,
        co_assignees: vec![],
        share_targets: share_targets.iter().map(|s| s.to_string()).collect(),
        blob_ref: blob_ref.to_string(),
    }
}

pub fn rows(pairs: &[(&str, &str)]) -> Vec<IndexRow> {
    pairs
        .iter()
        .map(|(reg, chassis)| IndexRow {
            registration_id: reg.to_string(),
            chassis_id: chassis.to_string(),
        })
        .collect()
}

/// A blob row with every full-tier field populated, so projection is
/// observable.
pub fn full_row(reg: &str, chassis: &str) -> RowRecord {
    RowRecord {
        registration_id: reg.to_string(),
        chassis_id: chassis.to_string(),
        engine_id: format!("EN-{}", reg),
        customer_name: "Ravi Kumar".to_string(),
        make: "Maruti Swift".to_string(),
        agreement_no: Some(format!("AG-{}", reg)),
        branch: Some("Pune West".to_string()),
        outstanding_amount: Some(245_000.0),
        customer_phone: Some("9876543210".to_string()),
        customer_address: Some("14 MG Road, Pune".to_string()),
        confirmer_name: Some("S. Patil".to_string()),
        confirmer_phone: Some("9123456780".to_string()),
    }
}
