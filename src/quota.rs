use crate::catalog::DatasetCatalog;
use crate::error::{RegscanError, Result};
use crate::types::{Principal, PrincipalId, QuotaStatus, Role};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// A per-principal record ceiling overriding the role default.
///
/// Deactivated limits are kept for audit; an inactive override reverts the
/// principal to the role default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLimit {
    pub principal_id: PrincipalId,
    pub record_ceiling: u64,
    pub description: String,
    pub set_by: PrincipalId,
    pub active: bool,
    pub created_at: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LimitData {
    #[serde(default)]
    role_defaults: HashMap<Role, u64>,
    #[serde(default)]
    overrides: HashMap<PrincipalId, StorageLimit>,
}

/// Persistent store of role-default ceilings and per-principal overrides.
/// All mutation is RootAdmin-only.
pub struct LimitStore {
    data: RwLock<LimitData>,
    file_path: PathBuf,
}

impl LimitStore {
    pub fn load_or_create(data_dir: &Path) -> Self {
        let file_path = data_dir.join("limits.json");
        let data = if file_path.exists() {
            match std::fs::read_to_string(&file_path) {
                Ok(contents) => match serde_json::from_str::<LimitData>(&contents) {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Failed to parse limits.json, recreating: {}", e);
                        LimitData::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read limits.json, recreating: {}", e);
                    LimitData::default()
                }
            }
        } else {
            LimitData::default()
        };

        let store = Self {
            data: RwLock::new(data),
            file_path,
        };
        store.save();
        store
    }

    fn save(&self) {
        let data = self.data.read().unwrap();
        if let Ok(json) = serde_json::to_string_pretty(&*data) {
            if let Some(parent) = self.file_path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(e) = std::fs::write(&self.file_path, json) {
                tracing::warn!("Failed to save limits.json: {}", e);
            }
        }
    }

    fn require_root_admin(caller: &Principal) -> Result<()> {
        if caller.role != Role::RootAdmin {
            return Err(RegscanError::AccessDenied(
                "only a root administrator may manage storage limits".to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_override(
        &self,
        caller: &Principal,
        target: &str,
        record_ceiling: u64,
        description: &str,
    ) -> Result<StorageLimit> {
        Self::require_root_admin(caller)?;
        let limit = StorageLimit {
            principal_id: target.to_string(),
            record_ceiling,
            description: description.to_string(),
            set_by: caller.id.clone(),
            active: true,
            created_at: Utc::now().timestamp_millis(),
        };
        let mut data = self.data.write().unwrap();
        data.overrides.insert(target.to_string(), limit.clone());
        drop(data);
        self.save();
        tracing::info!(
            "Storage limit for {} set to {} records by {}",
            target,
            record_ceiling,
            caller.id
        );
        Ok(limit)
    }

    /// Soft-delete: the principal reverts to its role default.
    pub fn clear_override(&self, caller: &Principal, target: &str) -> Result<()> {
        Self::require_root_admin(caller)?;
        let mut data = self.data.write().unwrap();
        let cleared = match data.overrides.get_mut(target) {
            Some(limit) => {
                limit.active = false;
                true
            }
            None => false,
        };
        drop(data);
        if cleared {
            self.save();
            tracing::info!("Storage limit override for {} deactivated", target);
        }
        Ok(())
    }

    pub fn set_role_default(&self, caller: &Principal, role: Role, record_ceiling: u64) -> Result<()> {
        Self::require_root_admin(caller)?;
        let mut data = self.data.write().unwrap();
        data.role_defaults.insert(role, record_ceiling);
        drop(data);
        self.save();
        tracing::info!(
            "Default storage limit for role {} set to {} records",
            role.as_str(),
            record_ceiling
        );
        Ok(())
    }

    pub fn get_override(&self, principal_id: &str) -> Option<StorageLimit> {
        let data = self.data.read().unwrap();
        data.overrides.get(principal_id).cloned()
    }

    /// Active override if present, else the role default. A role with no
    /// configured default is a server-side configuration fault: fail
    /// closed, never an unlimited allowance.
    pub fn ceiling_for(&self, principal: &Principal) -> Result<u64> {
        let data = self.data.read().unwrap();
        if let Some(limit) = data.overrides.get(&principal.id) {
            if limit.active {
                return Ok(limit.record_ceiling);
            }
        }
        data.role_defaults
            .get(&principal.role)
            .copied()
            .ok_or_else(|| RegscanError::MisconfiguredRole(principal.role.as_str().to_string()))
    }

    pub fn check_ingest(
        &self,
        catalog: &DatasetCatalog,
        principal: &Principal,
        record_count: usize,
    ) -> Result<()> {
        let ceiling = self.ceiling_for(principal)?;
        let used = catalog.usage_for(&principal.id);
        let requested = record_count as u64;
        if used + requested > ceiling {
            return Err(RegscanError::QuotaExceeded {
                ceiling,
                used,
                requested,
                shortfall: used + requested - ceiling,
            });
        }
        Ok(())
    }

    pub fn status(&self, catalog: &DatasetCatalog, principal: &Principal) -> Result<QuotaStatus> {
        let ceiling = self.ceiling_for(principal)?;
        let used = catalog.usage_for(&principal.id);
        Ok(QuotaStatus {
            ceiling,
            used,
            remaining: ceiling.saturating_sub(used),
        })
    }
}
