use crate::types::{Dataset, DatasetId, DatasetStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogData {
    datasets: HashMap<DatasetId, Dataset>,
}

/// Persistent store of dataset metadata.
///
/// Dataset rows are written by the ingestion path and read by every search
/// request; the JSON file under the data directory is rewritten on each
/// mutation. Index entries and blob contents live elsewhere — this is
/// provenance only.
pub struct DatasetCatalog {
    data: RwLock<CatalogData>,
    file_path: PathBuf,
}

impl DatasetCatalog {
    pub fn load_or_create(data_dir: &Path) -> Self {
        let file_path = data_dir.join("datasets.json");
        let data = if file_path.exists() {
            match std::fs::read_to_string(&file_path) {
                Ok(contents) => match serde_json::from_str::<CatalogData>(&contents) {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Failed to parse datasets.json, recreating: {}", e);
                        CatalogData::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read datasets.json, recreating: {}", e);
                    CatalogData::default()
                }
            }
        } else {
            CatalogData::default()
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
                tracing::warn!("Failed to save datasets.json: {}", e);
            }
        }
    }

    pub fn insert(&self, dataset: Dataset) {
        let mut data = self.data.write().unwrap();
        data.datasets.insert(dataset.id.clone(), dataset);
        drop(data);
        self.save();
    }

    /// Move a dataset to its terminal ingest state, recording the rows that
    /// actually landed in the index and how many batches were lost.
    pub fn finish_ingest(
        &self,
        id: &str,
        status: DatasetStatus,
        record_count: usize,
        failed_batches: usize,
    ) -> bool {
        let mut data = self.data.write().unwrap();
        let updated = match data.datasets.get_mut(id) {
            Some(ds) => {
                ds.status = status;
                ds.record_count = record_count;
                ds.failed_batches = failed_batches;
                true
            }
            None => false,
        };
        drop(data);
        if updated {
            self.save();
        }
        updated
    }

    pub fn get(&self, id: &str) -> Option<Dataset> {
        let data = self.data.read().unwrap();
        data.datasets.get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Dataset> {
        let mut data = self.data.write().unwrap();
        let removed = data.datasets.remove(id);
        drop(data);
        if removed.is_some() {
            self.save();
        }
        removed
    }

    pub fn all(&self) -> Vec<Dataset> {
        let data = self.data.read().unwrap();
        data.datasets.values().cloned().collect()
    }

    /// Sum of record counts over a principal's own terminal uploads.
    /// Failed datasets hold no searchable rows and do not count; neither
    /// does an ingest still in flight.
    pub fn usage_for(&self, principal_id: &str) -> u64 {
        let data = self.data.read().unwrap();
        data.datasets
            .values()
            .filter(|ds| ds.uploaded_by == principal_id)
            .filter(|ds| matches!(ds.status, DatasetStatus::Completed | DatasetStatus::Partial))
            .map(|ds| ds.record_count as u64)
            .sum()
    }

    pub fn len(&self) -> usize {
        let data = self.data.read().unwrap();
        data.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
