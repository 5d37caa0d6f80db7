use crate::error::Result;
use crate::index::RecordIndex;
use crate::search::plate::normalize;
use crate::types::IndexRow;
use tantivy::{doc, Term};

/// Result of one bulk insertion run.
#[derive(Debug, Clone, Copy)]
pub struct InsertStats {
    pub indexed_rows: usize,
    pub failed_batches: usize,
    pub total_batches: usize,
}

/// Bulk-insert a dataset's searchable rows in fixed-size batches.
///
/// Best-effort: a failed batch is rolled back, logged, and counted, and the
/// remaining batches continue — partial ingestion is a terminal state, not
/// an error. Row numbers are positional and addressable in the blob layer
/// as "row N of file".
pub fn insert_entries(
    index: &RecordIndex,
    dataset_id: &str,
    rows: &[IndexRow],
    batch_size: usize,
) -> Result<InsertStats> {
    let mut writer = index.writer()?;
    let fields = *index.fields();

    let mut indexed_rows = 0usize;
    let mut failed_batches = 0usize;
    let mut total_batches = 0usize;

    for (batch_no, batch) in rows.chunks(batch_size.max(1)).enumerate() {
        total_batches += 1;
        let base_row = batch_no * batch_size.max(1);

        let add_result: Result<()> = (|| {
            for (offset, row) in batch.iter().enumerate() {
                let row_no = (base_row + offset) as u64;
                let entry_id = format!("{}:{}", dataset_id, row_no);
                writer.add_document(doc!(
                    fields.entry_id => entry_id,
                    fields.registration_id => normalize(&row.registration_id),
                    fields.chassis_id => normalize(&row.chassis_id),
                    fields.dataset_ref => dataset_id,
                    fields.row_no => row_no,
                ))?;
            }
            writer.commit()?;
            Ok(())
        })();

        match add_result {
            Ok(()) => indexed_rows += batch.len(),
            Err(e) => {
                tracing::warn!(
                    "[INGEST {}] batch {} ({} rows) failed, continuing: {}",
                    dataset_id,
                    batch_no,
                    batch.len(),
                    e
                );
                failed_batches += 1;
                let _ = writer.rollback();
            }
        }
    }

    index.reload()?;
    tracing::info!(
        "[INGEST {}] indexed {}/{} rows in {} batches ({} failed)",
        dataset_id,
        indexed_rows,
        rows.len(),
        total_batches,
        failed_batches
    );

    Ok(InsertStats {
        indexed_rows,
        failed_batches,
        total_batches,
    })
}

/// Delete every index entry belonging to a dataset. Entries are only ever
/// removed en masse as part of the dataset deletion cascade.
pub fn delete_dataset_entries(index: &RecordIndex, dataset_id: &str) -> Result<()> {
    let mut writer = index.writer()?;
    let term = Term::from_field_text(index.fields().dataset_ref, dataset_id);
    writer.delete_term(term);
    writer.commit()?;
    index.reload()?;
    tracing::info!("[DELETE {}] index entries removed", dataset_id);
    Ok(())
}
