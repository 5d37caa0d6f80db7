pub mod schema;
pub mod writer;

use crate::error::{RegscanError, Result};
use schema::EntryFields;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::TermQuery;
use tantivy::schema::{Field, IndexRecordOption, OwnedValue};
use tantivy::{Index as TantivyIndex, IndexReader, TantivyDocument, Term};

/// One stored index entry as read back from a search hit.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub entry_id: String,
    pub registration_id: String,
    pub chassis_id: String,
    pub dataset_ref: String,
    pub row_no: u64,
}

/// The queryable record index: `(registration, chassis, dataset)` triples
/// backed by Tantivy on disk.
///
/// Duplicate registration or chassis ids are permitted by design — the same
/// vehicle legitimately appears across datasets (and sometimes within one);
/// the index never deduplicates.
pub struct RecordIndex {
    inner: TantivyIndex,
    reader: IndexReader,
    fields: EntryFields,
}

impl RecordIndex {
    pub const DEFAULT_BUFFER_SIZE: usize = 20_000_000;

    pub fn open_or_create_in_dir<P: AsRef<Path>>(path: P) -> Result<Self> {
        std::fs::create_dir_all(path.as_ref())?;
        let (schema, fields) = schema::entry_schema();
        let dir = tantivy::directory::MmapDirectory::open(path.as_ref())
            .map_err(|e| RegscanError::Tantivy(e.to_string()))?;
        let inner = TantivyIndex::open_or_create(dir, schema)?;
        let reader = inner.reader()?;
        Ok(RecordIndex {
            inner,
            reader,
            fields,
        })
    }

    pub fn reader(&self) -> &IndexReader {
        &self.reader
    }

    pub fn fields(&self) -> &EntryFields {
        &self.fields
    }

    pub(crate) fn writer(&self) -> Result<tantivy::IndexWriter> {
        Ok(self.inner.writer(Self::DEFAULT_BUFFER_SIZE)?)
    }

    pub fn reload(&self) -> Result<()> {
        self.reader.reload()?;
        Ok(())
    }

    /// Point lookup by entry id. Returns `None` when the entry was never
    /// indexed or its dataset has been deleted.
    pub fn get_entry(&self, entry_id: &str) -> Result<Option<StoredEntry>> {
        let searcher = self.reader.searcher();
        let term = Term::from_field_text(self.fields.entry_id, entry_id);
        let query = TermQuery::new(term, IndexRecordOption::Basic);
        let top = searcher.search(&query, &TopDocs::with_limit(1))?;
        match top.first() {
            Some((_score, addr)) => {
                let doc: TantivyDocument = searcher.doc(*addr)?;
                Ok(Some(read_entry(&doc, &self.fields)?))
            }
            None => Ok(None),
        }
    }

    pub fn num_entries(&self) -> usize {
        self.reader
            .searcher()
            .segment_readers()
            .iter()
            .map(|r| r.num_docs() as usize)
            .sum()
    }
}

pub(crate) fn read_entry(doc: &TantivyDocument, fields: &EntryFields) -> Result<StoredEntry> {
    Ok(StoredEntry {
        entry_id: read_text(doc, fields.entry_id, "entry_id")?,
        registration_id: read_text(doc, fields.registration_id, "registration_id")?,
        chassis_id: read_text(doc, fields.chassis_id, "chassis_id")?,
        dataset_ref: read_text(doc, fields.dataset_ref, "dataset_ref")?,
        row_no: read_u64(doc, fields.row_no, "row_no")?,
    })
}

fn read_text(doc: &TantivyDocument, field: Field, name: &str) -> Result<String> {
    doc.get_first(field)
        .and_then(|v| {
            let owned: OwnedValue = v.into();
            match owned {
                OwnedValue::Str(s) => Some(s),
                _ => None,
            }
        })
        .ok_or_else(|| RegscanError::Tantivy(format!("stored field '{}' missing", name)))
}

fn read_u64(doc: &TantivyDocument, field: Field, name: &str) -> Result<u64> {
    doc.get_first(field)
        .and_then(|v| {
            let owned: OwnedValue = v.into();
            match owned {
                OwnedValue::U64(n) => Some(n),
                _ => None,
            }
        })
        .ok_or_else(|| RegscanError::Tantivy(format!("stored field '{}' missing", name)))
}
