use crate::access::visibility::{decide_access, display_filename, is_own_data};
use crate::catalog::DatasetCatalog;
use crate::error::Result;
use crate::index::{read_entry, RecordIndex};
use crate::search::plate::QueryPlan;
use crate::types::{Dataset, DatasetId, FieldHint, Principal, SearchHit, SearchPage};
use std::collections::{HashMap, HashSet};
use tantivy::collector::DocSetCollector;
use tantivy::query::{BooleanQuery, Occur, Query as TantivyQuery, RegexQuery, TermSetQuery};
use tantivy::{TantivyDocument, Term};

/// Phase 1: index-only listing.
///
/// Builds the planned pattern query, scopes it to the caller's accessible
/// datasets, filters denied rows outright (never masked), attaches
/// provenance and the visibility-masked filename, and sorts own data first.
/// The blob layer is never touched here.
#[allow(clippy::too_many_arguments)]
pub fn execute_phase1(
    index: &RecordIndex,
    catalog: &DatasetCatalog,
    principal: &Principal,
    accessible: &HashSet<DatasetId>,
    plan: &QueryPlan,
    hint: FieldHint,
    page: usize,
    hits_per_page: usize,
) -> Result<SearchPage> {
    let fields = *index.fields();

    let mut field_queries: Vec<Box<dyn TantivyQuery>> = Vec::new();
    if hint != FieldHint::Chassis {
        if let Some(pattern) = plan.registration_pattern() {
            field_queries.push(Box::new(RegexQuery::from_pattern(
                &pattern,
                fields.registration_id,
            )?));
        }
    }
    if hint != FieldHint::Registration {
        if let Some(pattern) = plan.chassis_pattern() {
            field_queries.push(Box::new(RegexQuery::from_pattern(
                &pattern,
                fields.chassis_id,
            )?));
        }
    }

    let match_query: Box<dyn TantivyQuery> = match field_queries.len() {
        // No pattern applies to the hinted fields.
        0 => return Ok(SearchPage::empty(page, hits_per_page)),
        1 => field_queries.remove(0),
        _ => Box::new(BooleanQuery::union(field_queries)),
    };

    let scope_terms: Vec<Term> = accessible
        .iter()
        .map(|id| Term::from_field_text(fields.dataset_ref, id))
        .collect();
    let query = BooleanQuery::new(vec![
        (Occur::Must, match_query),
        (Occur::Must, Box::new(TermSetQuery::new(scope_terms))),
    ]);

    let searcher = index.reader().searcher();
    let doc_addresses = searcher.search(&query, &DocSetCollector)?;

    // One catalog read per accessible dataset, not per hit.
    let datasets: HashMap<DatasetId, Dataset> = accessible
        .iter()
        .filter_map(|id| catalog.get(id).map(|d| (id.clone(), d)))
        .collect();

    let mut rows: Vec<SearchHit> = Vec::with_capacity(doc_addresses.len());
    for addr in doc_addresses {
        let doc: TantivyDocument = searcher.doc(addr)?;
        let entry = read_entry(&doc, &fields)?;
        let dataset = match datasets.get(&entry.dataset_ref) {
            Some(d) => d,
            None => continue,
        };
        let decision = decide_access(principal, dataset);
        if decision.is_denied() {
            continue;
        }
        rows.push(SearchHit {
            entry_id: entry.entry_id,
            registration_id: entry.registration_id,
            chassis_id: entry.chassis_id,
            dataset_id: dataset.id.clone(),
            file_name: display_filename(principal, dataset),
            own_data: is_own_data(principal, dataset),
        });
    }

    // Own data first, then registration id; entry id keeps the order
    // stable across duplicate registrations.
    rows.sort_by(|a, b| {
        b.own_data
            .cmp(&a.own_data)
            .then_with(|| a.registration_id.cmp(&b.registration_id))
            .then_with(|| a.entry_id.cmp(&b.entry_id))
    });

    let total = rows.len();
    let hits = rows
        .into_iter()
        .skip(page.saturating_mul(hits_per_page))
        .take(hits_per_page)
        .collect();

    Ok(SearchPage {
        hits,
        page,
        hits_per_page,
        total,
        guidance: None,
    })
}
