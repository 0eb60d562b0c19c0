//! Left-outer enrichment of fact rows with dimension attributes.
//!
//! Every join updates the fact rows in place, so the left table never gains
//! or loses rows. Rows without a match keep `None`. When a dimension table
//! repeats a key, the first occurrence wins.

use crate::model::{CandidateVote, Constituency, ConstituencySummary, Key, Party, Province, RecordTable};
use serde_json::Value;
use std::collections::HashMap;

/// Which column of the MP candidate table supplied names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameColumn {
    /// The configured canonical column was present.
    Canonical(String),
    /// A `*name*` column was found and renamed to the canonical key.
    Renamed { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{table}: {detail}")]
pub struct SchemaMismatch {
    pub table: &'static str,
    pub detail: String,
}

/// Find the candidate name column, renaming a fallback to `canonical`.
///
/// Fallback order is the table's column order; the first column whose name
/// contains `name` (case-insensitive) is taken.
pub fn resolve_name_column(
    table: &mut RecordTable,
    canonical: &str,
) -> Result<NameColumn, SchemaMismatch> {
    if table.has_column(canonical) {
        return Ok(NameColumn::Canonical(canonical.to_string()));
    }

    let fallback = table
        .columns()
        .into_iter()
        .find(|column| column.to_lowercase().contains("name"))
        .map(str::to_string);

    match fallback {
        Some(from) => {
            table.rename_column(&from, canonical);
            Ok(NameColumn::Renamed {
                from,
                to: canonical.to_string(),
            })
        }
        None => Err(SchemaMismatch {
            table: "info_mp_candidate",
            detail: format!(
                "no `{}` column and no column containing \"name\" (columns: {})",
                canonical,
                table.columns().join(", ")
            ),
        }),
    }
}

/// Attach `mp_app_name` from the MP candidate table, keyed on `mp_app_id`.
pub fn join_candidate_names(
    rows: &mut [CandidateVote],
    mp_candidates: &mut RecordTable,
    canonical: &str,
) -> Result<NameColumn, SchemaMismatch> {
    let resolved = resolve_name_column(mp_candidates, canonical)?;

    let mut names: HashMap<Key, Option<String>> = HashMap::new();
    for record in &mp_candidates.rows {
        if let Some(id) = record.get("mp_app_id").and_then(Key::from_value) {
            let name = record.get(canonical).and_then(value_as_name);
            names.entry(id).or_insert(name);
        }
    }

    for row in rows.iter_mut() {
        row.mp_app_name = row
            .mp_app_id
            .as_ref()
            .and_then(|id| names.get(id).cloned().flatten());
    }
    Ok(resolved)
}

/// Attach `party_name`, keyed on `party_id`.
pub fn join_party_names(rows: &mut [CandidateVote], parties: &[Party]) {
    let names = index_first(parties, |p| p.key().cloned(), |p| p.party_name.clone());
    for row in rows.iter_mut() {
        row.party_name = lookup(&names, row.party_id.as_ref());
    }
}

/// Attach `prov_id` and `zone`, keyed on `cons_id`.
pub fn join_constituency_attributes(rows: &mut [ConstituencySummary], constituencies: &[Constituency]) {
    let attrs = index_first(
        constituencies,
        |c| c.cons_id.clone(),
        |c| (c.prov_id.clone(), c.zone),
    );
    for row in rows.iter_mut() {
        let (prov_id, zone) = row
            .cons_id
            .as_ref()
            .and_then(|id| attrs.get(id).cloned())
            .unwrap_or((None, None));
        row.prov_id = prov_id;
        row.zone = zone;
    }
}

/// Attach the `province` display name, keyed on `prov_id`.
pub fn join_province_names(rows: &mut [ConstituencySummary], provinces: &[Province]) {
    let names = index_first(provinces, |p| p.prov_id.clone(), |p| p.province.clone());
    for row in rows.iter_mut() {
        row.province = lookup(&names, row.prov_id.as_ref());
    }
}

fn index_first<T, V>(
    rows: &[T],
    key: impl Fn(&T) -> Option<Key>,
    value: impl Fn(&T) -> V,
) -> HashMap<Key, V> {
    let mut index = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(k) = key(row) {
            index.entry(k).or_insert_with(|| value(row));
        }
    }
    index
}

fn lookup(index: &HashMap<Key, Option<String>>, key: Option<&Key>) -> Option<String> {
    key.and_then(|k| index.get(k).cloned().flatten())
}

fn value_as_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
