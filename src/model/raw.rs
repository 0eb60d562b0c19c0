//! Wire shapes of the seven snapshot documents.
//!
//! Every scalar field is optional: a missing field decodes to `None` instead
//! of failing the whole document. Counts and percentages are read leniently,
//! so a numeric string such as `"1234"` is accepted where a number is expected.

use crate::model::ids::Key;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub(crate) fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_as_u64))
}

pub(crate) fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

pub(crate) fn lenient_key<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Key>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(Key::from_value))
}

pub(crate) fn nullable_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

pub(crate) fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

// ----------------------------- Dimension documents -----------------------------

/// `info_province.json`: an object wrapping the `province` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvinceDocument {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub province: Vec<Province>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
    #[serde(default, deserialize_with = "lenient_key")]
    pub prov_id: Option<Key>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constituency {
    #[serde(default, deserialize_with = "lenient_key")]
    pub cons_id: Option<Key>,
    #[serde(default, deserialize_with = "lenient_key")]
    pub prov_id: Option<Key>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub zone: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    #[serde(default, deserialize_with = "lenient_key")]
    pub party_id: Option<Key>,
    #[serde(default, deserialize_with = "lenient_key")]
    pub party_no: Option<Key>,
    #[serde(default)]
    pub party_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Party {
    /// Overview documents key parties by `party_id`, older snapshots by `party_no`.
    pub fn key(&self) -> Option<&Key> {
        self.party_id.as_ref().or(self.party_no.as_ref())
    }
}

/// A table of schemaless records, column order as first seen in the source.
///
/// The MP candidate document is kept in this form because its name column is
/// not stable across snapshot variants (`mp_app_name` in one, `name` or
/// `candidate_name` in others). The join stage resolves the column at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordTable {
    pub rows: Vec<Map<String, Value>>,
}

impl RecordTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of the rows' column names, in order of first appearance.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.rows {
            for name in row.keys() {
                if !columns.contains(&name.as_str()) {
                    columns.push(name.as_str());
                }
            }
        }
        columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(column))
    }

    /// Rename `from` to `to` in every row that carries it.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        for row in &mut self.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
    }
}

// ----------------------------- Party-list document -----------------------------

/// One entry of `info_party_candidate.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PartyCandidateGroup {
    #[serde(default, deserialize_with = "lenient_key")]
    pub party_no: Option<Key>,
    #[serde(default)]
    pub pm_candidates: Option<Vec<PartyListEntry>>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub party_list_candidates: Vec<PartyListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyListEntry {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub list_no: Option<u64>,
    #[serde(default, alias = "candidate_name", alias = "full_name")]
    pub name: Option<String>,
    #[serde(default, alias = "image", alias = "image_url")]
    pub img_url: Option<String>,
}

// ----------------------------- Result documents -----------------------------

/// `stats_cons.json`: province → constituency → candidate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstituencyStatsDocument {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub result_province: Vec<ProvinceResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvinceResult {
    #[serde(default, deserialize_with = "lenient_key")]
    pub prov_id: Option<Key>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub constituencies: Vec<ConstituencyResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstituencyResult {
    #[serde(default, deserialize_with = "lenient_key")]
    pub cons_id: Option<Key>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub turn_out: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub valid_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub invalid_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub blank_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub party_list_turn_out: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub party_list_valid_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub party_list_invalid_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub party_list_blank_votes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub counted_vote_stations: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub percent_count: Option<f64>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub candidates: Vec<CandidateResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateResult {
    #[serde(default, deserialize_with = "lenient_key")]
    pub mp_app_id: Option<Key>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub mp_app_vote: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mp_app_vote_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub mp_app_rank: Option<u64>,
    #[serde(default, deserialize_with = "lenient_key")]
    pub party_id: Option<Key>,
}
