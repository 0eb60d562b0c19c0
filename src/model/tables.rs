use crate::model::ids::Key;
use serde::{Deserialize, Serialize};

/// One row per constituency: ballot counts copied from `stats_cons`, the
/// margin/ENP metrics, and the province attributes joined on afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstituencySummary {
    pub cons_id: Option<Key>,
    pub turn_out: Option<u64>,
    pub valid_votes: Option<u64>,
    pub invalid_votes: Option<u64>,
    pub blank_votes: Option<u64>,
    pub party_list_turn_out: Option<u64>,
    pub party_list_valid_votes: Option<u64>,
    pub party_list_invalid_votes: Option<u64>,
    pub party_list_blank_votes: Option<u64>,
    pub counted_vote_stations: Option<u64>,
    pub percent_count: Option<f64>,
    pub margin_percent: Option<f64>,
    #[serde(rename = "ENP")]
    pub enp: Option<f64>,
    pub prov_id: Option<Key>,
    pub zone: Option<u64>,
    pub province: Option<String>,
}

/// One row per (constituency, candidate) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateVote {
    pub cons_id: Option<Key>,
    pub mp_app_id: Option<Key>,
    pub mp_app_vote: Option<u64>,
    pub mp_app_vote_percent: Option<f64>,
    pub mp_app_rank: Option<u64>,
    pub party_id: Option<Key>,
    pub mp_app_name: Option<String>,
    pub party_name: Option<String>,
}

/// One row per party-list candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyListCandidate {
    pub party_no: Option<Key>,
    pub list_no: Option<u64>,
    pub name: Option<String>,
    pub img_url: Option<String>,
    pub is_pm_candidate: bool,
}
