//! Walks the nested result documents into flat rows.

use crate::model::raw::{ConstituencyStatsDocument, PartyCandidateGroup};
use crate::model::{CandidateVote, ConstituencySummary, PartyListCandidate};
use crate::normalizers::NameNormalizer;
use std::collections::HashSet;

/// One summary row per constituency node, in document order.
pub fn summary_rows(stats: &ConstituencyStatsDocument) -> Vec<ConstituencySummary> {
    stats
        .result_province
        .iter()
        .flat_map(|province| province.constituencies.iter())
        .map(|cons| ConstituencySummary {
            cons_id: cons.cons_id.clone(),
            turn_out: cons.turn_out,
            valid_votes: cons.valid_votes,
            invalid_votes: cons.invalid_votes,
            blank_votes: cons.blank_votes,
            party_list_turn_out: cons.party_list_turn_out,
            party_list_valid_votes: cons.party_list_valid_votes,
            party_list_invalid_votes: cons.party_list_invalid_votes,
            party_list_blank_votes: cons.party_list_blank_votes,
            counted_vote_stations: cons.counted_vote_stations,
            percent_count: cons.percent_count,
            ..ConstituencySummary::default()
        })
        .collect()
}

/// One row per candidate node, tagged with the owning `cons_id`.
pub fn candidate_rows(stats: &ConstituencyStatsDocument) -> Vec<CandidateVote> {
    let mut rows = Vec::new();
    for province in &stats.result_province {
        for cons in &province.constituencies {
            for candidate in &cons.candidates {
                rows.push(CandidateVote {
                    cons_id: cons.cons_id.clone(),
                    mp_app_id: candidate.mp_app_id.clone(),
                    mp_app_vote: candidate.mp_app_vote,
                    mp_app_vote_percent: candidate.mp_app_vote_percent,
                    mp_app_rank: candidate.mp_app_rank,
                    party_id: candidate.party_id.clone(),
                    mp_app_name: None,
                    party_name: None,
                });
            }
        }
    }
    rows
}

/// One row per party-list candidate.
///
/// `is_pm_candidate` is set when the candidate's normalized name appears in
/// the normalized names of the same party's `pm_candidates`. A party without
/// that list never flags anyone.
pub fn party_list_rows(
    groups: &[PartyCandidateGroup],
    normalizer: &NameNormalizer,
) -> Vec<PartyListCandidate> {
    let mut rows = Vec::new();
    for group in groups {
        let pm_names: HashSet<String> = group
            .pm_candidates
            .iter()
            .flatten()
            .filter_map(|pm| pm.name.as_deref())
            .map(|name| normalizer.normalize(name))
            .collect();

        for entry in &group.party_list_candidates {
            let is_pm_candidate = entry
                .name
                .as_deref()
                .map(|name| pm_names.contains(&normalizer.normalize(name)))
                .unwrap_or(false);

            rows.push(PartyListCandidate {
                party_no: group.party_no.clone(),
                list_no: entry.list_no,
                name: entry.name.clone(),
                img_url: entry.img_url.clone(),
                is_pm_candidate,
            });
        }
    }
    rows
}
