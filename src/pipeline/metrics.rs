//! Per-constituency margin and Effective Number of Parties.

use crate::model::{CandidateVote, ConstituencySummary, Key};
use itertools::Itertools;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("no vote shares to measure")]
    NoShares,
    #[error("every vote share is zero")]
    DegenerateShares,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstituencyMetrics {
    pub cons_id: Key,
    pub margin_percent: Option<f64>,
    pub enp: Option<f64>,
}

/// Percentage-point gap between the first two rows of a rank-ordered group.
///
/// `None` when the group has fewer than two ranked rows or either share is
/// missing.
pub fn vote_margin(ranked: &[&CandidateVote]) -> Option<f64> {
    let mut top = ranked.iter().filter(|row| row.mp_app_rank.is_some());
    let first = top.next()?.mp_app_vote_percent?;
    let second = top.next()?.mp_app_vote_percent?;
    Some(first - second)
}

/// Laakso–Taagepera ENP from vote shares given in percent: `1 / Σ (s/100)²`.
pub fn effective_number_of_parties<I>(shares_percent: I) -> Result<f64, MetricError>
where
    I: IntoIterator<Item = f64>,
{
    let mut seen = false;
    let mut sum_sq = 0.0;
    for share in shares_percent {
        seen = true;
        let fraction = share / 100.0;
        sum_sq += fraction * fraction;
    }
    if !seen {
        return Err(MetricError::NoShares);
    }
    if sum_sq == 0.0 {
        return Err(MetricError::DegenerateShares);
    }
    Ok(1.0 / sum_sq)
}

/// Group candidate rows by `cons_id`, each group ordered by rank ascending
/// (unranked rows last). Rows without a `cons_id` are not grouped.
pub fn group_by_constituency(rows: &[CandidateVote]) -> BTreeMap<&Key, Vec<&CandidateVote>> {
    let mut groups: BTreeMap<&Key, Vec<&CandidateVote>> = BTreeMap::new();
    for row in rows {
        if let Some(cons_id) = row.cons_id.as_ref() {
            groups.entry(cons_id).or_default().push(row);
        }
    }
    for group in groups.values_mut() {
        group.sort_by_key(|row| (row.mp_app_rank.is_none(), row.mp_app_rank));
    }
    groups
}

/// Margin and ENP for every constituency that has candidate rows.
///
/// A constituency whose ENP cannot be computed gets `enp: None`; the error is
/// returned alongside so the caller can surface it.
pub fn constituency_metrics(
    rows: &[CandidateVote],
) -> (Vec<ConstituencyMetrics>, Vec<(Key, MetricError)>) {
    let mut metrics = Vec::new();
    let mut failures = Vec::new();

    for (cons_id, group) in group_by_constituency(rows) {
        let margin_percent = vote_margin(&group);
        let enp = match effective_number_of_parties(
            group.iter().filter_map(|row| row.mp_app_vote_percent),
        ) {
            Ok(enp) => Some(enp),
            Err(e) => {
                failures.push((cons_id.clone(), e));
                None
            }
        };
        metrics.push(ConstituencyMetrics {
            cons_id: cons_id.clone(),
            margin_percent,
            enp,
        });
    }

    (metrics, failures)
}

/// Left-merge metrics onto the summary by `cons_id`.
pub fn merge_metrics(summary: &mut [ConstituencySummary], metrics: &[ConstituencyMetrics]) {
    let by_id: HashMap<&Key, &ConstituencyMetrics> =
        metrics.iter().map(|m| (&m.cons_id, m)).collect();
    for row in summary.iter_mut() {
        let found = row.cons_id.as_ref().and_then(|id| by_id.get(id));
        row.margin_percent = found.and_then(|m| m.margin_percent);
        row.enp = found.and_then(|m| m.enp);
    }
}

/// Mean of the present values; `None` when there are none.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Rank-ordered share list of one group, for display and debugging.
pub fn ranked_shares(group: &[&CandidateVote]) -> String {
    group
        .iter()
        .map(|row| match (row.mp_app_rank, row.mp_app_vote_percent) {
            (Some(rank), Some(share)) => format!("#{} {:.2}%", rank, share),
            (None, Some(share)) => format!("#? {:.2}%", share),
            (Some(rank), None) => format!("#{} ?", rank),
            (None, None) => "#? ?".to_string(),
        })
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cons: &str, rank: Option<u64>, share: Option<f64>) -> CandidateVote {
        CandidateVote {
            cons_id: Some(Key::from(cons)),
            mp_app_rank: rank,
            mp_app_vote_percent: share,
            ..CandidateVote::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn three_way_race() {
        let rows = vec![
            row("C1", Some(2), Some(40.0)),
            row("C1", Some(3), Some(15.0)),
            row("C1", Some(1), Some(45.0)),
        ];
        let (metrics, failures) = constituency_metrics(&rows);
        assert!(failures.is_empty());
        assert_eq!(metrics.len(), 1);
        assert!(close(metrics[0].margin_percent.unwrap(), 5.0));
        assert!(close(metrics[0].enp.unwrap(), 1.0 / 0.385));
        assert!((metrics[0].enp.unwrap() - 2.597).abs() < 1e-3);
    }

    #[test]
    fn uncontested_seat() {
        let rows = vec![row("C2", Some(1), Some(100.0))];
        let (metrics, _) = constituency_metrics(&rows);
        assert_eq!(metrics[0].margin_percent, None);
        assert!(close(metrics[0].enp.unwrap(), 1.0));
    }

    #[test]
    fn enp_is_at_least_one() {
        let distributions: [&[f64]; 4] = [
            &[100.0],
            &[50.0, 50.0],
            &[33.3, 33.3, 33.4],
            &[70.0, 20.0, 5.0, 5.0],
        ];
        for shares in distributions {
            let enp = effective_number_of_parties(shares.iter().copied()).unwrap();
            assert!(enp >= 1.0 - 1e-12, "{:?} -> {}", shares, enp);
        }
        assert!(close(effective_number_of_parties([50.0, 50.0]).unwrap(), 2.0));
    }

    #[test]
    fn all_zero_shares_are_degenerate() {
        assert_eq!(
            effective_number_of_parties([0.0, 0.0]),
            Err(MetricError::DegenerateShares)
        );
        assert_eq!(
            effective_number_of_parties(std::iter::empty()),
            Err(MetricError::NoShares)
        );

        let rows = vec![row("Z", Some(1), Some(0.0)), row("Z", Some(2), Some(0.0))];
        let (metrics, failures) = constituency_metrics(&rows);
        assert_eq!(metrics[0].enp, None);
        assert_eq!(metrics[0].margin_percent, Some(0.0));
        assert_eq!(failures, vec![(Key::from("Z"), MetricError::DegenerateShares)]);
    }

    #[test]
    fn margin_ignores_unranked_rows_and_missing_shares() {
        let rows = vec![row("C", None, Some(90.0)), row("C", Some(1), Some(55.0))];
        let groups = group_by_constituency(&rows);
        let group = &groups[&Key::from("C")];
        assert_eq!(group[0].mp_app_rank, Some(1));
        assert_eq!(vote_margin(group), None);

        let rows = vec![row("D", Some(1), Some(55.0)), row("D", Some(2), None)];
        let groups = group_by_constituency(&rows);
        assert_eq!(vote_margin(&groups[&Key::from("D")]), None);
    }

    #[test]
    fn merge_leaves_constituencies_without_candidates_null() {
        let mut summary = vec![
            ConstituencySummary {
                cons_id: Some(Key::from("C1")),
                ..ConstituencySummary::default()
            },
            ConstituencySummary {
                cons_id: Some(Key::from("EMPTY")),
                ..ConstituencySummary::default()
            },
        ];
        let rows = vec![row("C1", Some(1), Some(60.0)), row("C1", Some(2), Some(40.0))];
        let (metrics, _) = constituency_metrics(&rows);

        merge_metrics(&mut summary, &metrics);

        assert_eq!(summary.len(), 2);
        assert!(close(summary[0].margin_percent.unwrap(), 20.0));
        assert!(summary[0].enp.is_some());
        assert_eq!(summary[1].margin_percent, None);
        assert_eq!(summary[1].enp, None);
    }

    #[test]
    fn mean_skips_missing_values() {
        assert_eq!(mean([Some(5.0), None, Some(3.0)]), Some(4.0));
        assert_eq!(mean([None, None]), None);
    }

    #[test]
    fn ranked_shares_render_in_rank_order() {
        let rows = vec![row("C", Some(2), Some(40.0)), row("C", Some(1), Some(60.0))];
        let groups = group_by_constituency(&rows);
        assert_eq!(ranked_shares(&groups[&Key::from("C")]), "#1 60.00%, #2 40.00%");
    }
}
