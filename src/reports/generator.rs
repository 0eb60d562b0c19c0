use super::{
    DashboardReport, FragmentationPoint, Kpis, PartyNarrowLosses, ProvinceMargin,
    NARROW_LOSS_THRESHOLD_PP, SHARE_GAP_EPSILON,
};
use crate::model::{CandidateVote, ConstituencySummary, Key};
use crate::pipeline::metrics::{group_by_constituency, mean};
use crate::pipeline::AnalysisTables;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Build the full report for one cycle's tables
pub fn generate_report(tables: &AnalysisTables) -> DashboardReport {
    tracing::debug!(
        constituencies = tables.constituency_summary.len(),
        candidates = tables.candidate_votes.len(),
        "generating report"
    );

    DashboardReport {
        kpis: kpis(&tables.constituency_summary),
        province_margins: province_margins(&tables.constituency_summary),
        narrow_losses: narrow_losses(&tables.candidate_votes),
        fragmentation: fragmentation_points(&tables.constituency_summary),
    }
}

/// Mean margin per province, ascending, provinces without any margin last.
///
/// Rows whose province name did not join are left out.
pub fn province_margins(summary: &[ConstituencySummary]) -> Vec<ProvinceMargin> {
    let mut groups: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
    for row in summary {
        if let Some(province) = row.province.as_deref() {
            groups.entry(province).or_default().push(row.margin_percent);
        }
    }

    let mut margins: Vec<ProvinceMargin> = groups
        .into_iter()
        .map(|(province, values)| ProvinceMargin {
            province: province.to_string(),
            constituencies: values.len(),
            avg_margin: mean(values),
        })
        .collect();

    margins.sort_by(|a, b| match (a.avg_margin, b.avg_margin) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    margins
}

/// Count, per party, the rank-2 finishes within the threshold of rank 1.
///
/// Sorted by count descending, then by party name.
pub fn narrow_losses(votes: &[CandidateVote]) -> Vec<PartyNarrowLosses> {
    let mut counts: HashMap<Option<&Key>, (Option<&str>, usize)> = HashMap::new();

    for group in group_by_constituency(votes).values() {
        let winner = group.iter().find(|row| row.mp_app_rank == Some(1));
        let winner_share = match winner.and_then(|row| row.mp_app_vote_percent) {
            Some(share) => share,
            None => continue,
        };

        for runner_up in group.iter().filter(|row| row.mp_app_rank == Some(2)) {
            let share = match runner_up.mp_app_vote_percent {
                Some(share) => share,
                None => continue,
            };
            if winner_share - share <= NARROW_LOSS_THRESHOLD_PP + SHARE_GAP_EPSILON {
                let entry = counts
                    .entry(runner_up.party_id.as_ref())
                    .or_insert((runner_up.party_name.as_deref(), 0));
                entry.1 += 1;
            }
        }
    }

    let mut losses: Vec<PartyNarrowLosses> = counts
        .into_iter()
        .map(|(party_id, (party_name, narrow_losses))| PartyNarrowLosses {
            party_id: party_id.cloned(),
            party_name: party_name.map(str::to_string),
            narrow_losses,
        })
        .collect();

    losses.sort_by(|a, b| {
        b.narrow_losses
            .cmp(&a.narrow_losses)
            .then_with(|| a.party_name.cmp(&b.party_name))
            .then_with(|| a.party_id.cmp(&b.party_id))
    });
    losses
}

pub fn kpis(summary: &[ConstituencySummary]) -> Kpis {
    let districts: HashSet<&Key> = summary.iter().filter_map(|row| row.cons_id.as_ref()).collect();

    Kpis {
        total_districts: districts.len(),
        total_voters: summary.iter().filter_map(|row| row.turn_out).sum(),
        average_margin: mean(summary.iter().map(|row| row.margin_percent)),
        average_enp: mean(summary.iter().map(|row| row.enp)),
    }
}

/// Summary rows that have both an ENP and a margin
pub fn fragmentation_points(summary: &[ConstituencySummary]) -> Vec<FragmentationPoint> {
    summary
        .iter()
        .filter_map(|row| match (row.enp, row.margin_percent) {
            (Some(enp), Some(margin_percent)) => Some(FragmentationPoint {
                cons_id: row.cons_id.clone(),
                province: row.province.clone(),
                zone: row.zone,
                enp,
                margin_percent,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(cons: &str, province: Option<&str>, margin: Option<f64>) -> ConstituencySummary {
        ConstituencySummary {
            cons_id: Some(Key::from(cons)),
            province: province.map(str::to_string),
            margin_percent: margin,
            ..ConstituencySummary::default()
        }
    }

    fn vote(cons: &str, rank: u64, share: f64, party: &str) -> CandidateVote {
        CandidateVote {
            cons_id: Some(Key::from(cons)),
            mp_app_rank: Some(rank),
            mp_app_vote_percent: Some(share),
            party_id: Some(Key::from(party)),
            party_name: Some(format!("Party {}", party)),
            ..CandidateVote::default()
        }
    }

    #[test]
    fn province_average_of_margins() {
        let rows = vec![
            summary("P1_1", Some("P1"), Some(5.0)),
            summary("P1_2", Some("P1"), Some(3.0)),
            summary("P2_1", Some("P2"), Some(10.0)),
        ];
        let margins = province_margins(&rows);
        assert_eq!(
            margins,
            vec![
                ProvinceMargin {
                    province: "P1".into(),
                    avg_margin: Some(4.0),
                    constituencies: 2
                },
                ProvinceMargin {
                    province: "P2".into(),
                    avg_margin: Some(10.0),
                    constituencies: 1
                },
            ]
        );
    }

    #[test]
    fn provinces_without_margins_sort_last_and_unnamed_rows_are_skipped() {
        let rows = vec![
            summary("A_1", Some("A"), None),
            summary("B_1", Some("B"), Some(12.0)),
            summary("B_2", Some("B"), None),
            summary("C_1", Some("C"), Some(2.0)),
            summary("X_1", None, Some(0.5)),
        ];
        let names: Vec<_> = province_margins(&rows)
            .into_iter()
            .map(|m| (m.province, m.avg_margin))
            .collect();
        assert_eq!(
            names,
            vec![
                ("C".to_string(), Some(2.0)),
                ("B".to_string(), Some(12.0)),
                ("A".to_string(), None)
            ]
        );
    }

    #[test]
    fn narrow_losses_count_runner_ups_within_threshold() {
        let votes = vec![
            // 0.4pp: narrow
            vote("C1", 1, 50.2, "1"),
            vote("C1", 2, 49.8, "2"),
            // exactly at the threshold: narrow
            vote("C2", 2, 40.0, "2"),
            vote("C2", 1, 41.0, "3"),
            // exactly 1.00pp, but the f64 difference lands just above 1.0
            vote("C6", 1, 64.98, "1"),
            vote("C6", 2, 63.98, "2"),
            // 5pp: not narrow
            vote("C3", 1, 45.0, "2"),
            vote("C3", 2, 40.0, "1"),
            // rank-3 close to rank-2 never counts
            vote("C4", 1, 60.0, "1"),
            vote("C4", 2, 20.0, "3"),
            vote("C4", 3, 19.9, "2"),
            // 0.9pp: narrow
            vote("C5", 1, 30.0, "2"),
            vote("C5", 2, 29.1, "3"),
        ];

        let losses = narrow_losses(&votes);
        let counts: Vec<_> = losses
            .iter()
            .map(|l| (l.party_id.clone().unwrap(), l.narrow_losses))
            .collect();
        assert_eq!(counts, vec![(Key::from("2"), 3), (Key::from("3"), 1)]);
        assert_eq!(losses[0].party_name.as_deref(), Some("Party 2"));
    }

    #[test]
    fn whole_point_gap_between_two_decimal_shares_is_narrow() {
        for (winner, runner_up) in [(64.98, 63.98), (41.0, 40.0), (2.01, 1.01)] {
            let votes = vec![vote("C", 1, winner, "1"), vote("C", 2, runner_up, "2")];
            let losses = narrow_losses(&votes);
            assert_eq!(losses.len(), 1, "{} vs {}", winner, runner_up);
            assert_eq!(losses[0].narrow_losses, 1);
        }
        let votes = vec![vote("C", 1, 64.99, "1"), vote("C", 2, 63.98, "2")];
        assert!(narrow_losses(&votes).is_empty());
    }

    #[test]
    fn narrow_losses_need_both_shares() {
        let mut votes = vec![vote("C1", 1, 50.0, "1"), vote("C1", 2, 49.5, "2")];
        votes[0].mp_app_vote_percent = None;
        assert!(narrow_losses(&votes).is_empty());
    }

    #[test]
    fn kpis_ignore_nulls() {
        let mut rows = vec![
            summary("C1", Some("P"), Some(4.0)),
            summary("C2", Some("P"), None),
            summary("C2", Some("P"), Some(8.0)),
        ];
        rows[0].turn_out = Some(100);
        rows[1].turn_out = Some(50);
        rows[0].enp = Some(2.0);

        let kpis = kpis(&rows);
        assert_eq!(kpis.total_districts, 2);
        assert_eq!(kpis.total_voters, 150);
        assert_eq!(kpis.average_margin, Some(6.0));
        assert_eq!(kpis.average_enp, Some(2.0));
    }

    #[test]
    fn fragmentation_needs_enp_and_margin() {
        let mut rows = vec![
            summary("C1", Some("P"), Some(4.0)),
            summary("C2", Some("P"), None),
            summary("C3", Some("P"), Some(1.0)),
        ];
        rows[0].enp = Some(2.5);
        rows[1].enp = Some(1.0);

        let points = fragmentation_points(&rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].cons_id, Some(Key::from("C1")));
        assert_eq!(points[0].enp, 2.5);
    }
}
