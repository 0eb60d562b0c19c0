use crate::pipeline::Cycle;
use crate::reports::DashboardReport;
use crate::util::{write_serialized, WriteError};
use colored::*;
use std::path::Path;

/// Write every table and the report as pretty JSON under `out_dir`.
pub fn export(cycle: &Cycle, report: &DashboardReport, out_dir: &Path) -> Result<(), WriteError> {
    println!(
        "💾 Exporting tables to {}",
        out_dir.display().to_string().bright_cyan()
    );

    let tables = &cycle.tables;
    write_serialized(&out_dir.join("provinces.json"), &tables.provinces)?;
    write_serialized(&out_dir.join("constituencies.json"), &tables.constituencies)?;
    write_serialized(&out_dir.join("parties.json"), &tables.parties)?;
    write_serialized(&out_dir.join("mp_candidates.json"), &tables.mp_candidates)?;
    write_serialized(
        &out_dir.join("party_list_candidates.json"),
        &tables.party_list_candidates,
    )?;
    write_serialized(
        &out_dir.join("constituency_summary.json"),
        &tables.constituency_summary,
    )?;
    write_serialized(&out_dir.join("candidate_votes.json"), &tables.candidate_votes)?;
    write_serialized(&out_dir.join("stats_party.json"), &tables.stats_party)?;
    write_serialized(&out_dir.join("diagnostics.json"), &tables.diagnostics)?;
    write_serialized(&out_dir.join("timings.json"), &cycle.timings)?;
    write_serialized(&out_dir.join("report.json"), report)?;

    println!("✅ Export complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{analyze, PipelineSettings};
    use crate::pipeline::timing::StageTimer;
    use crate::reports::generate_report;
    use crate::source::{fixtures, Document, RawSnapshot};
    use std::fs;

    fn cycle() -> Cycle {
        let doc = |d: Document| fixtures::document(d);
        let snapshot = RawSnapshot {
            provinces: serde_json::from_value(doc(Document::InfoProvince)).unwrap(),
            constituencies: serde_json::from_value(doc(Document::InfoConstituency)).unwrap(),
            parties: serde_json::from_value(doc(Document::InfoParty)).unwrap(),
            mp_candidates: serde_json::from_value(doc(Document::InfoMpCandidate)).unwrap(),
            party_candidates: serde_json::from_value(doc(Document::InfoPartyCandidate)).unwrap(),
            stats_cons: serde_json::from_value(doc(Document::StatsCons)).unwrap(),
            stats_party: doc(Document::StatsParty),
            loaded_at: chrono::Utc::now(),
        };
        let mut timer = StageTimer::new();
        let tables = analyze(snapshot, &PipelineSettings::default(), &mut timer);
        Cycle {
            tables,
            timings: timer.into_timings(),
        }
    }

    #[test]
    fn exports_tables_and_report() {
        let cycle = cycle();
        let report = generate_report(&cycle.tables);
        let dir = tempfile::tempdir().unwrap();

        export(&cycle, &report, dir.path()).unwrap();

        let summary: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("constituency_summary.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(summary.as_array().unwrap().len(), 3);
        assert!(summary[0].get("ENP").is_some());

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(report["kpis"]["total_districts"], 3);
        assert_eq!(report["kpis"]["total_voters"], 2300);
        assert_eq!(report["narrow_losses"][0]["party_name"], "Party Two");
    }
}
