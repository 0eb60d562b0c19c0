use super::format_optional;
use crate::pipeline::Cycle;
use crate::reports::generator::kpis;
use colored::*;

pub fn summary(cycle: &Cycle) {
    let tables = &cycle.tables;
    let kpis = kpis(&tables.constituency_summary);

    println!("\n{}", "📊 Snapshot Summary".bright_cyan().bold());
    println!("{}", "=".repeat(50).bright_cyan());
    println!(
        "Loaded at:        {}",
        tables.loaded_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().bright_white()
    );
    println!(
        "Constituencies:   {}",
        kpis.total_districts.to_string().bright_yellow()
    );
    println!(
        "Total turnout:    {}",
        kpis.total_voters.to_string().bright_yellow()
    );
    println!(
        "Average margin:   {} pp",
        format_optional(kpis.average_margin, 2).bright_yellow()
    );
    println!(
        "Average ENP:      {}",
        format_optional(kpis.average_enp, 2).bright_yellow()
    );
    println!(
        "Party-list rows:  {} ({} PM candidates)",
        tables.party_list_candidates.len().to_string().bright_yellow(),
        tables
            .party_list_candidates
            .iter()
            .filter(|c| c.is_pm_candidate)
            .count()
            .to_string()
            .bright_yellow()
    );

    if tables.diagnostics.is_empty() {
        println!("\n{}", "✅ No diagnostics".green());
    } else {
        println!(
            "\n⚠️  {} diagnostics:",
            tables.diagnostics.len().to_string().yellow()
        );
        for diagnostic in &tables.diagnostics {
            println!("  - {}", diagnostic.to_string().yellow());
        }
    }
}
