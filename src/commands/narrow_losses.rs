use crate::reports::{DashboardReport, NARROW_LOSS_THRESHOLD_PP};
use colored::*;

pub fn narrow_losses(report: &DashboardReport) {
    println!(
        "\n{}",
        format!(
            "🎯 Seats Lost by ≤ {:.1} pp",
            NARROW_LOSS_THRESHOLD_PP
        )
        .bright_cyan()
        .bold()
    );
    println!("{}", "=".repeat(50).bright_cyan());

    if report.narrow_losses.is_empty() {
        println!("{}", "No narrow losses".green());
        return;
    }

    for party in &report.narrow_losses {
        let label = match (&party.party_name, &party.party_id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("party {}", id),
            (None, None) => "unknown party".to_string(),
        };
        println!(
            "{:<40} {}",
            label,
            party.narrow_losses.to_string().bright_yellow()
        );
    }
}
