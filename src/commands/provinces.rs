use super::format_optional;
use crate::reports::DashboardReport;
use colored::*;

pub fn provinces(report: &DashboardReport) {
    println!("\n{}", "🗺  Average Margin by Province".bright_cyan().bold());
    println!("{}", "=".repeat(50).bright_cyan());

    if report.province_margins.is_empty() {
        println!("{}", "No province names joined onto the summary".yellow());
        return;
    }

    for margin in &report.province_margins {
        println!(
            "{:<30} {:>8} pp  ({} constituencies)",
            margin.province,
            format_optional(margin.avg_margin, 2).bright_yellow(),
            margin.constituencies
        );
    }
}
