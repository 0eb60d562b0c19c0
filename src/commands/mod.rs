mod export;
mod narrow_losses;
mod provinces;
mod summary;
mod watch;

pub use export::export;
pub use narrow_losses::narrow_losses;
pub use provinces::provinces;
pub use summary::summary;
pub use watch::watch;

use crate::pipeline::timing::print_timings;
use crate::pipeline::{Cycle, Pipeline};
use crate::settings::Settings;
use crate::source::SourceError;
use colored::*;

fn build_pipeline(settings: &Settings) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let source = settings.build_source()?;
    Ok(Pipeline::new(source, settings.pipeline_settings()))
}

/// Run one ingestion cycle with the given settings.
pub async fn run_cycle(
    settings: &Settings,
    show_timings: bool,
) -> Result<Cycle, Box<dyn std::error::Error>> {
    let mut pipeline = build_pipeline(settings)?;
    Ok(run_pipeline_cycle(&mut pipeline, show_timings).await?)
}

async fn run_pipeline_cycle(
    pipeline: &mut Pipeline,
    show_timings: bool,
) -> Result<Cycle, SourceError> {
    println!(
        "🚀 Loading snapshot from {}",
        pipeline.source().describe().bright_cyan()
    );

    let cycle = pipeline.run_cycle().await?;

    println!(
        "✅ Loaded {} constituencies, {} candidate results",
        cycle.tables.constituency_summary.len().to_string().bright_green(),
        cycle.tables.candidate_votes.len().to_string().bright_green()
    );

    if show_timings {
        print_timings(&cycle.timings);
    }

    Ok(cycle)
}

fn format_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}
