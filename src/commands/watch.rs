use super::{build_pipeline, run_pipeline_cycle, summary};
use crate::settings::Settings;
use colored::*;
use std::time::Duration;

/// Re-run the cycle every `interval`, printing the summary each time.
///
/// The same pipeline is kept across cycles, so a remote source serves
/// documents from its cache until they expire. A failed cycle drops the
/// cache so the next one starts from a fresh snapshot.
pub async fn watch(
    settings: &Settings,
    interval: Duration,
    cycles: Option<u64>,
    show_timings: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = build_pipeline(settings)?;
    let mut completed = 0u64;

    println!(
        "👀 Refreshing every {}s",
        interval.as_secs().to_string().bright_cyan()
    );

    loop {
        match run_pipeline_cycle(&mut pipeline, show_timings).await {
            Ok(cycle) => summary(&cycle),
            Err(e) => {
                eprintln!("❌ Cycle failed: {}", e);
                pipeline.invalidate();
            }
        }

        completed += 1;
        if cycles.map_or(false, |limit| completed >= limit) {
            return Ok(());
        }
        tokio::time::sleep(interval).await;
    }
}
