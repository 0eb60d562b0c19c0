//! Wall-clock timing of pipeline stages.
use colored::*;
use instant::Instant;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Load,
    Flatten,
    Join,
    Metrics,
    Complete,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineStage::Load => write!(f, "load"),
            PipelineStage::Flatten => write!(f, "flatten"),
            PipelineStage::Join => write!(f, "join"),
            PipelineStage::Metrics => write!(f, "metrics"),
            PipelineStage::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub duration_ms: u64,
    pub rows_processed: Option<u64>,
}

#[derive(Debug, Default)]
pub struct StageTimer {
    started: HashMap<PipelineStage, Instant>,
    finished: Vec<StageTiming>,
}

impl StageTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_stage(&mut self, stage: PipelineStage) {
        self.started.insert(stage, Instant::now());
    }

    /// Stop the stage clock and record it. A stage that was never started
    /// records zero.
    pub fn end_stage(&mut self, stage: PipelineStage, rows_processed: Option<u64>) -> &StageTiming {
        let duration_ms = self
            .started
            .remove(&stage)
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0);

        tracing::debug!(%stage, duration_ms, rows = ?rows_processed, "stage finished");

        self.finished.push(StageTiming {
            stage,
            duration_ms,
            rows_processed,
        });
        &self.finished[self.finished.len() - 1]
    }

    pub fn into_timings(self) -> Vec<StageTiming> {
        self.finished
    }
}

pub fn print_timings(timings: &[StageTiming]) {
    println!("\n{}", "⏱  Pipeline Timing".bright_cyan().bold());
    println!("{}", "=".repeat(50).bright_cyan());

    for timing in timings {
        let stage_color = match timing.stage {
            PipelineStage::Load => "yellow",
            PipelineStage::Flatten => "blue",
            PipelineStage::Join => "magenta",
            PipelineStage::Metrics => "green",
            PipelineStage::Complete => "bright_green",
        };

        println!(
            "{}: {} ms{}",
            timing.stage.to_string().color(stage_color),
            timing.duration_ms.to_string().bright_white(),
            match timing.rows_processed {
                Some(rows) => format!(" ({} rows)", rows.to_string().bright_yellow()),
                None => String::new(),
            }
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_stages_in_completion_order() {
        let mut timer = StageTimer::new();
        timer.start_stage(PipelineStage::Load);
        timer.start_stage(PipelineStage::Flatten);
        timer.end_stage(PipelineStage::Flatten, Some(3));
        timer.end_stage(PipelineStage::Load, None);

        let timings = timer.into_timings();
        let stages: Vec<_> = timings.iter().map(|t| t.stage).collect();
        assert_eq!(stages, vec![PipelineStage::Flatten, PipelineStage::Load]);
        assert_eq!(timings[0].rows_processed, Some(3));
    }

    #[test]
    fn unstarted_stage_records_zero() {
        let mut timer = StageTimer::new();
        let timing = timer.end_stage(PipelineStage::Metrics, None);
        assert_eq!(timing.duration_ms, 0);
    }
}
