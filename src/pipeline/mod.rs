//! One ingestion cycle: load → flatten → join → metrics.
//!
//! Loading is the only fallible stage. Everything after it degrades instead
//! of failing: a join that cannot run, or a metric that is undefined, leaves
//! its column null and records a [`Diagnostic`].

pub mod flatten;
pub mod join;
pub mod metrics;
pub mod timing;

use crate::model::{
    CandidateVote, Constituency, ConstituencySummary, Key, Party, PartyListCandidate, Province,
    RecordTable,
};
use crate::normalizers::NameNormalizer;
use crate::source::{self, RawSnapshot, Source, SourceError};
use chrono::{DateTime, Utc};
use join::{NameColumn, SchemaMismatch};
use metrics::MetricError;
use serde::Serialize;
use std::fmt;
use timing::{PipelineStage, StageTimer, StageTiming};

pub const DEFAULT_CANDIDATE_NAME_COLUMN: &str = "mp_app_name";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Column of the MP candidate table that holds display names.
    pub candidate_name_column: String,
    pub normalizer: NameNormalizer,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            candidate_name_column: DEFAULT_CANDIDATE_NAME_COLUMN.to_string(),
            normalizer: NameNormalizer::default(),
        }
    }
}

/// Non-fatal finding of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A join was skipped because its input lacked a usable column.
    SchemaMismatch(SchemaMismatch),
    /// The candidate name column was recovered from a differently named one.
    NameColumnFallback { from: String, to: String },
    /// ENP could not be computed for a constituency.
    UndefinedEnp { cons_id: Key, reason: MetricError },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SchemaMismatch(e) => write!(f, "schema mismatch in {}", e),
            Diagnostic::NameColumnFallback { from, to } => {
                write!(f, "candidate names read from `{}` (renamed to `{}`)", from, to)
            }
            Diagnostic::UndefinedEnp { cons_id, reason } => {
                write!(f, "ENP undefined for {}: {}", cons_id, reason)
            }
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Every table produced by one cycle. Read-only once built; the next cycle
/// builds a fresh value.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisTables {
    pub provinces: Vec<Province>,
    pub constituencies: Vec<Constituency>,
    pub parties: Vec<Party>,
    pub mp_candidates: RecordTable,
    pub party_list_candidates: Vec<PartyListCandidate>,
    pub constituency_summary: Vec<ConstituencySummary>,
    pub candidate_votes: Vec<CandidateVote>,
    pub stats_party: serde_json::Value,
    pub diagnostics: Vec<Diagnostic>,
    pub loaded_at: DateTime<Utc>,
}

/// Transform a loaded snapshot into analysis tables.
pub fn analyze(
    snapshot: RawSnapshot,
    settings: &PipelineSettings,
    timer: &mut StageTimer,
) -> AnalysisTables {
    let mut diagnostics = Vec::new();
    let RawSnapshot {
        provinces,
        constituencies,
        parties,
        mut mp_candidates,
        party_candidates,
        stats_cons,
        stats_party,
        loaded_at,
    } = snapshot;
    let provinces = provinces.province;
    if mp_candidates.is_empty() {
        tracing::warn!("info_mp_candidate has no rows; candidate names will be empty");
    }
    tracing::debug!(
        mp_candidates = mp_candidates.len(),
        prefixes = ?settings.normalizer.prefixes(),
        "analyzing snapshot"
    );

    timer.start_stage(PipelineStage::Flatten);
    let mut summary = flatten::summary_rows(&stats_cons);
    let mut votes = flatten::candidate_rows(&stats_cons);
    let party_list = flatten::party_list_rows(&party_candidates, &settings.normalizer);
    timer.end_stage(
        PipelineStage::Flatten,
        Some((summary.len() + votes.len() + party_list.len()) as u64),
    );

    timer.start_stage(PipelineStage::Join);
    match join::join_candidate_names(
        &mut votes,
        &mut mp_candidates,
        &settings.candidate_name_column,
    ) {
        Ok(NameColumn::Canonical(_)) => {}
        Ok(NameColumn::Renamed { from, to }) => {
            tracing::info!(%from, %to, "using fallback candidate name column");
            diagnostics.push(Diagnostic::NameColumnFallback { from, to });
        }
        Err(mismatch) => {
            tracing::warn!(%mismatch, "skipping candidate name join");
            diagnostics.push(Diagnostic::SchemaMismatch(mismatch));
        }
    }
    join::join_party_names(&mut votes, &parties);
    join::join_constituency_attributes(&mut summary, &constituencies);
    join::join_province_names(&mut summary, &provinces);
    timer.end_stage(PipelineStage::Join, Some((votes.len() + summary.len()) as u64));

    timer.start_stage(PipelineStage::Metrics);
    let (per_constituency, failures) = metrics::constituency_metrics(&votes);
    for (cons_id, reason) in failures {
        tracing::warn!(%cons_id, %reason, "ENP undefined");
        diagnostics.push(Diagnostic::UndefinedEnp { cons_id, reason });
    }
    metrics::merge_metrics(&mut summary, &per_constituency);
    timer.end_stage(PipelineStage::Metrics, Some(per_constituency.len() as u64));

    if tracing::enabled!(tracing::Level::TRACE) {
        for (cons_id, group) in metrics::group_by_constituency(&votes) {
            tracing::trace!(%cons_id, shares = %metrics::ranked_shares(&group), "ranked shares");
        }
    }

    AnalysisTables {
        provinces,
        constituencies,
        parties,
        mp_candidates,
        party_list_candidates: party_list,
        constituency_summary: summary,
        candidate_votes: votes,
        stats_party,
        diagnostics,
        loaded_at,
    }
}

/// Output of [`Pipeline::run_cycle`].
#[derive(Debug)]
pub struct Cycle {
    pub tables: AnalysisTables,
    pub timings: Vec<StageTiming>,
}

/// A source plus settings. Keep one alive to reuse the remote fetch cache
/// across cycles.
pub struct Pipeline {
    source: Source,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(source: Source, settings: PipelineSettings) -> Self {
        Self { source, settings }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Make the next cycle refetch every document.
    pub fn invalidate(&mut self) {
        self.source.invalidate();
    }

    pub async fn run_cycle(&mut self) -> Result<Cycle, SourceError> {
        let mut timer = StageTimer::new();
        timer.start_stage(PipelineStage::Complete);

        timer.start_stage(PipelineStage::Load);
        let snapshot = source::load_snapshot(&mut self.source).await?;
        timer.end_stage(PipelineStage::Load, None);

        let tables = analyze(snapshot, &self.settings, &mut timer);
        timer.end_stage(
            PipelineStage::Complete,
            Some(tables.constituency_summary.len() as u64),
        );

        Ok(Cycle {
            tables,
            timings: timer.into_timings(),
        })
    }
}
