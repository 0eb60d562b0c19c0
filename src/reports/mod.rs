use crate::model::Key;
use serde::Serialize;

pub mod generator;

pub use generator::generate_report;

/// A runner-up within this many percentage points of the winner counts as a
/// narrow loss for the runner-up's party.
pub const NARROW_LOSS_THRESHOLD_PP: f64 = 1.0;

/// Slack on the threshold comparison so a gap of exactly 1.00 pp between
/// two-decimal shares still counts after float subtraction.
pub const SHARE_GAP_EPSILON: f64 = 1e-9;

/// Mean winning margin across a province's constituencies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceMargin {
    pub province: String,
    pub avg_margin: Option<f64>,
    /// Summary rows grouped under this province, with or without a margin.
    pub constituencies: usize,
}

/// Number of seats a party lost by less than the narrow-loss threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartyNarrowLosses {
    pub party_id: Option<Key>,
    pub party_name: Option<String>,
    pub narrow_losses: usize,
}

/// Headline figures for the whole snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_districts: usize,
    pub total_voters: u64,
    pub average_margin: Option<f64>,
    #[serde(rename = "average_ENP")]
    pub average_enp: Option<f64>,
}

/// One constituency on the ENP/margin scatter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentationPoint {
    pub cons_id: Option<Key>,
    pub province: Option<String>,
    pub zone: Option<u64>,
    #[serde(rename = "ENP")]
    pub enp: f64,
    pub margin_percent: f64,
}

/// Every aggregate derived from one cycle's tables
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub kpis: Kpis,
    pub province_margins: Vec<ProvinceMargin>,
    pub narrow_losses: Vec<PartyNarrowLosses>,
    pub fragmentation: Vec<FragmentationPoint>,
}
