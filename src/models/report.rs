use serde::{Deserialize, Serialize};

use crate::models::assessment::DomainScores;
use crate::models::template::CognitiveDomain;

/// Relative period selector for dashboard scoping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "12m")]
    TwelveMonths,
    #[serde(rename = "all")]
    All,
}

impl PeriodKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKey::OneMonth => "1m",
            PeriodKey::ThreeMonths => "3m",
            PeriodKey::SixMonths => "6m",
            PeriodKey::TwelveMonths => "12m",
            PeriodKey::All => "all",
        }
    }

    /// Number of calendar months the window spans; `None` means unbounded.
    pub fn months(&self) -> Option<u32> {
        match self {
            PeriodKey::OneMonth => Some(1),
            PeriodKey::ThreeMonths => Some(3),
            PeriodKey::SixMonths => Some(6),
            PeriodKey::TwelveMonths => Some(12),
            PeriodKey::All => None,
        }
    }
}

impl Default for PeriodKey {
    fn default() -> Self {
        PeriodKey::All
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrendClassification {
    Melhora,
    Queda,
    Estavel,
}

impl TrendClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendClassification::Melhora => "melhora",
            TrendClassification::Queda => "queda",
            TrendClassification::Estavel => "estavel",
        }
    }
}

/// Summary card for one metric: the total or a single cognitive domain.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub metric: String,
    pub label: String,
    pub current_value: f64,
    pub baseline_value: f64,
    pub delta: f64,
    pub classification: TrendClassification,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionPoint {
    pub period_label: String,
    pub total_score: f64,
    #[serde(flatten)]
    pub scores: DomainScores,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RadarEntry {
    pub domain: CognitiveDomain,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassStatistics {
    pub mean: f64,
    pub median: f64,
    pub completed_count: usize,
    pub missing_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboard {
    pub student_id: String,
    pub period: PeriodKey,
    pub evolution: Vec<EvolutionPoint>,
    pub radar: Vec<RadarEntry>,
    pub trends: Vec<TrendPoint>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassDashboard {
    pub turma_id: String,
    pub month_ref: u32,
    pub year_ref: i32,
    pub statistics: ClassStatistics,
    pub domain_means: Vec<RadarEntry>,
    pub generated_at: String,
}

/// Tunable analytics parameters. The thresholds are inferred business rules,
/// kept configurable instead of hard-wired.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    pub trend_threshold: f64,
    pub baseline_window: usize,
    pub domain_max_score: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            trend_threshold: 0.5,
            baseline_window: 6,
            domain_max_score: 10.0,
        }
    }
}
