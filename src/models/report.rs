use super::phenology::{Phenophase, PhenophaseState, SowingWindow};
use super::risk::{PbwForecast, RiskAlert, RiskKind, WeatherParameter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default percentage at which a day counts toward the historical summaries.
pub const DEFAULT_RISK_THRESHOLD: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    Full,
    InsectsOnly,
    DiseasesOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub location_id: String,
    pub sowing_date: NaiveDate,
    pub question_date: NaiveDate,
    pub risk_threshold: f64,
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    pub fn new(location_id: impl Into<String>, sowing_date: NaiveDate, question_date: NaiveDate) -> Self {
        Self {
            location_id: location_id.into(),
            sowing_date,
            question_date,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            mode: AnalysisMode::Full,
        }
    }

    pub fn with_threshold(mut self, risk_threshold: f64) -> Self {
        self.risk_threshold = risk_threshold;
        self
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Aggregate for one insect or disease across a historical scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSummaryEntry {
    pub name: String,
    pub first_conducive_date: NaiveDate,
    pub conducive_days: u32,
    pub max_risk_percentage: f64,
    pub max_risk_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "entries", rename_all = "snake_case")]
pub enum RiskFindings {
    NoneDetected,
    Detected(Vec<HistoricalSummaryEntry>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSummary {
    pub kind: RiskKind,
    pub risk_threshold: f64,
    pub findings: RiskFindings,
}

impl HistoricalSummary {
    pub fn entries(&self) -> &[HistoricalSummaryEntry] {
        match &self.findings {
            RiskFindings::NoneDetected => &[],
            RiskFindings::Detected(entries) => entries,
        }
    }

    pub fn none_detected(&self) -> bool {
        matches!(self.findings, RiskFindings::NoneDetected)
    }

    pub fn entry(&self, name: &str) -> Option<&HistoricalSummaryEntry> {
        self.entries().iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhenophaseDate {
    pub phenophase: Phenophase,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HarvestForecast {
    /// Cumulative GDD already meets the harvest-ready threshold.
    Ready,
    /// Projection under a constant assumed daily mean temperature.
    Window {
        earliest: NaiveDate,
        latest: NaiveDate,
        assumed_avg_temp_c: f64,
        daily_gdd: f64,
    },
}

/// Soft problems that degraded part of a report without stopping it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisNotice {
    /// No weather rows between sowing and the question date.
    InsufficientWeatherData { start: NaiveDate, end: NaiveDate },
    /// The question date itself has no usable weather row.
    MissingQuestionDay { date: NaiveDate },
    /// A rule references a parameter the weather feed never supplied.
    ConfigurationGap {
        rule: String,
        parameter: WeatherParameter,
    },
}

impl std::fmt::Display for AnalysisNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisNotice::InsufficientWeatherData { start, end } => {
                write!(f, "No weather data between {} and {}", start, end)
            }
            AnalysisNotice::MissingQuestionDay { date } => {
                write!(f, "No weather data for {}", date)
            }
            AnalysisNotice::ConfigurationGap { rule, parameter } => write!(
                f,
                "{}: '{}' is not supplied by the weather feed and was not scored",
                rule, parameter
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub location_id: String,
    pub sowing_date: NaiveDate,
    pub question_date: NaiveDate,
    pub sowing_window: SowingWindow,
    pub risk_threshold: f64,
    pub phenophase: PhenophaseState,
    pub cumulative_gdd: f64,
    pub total_rainfall_mm: f64,
    /// Rain from the first of the question month through the question date.
    pub month_rainfall_mm: f64,
    pub average_temp_c: Option<f64>,
    pub pbw: PbwForecast,
    pub insect_alerts: Vec<RiskAlert>,
    pub disease_alerts: Vec<RiskAlert>,
    pub insect_history: HistoricalSummary,
    pub disease_history: HistoricalSummary,
    pub phenophase_dates: Vec<PhenophaseDate>,
    pub projected_phenophases: Vec<PhenophaseDate>,
    pub harvest: HarvestForecast,
    pub notices: Vec<AnalysisNotice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Full(Box<AnalysisReport>),
    InsectsOnly(HistoricalSummary),
    DiseasesOnly(HistoricalSummary),
}

/// One sowing-date cohort of a grid summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCohortStatus {
    pub sowing_date: NaiveDate,
    pub farmer_count: u32,
    /// `None` when the sowing date falls outside every sowing window.
    pub phenophase: Option<PhenophaseState>,
    pub harvest: Option<HarvestForecast>,
}
