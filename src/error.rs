use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CottonOpsError {
    #[error("External database error: {0}")]
    ExternalDatabase(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub type Result<T> = std::result::Result<T, CottonOpsError>;

/// Logical failures of a single analysis. These are reportable outcomes,
/// not crashes: every variant renders a message a dashboard can show as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Sowing date {0} is outside valid sowing windows (May 20 - July 15)")]
    InvalidSowingDate(NaiveDate),

    #[error("No phenophase found for GDD {cumulative_gdd:.1} on {question_date}")]
    UnresolvablePhenophase {
        cumulative_gdd: f64,
        question_date: NaiveDate,
    },
}
