use crate::models::AnalysisMode;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cottonops",
    version,
    about = "Cotton crop stage, pest and disease risk from growing degree days"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a registered farmer's field using grid weather from the database
    Analyze {
        /// Farmer ID from the grid mapping table
        #[arg(long)]
        farmer_id: f64,

        /// Date to analyze (YYYY-MM-DD)
        #[arg(long)]
        question_date: NaiveDate,

        #[command(flatten)]
        options: AnalysisOptions,
    },
    /// Analyze a field from a local JSON weather file
    Field {
        /// Sowing date (YYYY-MM-DD)
        #[arg(long)]
        sowing_date: NaiveDate,

        /// Date to analyze (YYYY-MM-DD)
        #[arg(long)]
        question_date: NaiveDate,

        /// JSON array of daily weather records
        #[arg(long)]
        weather_file: PathBuf,

        /// Label for the report
        #[arg(long, default_value = "field")]
        location_id: String,

        #[command(flatten)]
        options: AnalysisOptions,
    },
    /// Crop stage and harvest outlook for every sowing date in a grid cell.
    /// With --sowing-date, the full report and farmer list for that cohort.
    Grid {
        #[arg(long)]
        grid_id: String,

        /// Date to analyze (YYYY-MM-DD)
        #[arg(long)]
        question_date: NaiveDate,

        /// Sowing date of one cohort in the grid (YYYY-MM-DD)
        #[arg(long)]
        sowing_date: Option<NaiveDate>,

        #[command(flatten)]
        options: AnalysisOptions,
    },
    /// Validate config, rule catalog and database connection
    Check,
}

#[derive(Args, Debug, Clone)]
pub struct AnalysisOptions {
    /// Only the historical insect summary
    #[arg(long, conflicts_with = "diseases_only")]
    pub insects_only: bool,

    /// Only the historical disease summary
    #[arg(long)]
    pub diseases_only: bool,

    /// Risk percentage at which a day counts as conducive (default from config)
    #[arg(long, value_parser = parse_threshold)]
    pub risk_threshold: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl AnalysisOptions {
    pub fn mode(&self) -> AnalysisMode {
        if self.insects_only {
            AnalysisMode::InsectsOnly
        } else if self.diseases_only {
            AnalysisMode::DiseasesOnly
        } else {
            AnalysisMode::Full
        }
    }
}

fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("risk threshold must be between 0 and 100, got {}", value))
    }
}
