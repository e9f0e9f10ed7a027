use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use cottonops::cli::{AnalysisOptions, Cli, Commands};
use cottonops::config::Config;
use cottonops::datasources::{load_weather_file, GridWeatherClient};
use cottonops::logic::{analyze, summarize_grid, RiskCatalog, RiskEngine, ThresholdCatalog};
use cottonops::models::{AnalysisOutcome, AnalysisRequest, FieldProfile, WeatherSeries};
use cottonops::{render, AnalysisError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.clone()).context("Configuration error")?;
    let thresholds = ThresholdCatalog::cotton();
    let engine = RiskEngine::new(load_catalog(&config)?);

    match cli.command {
        Commands::Analyze {
            farmer_id,
            question_date,
            options,
        } => {
            let client = GridWeatherClient::connect(&config.database)
                .await
                .context("Failed to connect to grid weather database")?;
            let field = client.fetch_farmer(farmer_id).await?;
            let series = client
                .fetch_weather(&field.grid_id, month_start(field.sowing_date), question_date)
                .await?;
            let request = build_request(&field.grid_id, field.sowing_date, question_date, &options, &config);
            run_analysis(&request, &series, &thresholds, &engine, &options, Some(&field))
        }
        Commands::Field {
            sowing_date,
            question_date,
            weather_file,
            location_id,
            options,
        } => {
            let series = load_weather_file(&weather_file)?;
            let request = build_request(&location_id, sowing_date, question_date, &options, &config);
            run_analysis(&request, &series, &thresholds, &engine, &options, None)
        }
        Commands::Grid {
            grid_id,
            question_date,
            sowing_date,
            options,
        } => {
            let client = GridWeatherClient::connect(&config.database)
                .await
                .context("Failed to connect to grid weather database")?;
            let cohorts = client.fetch_grid_cohorts(&grid_id).await?;

            if let Some(sowing_date) = sowing_date {
                if !cohorts.iter().any(|c| c.sowing_date == sowing_date) {
                    anyhow::bail!("No farmers in grid {} sowed on {}", grid_id, sowing_date);
                }
                let farmers = client.fetch_cohort_farmers(&grid_id, sowing_date).await?;
                let series = client
                    .fetch_weather(&grid_id, month_start(sowing_date), question_date)
                    .await?;
                let request = build_request(&grid_id, sowing_date, question_date, &options, &config);
                let outcome = analyze_or_exit(&request, &series, &thresholds, &engine, options.json)?;
                if options.json {
                    let body = serde_json::json!({
                        "grid_id": grid_id,
                        "sowing_date": sowing_date,
                        "farmers": farmers,
                        "report": outcome,
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                } else {
                    println!("{}", render::render_cohort(&grid_id, sowing_date, &farmers));
                    println!("{}", render::render_outcome(&outcome, None));
                }
                return Ok(());
            }

            let series = match cohorts.iter().map(|c| c.sowing_date).min() {
                Some(earliest) => {
                    client
                        .fetch_weather(&grid_id, month_start(earliest), question_date)
                        .await?
                }
                None => WeatherSeries::empty(),
            };
            let statuses = summarize_grid(&cohorts, &series, question_date, &thresholds);
            if options.json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
            } else {
                println!("{}", render::render_grid(&grid_id, question_date, &statuses));
            }
            Ok(())
        }
        Commands::Check => run_check(&config, &thresholds, &engine).await,
    }
}

fn load_catalog(config: &Config) -> Result<RiskCatalog> {
    match &config.analysis.catalog_path {
        Some(path) => {
            let catalog = RiskCatalog::from_yaml_file(path)
                .with_context(|| format!("Failed to load rule catalog {}", path.display()))?;
            tracing::info!("Loaded rule catalog from {}", path.display());
            Ok(catalog)
        }
        None => Ok(RiskCatalog::cotton()),
    }
}

/// Weather is fetched from the first of the sowing month so month-to-date
/// rainy-day counts are complete from the first analyzed day.
fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn build_request(
    location_id: &str,
    sowing_date: NaiveDate,
    question_date: NaiveDate,
    options: &AnalysisOptions,
    config: &Config,
) -> AnalysisRequest {
    AnalysisRequest::new(location_id, sowing_date, question_date)
        .with_threshold(options.risk_threshold.unwrap_or(config.analysis.risk_threshold))
        .with_mode(options.mode())
}

fn run_analysis(
    request: &AnalysisRequest,
    series: &WeatherSeries,
    thresholds: &ThresholdCatalog,
    engine: &RiskEngine,
    options: &AnalysisOptions,
    field: Option<&FieldProfile>,
) -> Result<()> {
    let outcome = analyze_or_exit(request, series, thresholds, engine, options.json)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", render::render_outcome(&outcome, field));
    }
    Ok(())
}

/// Analysis errors are reported on stdout and end the process with status 2.
fn analyze_or_exit(
    request: &AnalysisRequest,
    series: &WeatherSeries,
    thresholds: &ThresholdCatalog,
    engine: &RiskEngine,
    json: bool,
) -> Result<AnalysisOutcome> {
    match analyze(request, series, thresholds, engine) {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            report_analysis_error(&e, json)?;
            std::process::exit(2);
        }
    }
}

fn report_analysis_error(error: &AnalysisError, json: bool) -> Result<()> {
    if json {
        let body = serde_json::json!({ "status": "error", "message": error.to_string() });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("Error: {}", error);
    }
    Ok(())
}

async fn run_check(config: &Config, thresholds: &ThresholdCatalog, engine: &RiskEngine) -> Result<()> {
    println!("Configuration: OK");
    println!("  Database: {}", config.database.masked());
    println!("  Risk threshold: {}%", config.analysis.risk_threshold);

    println!("Rule catalog: OK");
    for (kind, name) in engine.list_rules() {
        println!("  [{}] {}", kind, name);
    }

    let anomalies = thresholds.anomalies();
    println!("Threshold anomalies: {}", anomalies.len());
    for anomaly in &anomalies {
        tracing::warn!("Threshold anomaly: {}", anomaly);
        println!("  {}", anomaly);
    }

    if !config.database.is_configured() {
        println!("Database connection: not configured");
        return Ok(());
    }
    let client = match GridWeatherClient::connect(&config.database).await {
        Ok(client) => client,
        Err(e) => {
            println!("Database connection: FAILED ({})", e);
            return Ok(());
        }
    };
    if client.test_connection().await? {
        println!("Database connection: OK");
    } else {
        println!("Database connection: FAILED (query error)");
    }
    Ok(())
}
