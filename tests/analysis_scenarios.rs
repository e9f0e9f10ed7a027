//! End-to-end analysis scenarios through the public API.

use chrono::{Duration, NaiveDate};
use cottonops::datasources::load_weather_file;
use cottonops::logic::harvest::predict_harvest;
use cottonops::logic::rules::scoring::risk_percentage;
use cottonops::logic::rules::DayConditions;
use cottonops::logic::{analyze, RiskCatalog, RiskEngine, ThresholdCatalog};
use cottonops::models::*;
use cottonops::AnalysisError;
use std::io::Write;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn constant_season(days: i64, tmax: f64, tmin: f64) -> Vec<WeatherDay> {
    (0..days)
        .map(|i| {
            let mut day = WeatherDay::new(date(6, 1) + Duration::days(i)).with_temps(tmax, tmin);
            day.humidity_percent = Some(75.0);
            day.sunshine_hours = Some(7.0);
            day.precipitation_mm = Some(if i % 5 == 0 { 6.0 } else { 0.0 });
            day
        })
        .collect()
}

fn full_report(outcome: AnalysisOutcome) -> AnalysisReport {
    match outcome {
        AnalysisOutcome::Full(report) => *report,
        other => panic!("expected a full report, got {:?}", other),
    }
}

#[test]
fn sixty_day_season_reaches_first_boll() {
    // 30/10 clamps to 30/15.6: 7.2 GDD per day
    let series = WeatherSeries::new(constant_season(60, 30.0, 10.0)).unwrap();
    let request = AnalysisRequest::new("grid-42", date(6, 1), date(7, 30));

    let report = full_report(
        analyze(&request, &series, &ThresholdCatalog::cotton(), &RiskEngine::default()).unwrap(),
    );

    assert_eq!(report.sowing_window.label(), "June 1–4");
    assert!((report.cumulative_gdd - 432.0).abs() < 1e-6);
    assert_eq!(report.phenophase.code(), "P5");
    assert_eq!(
        report.phenophase_dates.iter().map(|d| d.phenophase).collect::<Vec<_>>(),
        vec![Phenophase::P1, Phenophase::P2, Phenophase::P3, Phenophase::P4, Phenophase::P5]
    );
    for entry in report.insect_history.entries().iter().chain(report.disease_history.entries()) {
        assert!(entry.first_conducive_date <= entry.max_risk_date);
        assert!(entry.conducive_days >= 1);
    }
}

#[test]
fn harvest_ready_at_exact_p10_bound() {
    let catalog = ThresholdCatalog::cotton();
    for window in SowingWindow::ALL {
        let row = catalog.row(window);
        let p10 = row.lower_bound(Phenophase::P10).unwrap();
        assert_eq!(predict_harvest(p10, row, date(10, 15)), HarvestForecast::Ready);
    }
}

#[test]
fn only_evaluable_weights_form_the_denominator() {
    let conditions = vec![
        RiskCondition::range(WeatherParameter::TempMax, 25.0, 35.0, 0.4),
        RiskCondition::range(WeatherParameter::Humidity, 60.0, 80.0, 0.3),
        RiskCondition::range(WeatherParameter::RainProbability, 0.0, 30.0, 0.3),
    ];
    let mut day = WeatherDay::new(date(7, 1));
    day.humidity_percent = Some(65.0);
    let score = risk_percentage(&conditions, &DayConditions::new(&day, 0));
    assert!((score - 100.0).abs() < 1e-9);
}

#[test]
fn fusarium_rainy_day_boundary_in_month_to_date_window() {
    let wet_days = |count: usize| {
        (1..=20)
            .map(|d| {
                let mut day = WeatherDay::new(date(7, d)).with_temps(40.0, 26.0);
                day.humidity_percent = Some(20.0);
                day.precipitation_mm = Some(if (d as usize) <= count { 2.0 } else { 0.0 });
                day
            })
            .collect::<Vec<_>>()
    };
    let catalog = RiskCatalog::cotton();
    let fusarium = catalog
        .diseases
        .iter()
        .find(|r| r.name == "Fusarium Wilt")
        .unwrap();

    let five = WeatherSeries::new(wet_days(5)).unwrap();
    let today = DayConditions::from_series(&five, date(7, 20)).unwrap();
    assert_eq!(today.rainy_days, 5);
    // temp and humidity fail; only the rainy-day weight scores
    assert!((risk_percentage(&fusarium.conditions, &today) - 30.0).abs() < 1e-9);

    let four = WeatherSeries::new(wet_days(4)).unwrap();
    let today = DayConditions::from_series(&four, date(7, 20)).unwrap();
    assert_eq!(risk_percentage(&fusarium.conditions, &today), 0.0);
}

#[test]
fn invalid_sowing_date_is_reported_not_raised() {
    let series = WeatherSeries::new(constant_season(10, 30.0, 20.0)).unwrap();
    let request = AnalysisRequest::new("grid-42", date(8, 1), date(9, 1));
    let result = analyze(&request, &series, &ThresholdCatalog::cotton(), &RiskEngine::default());
    assert_eq!(result, Err(AnalysisError::InvalidSowingDate(date(8, 1))));
}

#[test]
fn weather_file_round_trip_into_analysis() {
    let days = constant_season(75, 33.0, 22.0);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&days).unwrap().as_bytes())
        .unwrap();

    let series = load_weather_file(file.path()).unwrap();
    assert_eq!(series.len(), 75);

    let request = AnalysisRequest::new("file", date(6, 1), date(8, 14))
        .with_mode(AnalysisMode::DiseasesOnly)
        .with_threshold(50.0);
    match analyze(&request, &series, &ThresholdCatalog::cotton(), &RiskEngine::default()).unwrap() {
        AnalysisOutcome::DiseasesOnly(summary) => {
            assert_eq!(summary.kind, RiskKind::Disease);
            assert_eq!(summary.risk_threshold, 50.0);
        }
        other => panic!("expected disease summary, got {:?}", other),
    }
}

#[test]
fn unsorted_weather_file_rejected() {
    let mut days = constant_season(3, 30.0, 20.0);
    days.swap(0, 2);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&days).unwrap().as_bytes())
        .unwrap();

    let err = load_weather_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("ascending"));
}

#[test]
fn report_serializes_to_json() {
    let series = WeatherSeries::new(constant_season(90, 32.0, 22.0)).unwrap();
    let request = AnalysisRequest::new("grid-42", date(6, 1), date(8, 29));
    let outcome =
        analyze(&request, &series, &ThresholdCatalog::cotton(), &RiskEngine::default()).unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["mode"], "full");
    assert_eq!(json["location_id"], "grid-42");
    assert!(json["harvest"]["status"].is_string());
    assert!(json["pbw"]["status"].is_string());
}
