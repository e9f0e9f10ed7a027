use super::calculations::{accumulate_gdd, average_temp_on, rainfall_month_to_date};
use super::harvest::{predict_harvest, project_phenophases};
use super::history::scan_history;
use super::phenophase::{resolve_in_row, sowing_window_for};
use super::rules::{DayConditions, RiskEngine};
use super::thresholds::ThresholdCatalog;
use crate::error::AnalysisError;
use crate::models::{
    AnalysisMode, AnalysisNotice, AnalysisOutcome, AnalysisReport, AnalysisRequest,
    GridCohortStatus, RiskKind, SowingCohort, SowingWindow, WeatherSeries,
};

/// Run one analysis over a caller-supplied weather series.
///
/// Missing weather degrades the report and is recorded in its notices. Only
/// a sowing date outside every window, or a stage that cannot be resolved,
/// comes back as an error.
pub fn analyze(
    request: &AnalysisRequest,
    series: &WeatherSeries,
    thresholds: &ThresholdCatalog,
    engine: &RiskEngine,
) -> Result<AnalysisOutcome, AnalysisError> {
    let window = sowing_window_for(request.sowing_date)?;
    let row = thresholds.row(window);

    tracing::debug!(
        location = %request.location_id,
        sowing_date = %request.sowing_date,
        question_date = %request.question_date,
        window = %window,
        mode = ?request.mode,
        "Running analysis"
    );

    let scan = |kind| {
        scan_history(
            kind,
            series,
            request.sowing_date,
            request.question_date,
            row,
            engine,
            request.risk_threshold,
        )
    };

    let progress = accumulate_gdd(series, request.sowing_date, request.question_date, row);
    if !progress.cumulative_gdd.is_finite() {
        return Err(AnalysisError::UnresolvablePhenophase {
            cumulative_gdd: progress.cumulative_gdd,
            question_date: request.question_date,
        });
    }

    match request.mode {
        AnalysisMode::InsectsOnly => return Ok(AnalysisOutcome::InsectsOnly(scan(RiskKind::Insect))),
        AnalysisMode::DiseasesOnly => return Ok(AnalysisOutcome::DiseasesOnly(scan(RiskKind::Disease))),
        AnalysisMode::Full => {}
    }

    let mut notices = Vec::new();
    if progress.has_data() {
        let observed = series.between(request.sowing_date, request.question_date);
        notices.extend(engine.configuration_gaps(observed));
    } else {
        tracing::warn!(
            location = %request.location_id,
            "No weather data between {} and {}",
            request.sowing_date,
            request.question_date
        );
        notices.push(AnalysisNotice::InsufficientWeatherData {
            start: request.sowing_date,
            end: request.question_date,
        });
    }

    let phenophase = resolve_in_row(progress.cumulative_gdd, row);
    let today = DayConditions::from_series(series, request.question_date);
    if today.is_none() {
        notices.push(AnalysisNotice::MissingQuestionDay {
            date: request.question_date,
        });
    }

    let (insect_alerts, disease_alerts) = match &today {
        Some(day) => (
            engine.evaluate_insects(phenophase.phenophase, day),
            engine.evaluate_diseases(phenophase.phenophase, day),
        ),
        None => (Vec::new(), Vec::new()),
    };
    let pbw = engine.evaluate_pbw(progress.pbw_gdd, phenophase.phenophase, today.as_ref());

    let projected_phenophases = project_phenophases(
        progress.cumulative_gdd,
        row,
        request.question_date,
        &progress.phenophase_dates,
    );
    let harvest = predict_harvest(progress.cumulative_gdd, row, request.question_date);

    let report = AnalysisReport {
        location_id: request.location_id.clone(),
        sowing_date: request.sowing_date,
        question_date: request.question_date,
        sowing_window: window,
        risk_threshold: request.risk_threshold,
        phenophase,
        cumulative_gdd: progress.cumulative_gdd,
        total_rainfall_mm: progress.total_rainfall_mm,
        month_rainfall_mm: rainfall_month_to_date(series, request.question_date),
        average_temp_c: average_temp_on(series, request.question_date),
        pbw,
        insect_alerts,
        disease_alerts,
        insect_history: scan(RiskKind::Insect),
        disease_history: scan(RiskKind::Disease),
        phenophase_dates: progress.phenophase_dates,
        projected_phenophases,
        harvest,
        notices,
    };

    Ok(AnalysisOutcome::Full(Box::new(report)))
}

/// Crop stage and harvest outlook for every sowing cohort of one grid cell.
/// Cohorts sown outside the model's windows are kept with no stage.
pub fn summarize_grid(
    cohorts: &[SowingCohort],
    series: &WeatherSeries,
    question_date: chrono::NaiveDate,
    thresholds: &ThresholdCatalog,
) -> Vec<GridCohortStatus> {
    cohorts
        .iter()
        .map(|cohort| {
            let Some(window) = SowingWindow::from_date(cohort.sowing_date) else {
                return GridCohortStatus {
                    sowing_date: cohort.sowing_date,
                    farmer_count: cohort.farmer_count,
                    phenophase: None,
                    harvest: None,
                };
            };
            let row = thresholds.row(window);
            let progress = accumulate_gdd(series, cohort.sowing_date, question_date, row);
            GridCohortStatus {
                sowing_date: cohort.sowing_date,
                farmer_count: cohort.farmer_count,
                phenophase: Some(resolve_in_row(progress.cumulative_gdd, row)),
                harvest: Some(predict_harvest(progress.cumulative_gdd, row, question_date)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HarvestForecast, PbwForecast, Phenophase, WeatherDay};
    use chrono::{Duration, NaiveDate};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn warm_season(days: i64) -> WeatherSeries {
        let days = (0..days)
            .map(|i| {
                let mut day = WeatherDay::new(date(6, 1) + Duration::days(i)).with_temps(30.0, 10.0);
                day.humidity_percent = Some(70.0);
                day.sunshine_hours = Some(6.0);
                day.precipitation_mm = Some(if i % 4 == 0 { 3.0 } else { 0.0 });
                day
            })
            .collect();
        WeatherSeries::new(days).unwrap()
    }

    fn run(request: AnalysisRequest, series: &WeatherSeries) -> Result<AnalysisOutcome, AnalysisError> {
        analyze(&request, series, &ThresholdCatalog::cotton(), &RiskEngine::default())
    }

    fn full(outcome: AnalysisOutcome) -> AnalysisReport {
        match outcome {
            AnalysisOutcome::Full(report) => *report,
            other => panic!("expected full report, got {:?}", other),
        }
    }

    #[test]
    fn full_report_after_sixty_days() {
        let series = warm_season(60);
        let report = full(run(AnalysisRequest::new("G-1", date(6, 1), date(7, 30)), &series).unwrap());

        assert_eq!(report.sowing_window, SowingWindow::June1To4);
        assert!((report.cumulative_gdd - 432.0).abs() < 1e-6);
        assert_eq!(report.phenophase.phenophase, Phenophase::P5);
        assert_eq!(report.average_temp_c, Some(20.0));
        assert!((report.total_rainfall_mm - 45.0).abs() < 1e-9);
        // July 2, 6, ..., 26 at 3 mm each
        assert!((report.month_rainfall_mm - 21.0).abs() < 1e-9);
        assert!(matches!(report.pbw, PbwForecast::Active(_)));
        assert!(matches!(report.harvest, HarvestForecast::Window { .. }));
        assert!(report.projected_phenophases.iter().all(|p| p.phenophase > Phenophase::P5));
        assert!(report.insect_history.entry("Aphids").is_some());
        // rain probability never supplied
        assert!(report
            .notices
            .iter()
            .any(|n| matches!(n, AnalysisNotice::ConfigurationGap { .. })));
    }

    #[test]
    fn invalid_sowing_date_is_an_error_value() {
        let series = warm_season(10);
        let err = run(AnalysisRequest::new("G-1", date(8, 1), date(9, 1)), &series).unwrap_err();
        assert_eq!(err, AnalysisError::InvalidSowingDate(date(8, 1)));
        assert!(err.to_string().contains("outside valid sowing windows"));
    }

    #[test]
    fn empty_series_degrades_with_notices() {
        let report = full(
            run(AnalysisRequest::new("G-1", date(6, 1), date(7, 1)), &WeatherSeries::empty()).unwrap(),
        );
        assert_eq!(report.cumulative_gdd, 0.0);
        assert_eq!(report.phenophase.phenophase, Phenophase::P0);
        assert_eq!(report.average_temp_c, None);
        assert!(report.insect_alerts.is_empty());
        assert_eq!(report.pbw, PbwForecast::NotActive);
        assert!(report.insect_history.none_detected());
        assert!(report.notices.contains(&AnalysisNotice::InsufficientWeatherData {
            start: date(6, 1),
            end: date(7, 1),
        }));
        assert!(report
            .notices
            .contains(&AnalysisNotice::MissingQuestionDay { date: date(7, 1) }));
    }

    #[test]
    fn non_finite_gdd_is_unresolvable_in_every_mode() {
        let day = WeatherDay::new(date(6, 2)).with_temps(30.0, f64::INFINITY);
        let series = WeatherSeries::new(vec![day]).unwrap();
        let base = AnalysisRequest::new("G-1", date(6, 1), date(6, 10));

        for mode in [AnalysisMode::Full, AnalysisMode::InsectsOnly, AnalysisMode::DiseasesOnly] {
            let err = run(base.clone().with_mode(mode), &series).unwrap_err();
            assert!(
                matches!(err, AnalysisError::UnresolvablePhenophase { question_date, .. } if question_date == date(6, 10)),
                "{:?}: {:?}",
                mode,
                err
            );
        }
    }

    #[test]
    fn single_purpose_modes_return_one_summary() {
        let series = warm_season(60);
        let base = AnalysisRequest::new("G-1", date(6, 1), date(7, 30));

        match run(base.clone().with_mode(AnalysisMode::InsectsOnly), &series).unwrap() {
            AnalysisOutcome::InsectsOnly(summary) => assert_eq!(summary.kind, RiskKind::Insect),
            other => panic!("unexpected {:?}", other),
        }
        match run(base.with_mode(AnalysisMode::DiseasesOnly), &series).unwrap() {
            AnalysisOutcome::DiseasesOnly(summary) => assert_eq!(summary.kind, RiskKind::Disease),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn grid_summary_keeps_out_of_window_cohorts() {
        let series = warm_season(60);
        let cohorts = [
            SowingCohort {
                sowing_date: date(6, 1),
                farmer_count: 12,
            },
            SowingCohort {
                sowing_date: date(4, 15),
                farmer_count: 2,
            },
        ];
        let statuses = summarize_grid(&cohorts, &series, date(7, 30), &ThresholdCatalog::cotton());
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].phenophase.map(|p| p.phenophase), Some(Phenophase::P5));
        assert!(statuses[0].harvest.is_some());
        assert_eq!(statuses[1].farmer_count, 2);
        assert!(statuses[1].phenophase.is_none());
        assert!(statuses[1].harvest.is_none());
    }
}
