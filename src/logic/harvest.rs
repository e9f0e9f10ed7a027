use super::calculations::BASE_TEMP_C;
use super::thresholds::ThresholdRow;
use crate::models::{HarvestForecast, Phenophase, PhenophaseDate};
use chrono::{Duration, NaiveDate};

/// Constant mean temperature behind every forward projection (°C).
pub const ASSUMED_AVG_TEMP_C: f64 = 25.0;
/// Heat units per projected day at the assumed temperature.
pub const PROJECTED_DAILY_GDD: f64 = ASSUMED_AVG_TEMP_C - BASE_TEMP_C;
/// Width of the harvest window after the earliest projected date.
pub const HARVEST_WINDOW_DAYS: i64 = 7;

/// Project the harvest window from the question date.
///
/// Ready once cumulative GDD meets the harvest-ready (P10) lower bound.
/// Otherwise the remaining heat units are spread over whole days at
/// `PROJECTED_DAILY_GDD`, rounding down.
pub fn predict_harvest(
    cumulative_gdd: f64,
    row: &ThresholdRow,
    question_date: NaiveDate,
) -> HarvestForecast {
    let target = row.lower_bound(Phenophase::P10).unwrap_or(f64::INFINITY);
    let remaining = target - cumulative_gdd;
    if remaining <= 0.0 {
        return HarvestForecast::Ready;
    }

    let days = (remaining / PROJECTED_DAILY_GDD).floor() as i64;
    let earliest = question_date + Duration::days(days);
    HarvestForecast::Window {
        earliest,
        latest: earliest + Duration::days(HARVEST_WINDOW_DAYS),
        assumed_avg_temp_c: ASSUMED_AVG_TEMP_C,
        daily_gdd: PROJECTED_DAILY_GDD,
    }
}

/// Expected start dates for stages not yet reached, aiming at the middle of
/// each stage's GDD range.
pub fn project_phenophases(
    cumulative_gdd: f64,
    row: &ThresholdRow,
    question_date: NaiveDate,
    reached: &[PhenophaseDate],
) -> Vec<PhenophaseDate> {
    row.iter()
        .filter(|(phenophase, _)| !reached.iter().any(|r| r.phenophase == *phenophase))
        .filter_map(|(phenophase, range)| {
            let remaining = range.midpoint() - cumulative_gdd;
            if remaining <= 0.0 {
                return None;
            }
            let days = (remaining / PROJECTED_DAILY_GDD).floor() as i64 + 1;
            Some(PhenophaseDate {
                phenophase,
                date: question_date + Duration::days(days),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::thresholds::ThresholdCatalog;
    use crate::models::SowingWindow;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn daily_rate_is_nine_point_four() {
        assert!((PROJECTED_DAILY_GDD - 9.4).abs() < 1e-9);
    }

    #[test]
    fn harvest_ready_exactly_at_p10_bound() {
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);
        let p10 = row.lower_bound(Phenophase::P10).unwrap();
        assert_eq!(predict_harvest(p10, row, date(10, 1)), HarvestForecast::Ready);
        assert_eq!(predict_harvest(p10 + 50.0, row, date(10, 1)), HarvestForecast::Ready);
    }

    #[test]
    fn harvest_window_rounds_days_down() {
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);
        let p10 = row.lower_bound(Phenophase::P10).unwrap();

        // 100 remaining GDD is 10.6 days, so 10
        match predict_harvest(p10 - 100.0, row, date(9, 1)) {
            HarvestForecast::Window {
                earliest,
                latest,
                assumed_avg_temp_c,
                ..
            } => {
                assert_eq!(earliest, date(9, 11));
                assert_eq!(latest, date(9, 18));
                assert_eq!(assumed_avg_temp_c, 25.0);
            }
            other => panic!("expected window, got {:?}", other),
        }
    }

    #[test]
    fn projections_skip_reached_stages_and_round_up() {
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);
        let p1 = row.lower_bound(Phenophase::P1).unwrap();
        let reached = vec![PhenophaseDate {
            phenophase: Phenophase::P1,
            date: date(6, 10),
        }];

        let projected = project_phenophases(p1, row, date(6, 10), &reached);
        assert!(projected.iter().all(|p| p.phenophase != Phenophase::P1));
        assert_eq!(projected.first().map(|p| p.phenophase), Some(Phenophase::P2));

        let p2 = row.range(Phenophase::P2).unwrap();
        let expected_days = ((p2.midpoint() - p1) / 9.4).floor() as i64 + 1;
        assert_eq!(projected[0].date, date(6, 10) + Duration::days(expected_days));
        assert!(projected.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn nothing_projected_past_harvest() {
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);
        assert!(project_phenophases(5000.0, row, date(11, 1), &[]).is_empty());
    }
}
