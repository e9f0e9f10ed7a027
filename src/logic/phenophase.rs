use super::thresholds::{ThresholdCatalog, ThresholdRow};
use crate::error::AnalysisError;
use crate::models::{Phenophase, PhenophaseState, SowingWindow};
use chrono::NaiveDate;

/// Map a sowing date to its threshold window, or fail for dates the model
/// does not cover.
pub fn sowing_window_for(sowing_date: NaiveDate) -> Result<SowingWindow, AnalysisError> {
    SowingWindow::from_date(sowing_date).ok_or(AnalysisError::InvalidSowingDate(sowing_date))
}

/// Highest stage whose lower bound is met, scanning bounds high to low.
/// Falls back to `P0` when no bound is met.
pub fn resolve_in_row(cumulative_gdd: f64, row: &ThresholdRow) -> PhenophaseState {
    let phenophase = row
        .descending_by_lower_bound()
        .into_iter()
        .find(|(_, range)| range.min_gdd <= cumulative_gdd)
        .map(|(phenophase, _)| phenophase)
        .unwrap_or(Phenophase::P0);
    PhenophaseState::new(phenophase)
}

/// Resolve the crop stage for a field sown on `sowing_date` with
/// `cumulative_gdd` accumulated so far.
pub fn resolve_phenophase(
    cumulative_gdd: f64,
    sowing_date: NaiveDate,
    catalog: &ThresholdCatalog,
) -> Result<PhenophaseState, AnalysisError> {
    let window = sowing_window_for(sowing_date)?;
    Ok(resolve_in_row(cumulative_gdd, catalog.row(window)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GddRange;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn june_first_at_432_gdd_is_first_boll() {
        let catalog = ThresholdCatalog::cotton();
        let state = resolve_phenophase(432.0, date(6, 1), &catalog).unwrap();
        assert_eq!(state.phenophase, Phenophase::P5);
        assert_eq!(state.description, "First boll");
    }

    #[test]
    fn zero_gdd_is_pre_emergence() {
        let catalog = ThresholdCatalog::cotton();
        let state = resolve_phenophase(0.0, date(6, 1), &catalog).unwrap();
        assert_eq!(state.phenophase, Phenophase::P0);
        assert_eq!(state.code(), "P0");
    }

    #[test]
    fn exactly_on_lower_bound_enters_stage() {
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);
        let p10 = row.lower_bound(Phenophase::P10).unwrap();
        assert_eq!(resolve_in_row(p10, row).phenophase, Phenophase::P10);
        assert_eq!(resolve_in_row(p10 - 0.01, row).phenophase, Phenophase::P9);
    }

    #[test]
    fn sowing_outside_windows_is_rejected() {
        let catalog = ThresholdCatalog::cotton();
        for bad in [date(5, 1), date(5, 19), date(7, 16), date(8, 1)] {
            assert_eq!(
                resolve_phenophase(500.0, bad, &catalog),
                Err(AnalysisError::InvalidSowingDate(bad))
            );
        }
    }

    #[test]
    fn resolution_never_moves_backwards() {
        let catalog = ThresholdCatalog::cotton();
        for window in SowingWindow::ALL {
            let row = catalog.row(window);
            let mut last = Phenophase::P0;
            let mut gdd = 0.0;
            while gdd < 2500.0 {
                let current = resolve_in_row(gdd, row).phenophase;
                assert!(current >= last, "{} regressed at {} GDD", window, gdd);
                last = current;
                gdd += 2.5;
            }
        }
    }

    #[test]
    fn shared_lower_bound_resolves_to_later_stage() {
        let mut ranges = [GddRange::new(0.0, 0.0); 10];
        for (i, r) in ranges.iter_mut().enumerate() {
            let base = 100.0 * (i as f64 + 1.0);
            *r = GddRange::new(base, base + 99.0);
        }
        ranges[4] = GddRange::new(400.0, 400.0);
        let row = ThresholdRow::new(ranges);
        assert_eq!(resolve_in_row(450.0, &row).phenophase, Phenophase::P5);
    }
}
