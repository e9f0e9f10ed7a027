use super::thresholds::ThresholdRow;
use crate::models::{Phenophase, PhenophaseDate, WeatherDay, WeatherSeries};
use chrono::{Datelike, NaiveDate};

/// Base temperature for cotton heat units (°C)
pub const BASE_TEMP_C: f64 = 15.6;
/// Upper cutoff; hotter days accumulate as if they peaked here (°C)
pub const UPPER_TEMP_C: f64 = 34.0;

/// Calculate Growing Degree Days for one day.
///
/// Max temperature is capped at the upper cutoff and min temperature floored
/// at the base before averaging, so extreme heat does not overcount and a
/// cold night does not drag a warm day below the base.
pub fn calculate_gdd(tmax_c: f64, tmin_c: f64) -> f64 {
    let tmax = tmax_c.min(UPPER_TEMP_C);
    let tmin = tmin_c.max(BASE_TEMP_C);
    ((tmax + tmin) / 2.0 - BASE_TEMP_C).max(0.0)
}

/// GDD contributed by a weather row; zero when either extreme is missing.
pub fn gdd_for_day(day: &WeatherDay) -> f64 {
    match (day.tmax_c, day.tmin_c) {
        (Some(tmax), Some(tmin)) => calculate_gdd(tmax, tmin),
        _ => 0.0,
    }
}

/// Calculate total precipitation over a period
pub fn total_precipitation(days: &[WeatherDay]) -> f64 {
    days.iter()
        .filter_map(|d| d.precipitation_mm)
        .filter(|p| *p >= 0.0)
        .sum()
}

fn month_to_date(series: &WeatherSeries, date: NaiveDate) -> &[WeatherDay] {
    let month_start = date.with_day(1).unwrap_or(date);
    series.between(month_start, date)
}

/// Days with measurable rain from the first of `date`'s month through `date`.
pub fn rainy_days_month_to_date(series: &WeatherSeries, date: NaiveDate) -> u32 {
    month_to_date(series, date)
        .iter()
        .filter(|d| d.is_rainy())
        .count() as u32
}

/// Rain total from the first of `date`'s month through `date`.
pub fn rainfall_month_to_date(series: &WeatherSeries, date: NaiveDate) -> f64 {
    total_precipitation(month_to_date(series, date))
}

/// Mean of max/min temperature on a given date, if that day was observed.
pub fn average_temp_on(series: &WeatherSeries, date: NaiveDate) -> Option<f64> {
    series.get(date).and_then(|d| d.mean_temp_c())
}

/// Running heat-unit state for one field, advanced one weather day at a time.
///
/// Tracks cumulative GDD, the first day each phenophase lower bound was met,
/// and the pink bollworm clock, which starts on the first day peak flowering
/// (P4) is reached and counts that day's GDD.
#[derive(Debug, Clone)]
pub struct GddAccumulator<'a> {
    row: &'a ThresholdRow,
    pbw_threshold: f64,
    cumulative_gdd: f64,
    pbw_clock_start: Option<NaiveDate>,
    pbw_gdd: f64,
    total_rainfall_mm: f64,
    phenophase_dates: [Option<NaiveDate>; 10],
    days_counted: usize,
}

impl<'a> GddAccumulator<'a> {
    pub fn new(row: &'a ThresholdRow) -> Self {
        Self {
            row,
            pbw_threshold: row.pbw_clock_threshold(),
            cumulative_gdd: 0.0,
            pbw_clock_start: None,
            pbw_gdd: 0.0,
            total_rainfall_mm: 0.0,
            phenophase_dates: [None; 10],
            days_counted: 0,
        }
    }

    /// Add one day and return its GDD contribution.
    pub fn record(&mut self, day: &WeatherDay) -> f64 {
        let daily = gdd_for_day(day);
        self.cumulative_gdd += daily;
        self.total_rainfall_mm += day.precipitation_mm.filter(|p| *p >= 0.0).unwrap_or(0.0);
        self.days_counted += 1;

        for (i, (_, range)) in self.row.iter().enumerate() {
            if self.phenophase_dates[i].is_none() && self.cumulative_gdd >= range.min_gdd {
                self.phenophase_dates[i] = Some(day.date);
            }
        }

        if self.pbw_clock_start.is_none() && self.cumulative_gdd >= self.pbw_threshold {
            self.pbw_clock_start = Some(day.date);
        }
        if self.pbw_clock_start.is_some() {
            self.pbw_gdd += daily;
        }

        daily
    }

    pub fn cumulative_gdd(&self) -> f64 {
        self.cumulative_gdd
    }

    pub fn pbw_gdd(&self) -> f64 {
        self.pbw_gdd
    }

    pub fn pbw_clock_started(&self) -> bool {
        self.pbw_clock_start.is_some()
    }

    pub fn finish(self) -> GddProgress {
        let phenophase_dates = Phenophase::STAGES
            .into_iter()
            .zip(self.phenophase_dates)
            .filter_map(|(phenophase, date)| date.map(|date| PhenophaseDate { phenophase, date }))
            .collect();

        GddProgress {
            cumulative_gdd: self.cumulative_gdd,
            phenophase_dates,
            pbw_clock_start: self.pbw_clock_start,
            pbw_gdd: self.pbw_gdd,
            total_rainfall_mm: self.total_rainfall_mm,
            days_counted: self.days_counted,
        }
    }
}

/// Heat-unit totals from sowing through a question date.
#[derive(Debug, Clone, PartialEq)]
pub struct GddProgress {
    pub cumulative_gdd: f64,
    /// Start dates of phenophases reached so far, in stage order.
    pub phenophase_dates: Vec<PhenophaseDate>,
    pub pbw_clock_start: Option<NaiveDate>,
    pub pbw_gdd: f64,
    pub total_rainfall_mm: f64,
    /// Weather rows that fell inside the sowing..question window.
    pub days_counted: usize,
}

impl GddProgress {
    pub fn has_data(&self) -> bool {
        self.days_counted > 0
    }

    pub fn reached(&self, phenophase: Phenophase) -> Option<NaiveDate> {
        self.phenophase_dates
            .iter()
            .find(|d| d.phenophase == phenophase)
            .map(|d| d.date)
    }
}

/// Walk the series from `sowing_date` through `question_date` inclusive.
/// Days outside that window never contribute. An empty window yields zeroed
/// progress rather than an error.
pub fn accumulate_gdd(
    series: &WeatherSeries,
    sowing_date: NaiveDate,
    question_date: NaiveDate,
    row: &ThresholdRow,
) -> GddProgress {
    let mut acc = GddAccumulator::new(row);
    for day in series.between(sowing_date, question_date) {
        acc.record(day);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::thresholds::ThresholdCatalog;
    use crate::models::SowingWindow;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn constant_series(start: NaiveDate, days: u32, tmax: f64, tmin: f64) -> WeatherSeries {
        let days = (0..days)
            .map(|i| WeatherDay::new(start + chrono::Duration::days(i as i64)).with_temps(tmax, tmin))
            .collect();
        WeatherSeries::new(days).unwrap()
    }

    #[test]
    fn gdd_known_values() {
        assert!((calculate_gdd(30.0, 20.0) - 9.4).abs() < 1e-9);
        assert!((calculate_gdd(30.0, 10.0) - 7.2).abs() < 1e-9);
    }

    #[test]
    fn gdd_upper_and_lower_clamps() {
        assert_eq!(calculate_gdd(40.0, 20.0), calculate_gdd(34.0, 20.0));
        assert_eq!(calculate_gdd(30.0, 10.0), calculate_gdd(30.0, 15.6));
    }

    #[test]
    fn cold_day_contributes_nothing() {
        assert_eq!(calculate_gdd(14.0, 8.0), 0.0);
        assert_eq!(calculate_gdd(15.6, 15.6), 0.0);
    }

    #[test]
    fn missing_extreme_contributes_nothing() {
        let mut day = WeatherDay::new(date(6, 1));
        day.tmax_c = Some(35.0);
        assert_eq!(gdd_for_day(&day), 0.0);
    }

    #[test]
    fn precipitation_ignores_missing_and_negative_markers() {
        let mut a = WeatherDay::new(date(6, 1));
        a.precipitation_mm = Some(4.0);
        let mut b = WeatherDay::new(date(6, 2));
        b.precipitation_mm = Some(-9999.0);
        let c = WeatherDay::new(date(6, 3));
        assert_eq!(total_precipitation(&[a, b, c]), 4.0);
    }

    #[test]
    fn rainy_days_count_only_current_month() {
        let mut days = Vec::new();
        for (m, d, rain) in [(5, 30, 3.0), (5, 31, 1.0), (6, 1, 2.0), (6, 2, 0.0), (6, 3, 5.5)] {
            let mut day = WeatherDay::new(date(m, d));
            day.precipitation_mm = Some(rain);
            days.push(day);
        }
        let series = WeatherSeries::new(days).unwrap();
        assert_eq!(rainy_days_month_to_date(&series, date(6, 3)), 2);
        assert_eq!(rainy_days_month_to_date(&series, date(6, 2)), 1);
        assert!((rainfall_month_to_date(&series, date(6, 3)) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn only_days_between_sowing_and_question_count() {
        let series = constant_series(date(5, 25), 20, 30.0, 20.0);
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);

        let progress = accumulate_gdd(&series, date(6, 1), date(6, 5), row);
        assert_eq!(progress.days_counted, 5);
        assert!((progress.cumulative_gdd - 5.0 * calculate_gdd(30.0, 20.0)).abs() < 1e-9);
    }

    #[test]
    fn sixty_warm_days_from_june_first() {
        let series = constant_series(date(6, 1), 60, 30.0, 10.0);
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);

        let progress = accumulate_gdd(&series, date(6, 1), date(7, 30), row);
        assert!((progress.cumulative_gdd - 432.0).abs() < 1e-6);
        // 70 GDD is met on day 10 (72.0)
        assert_eq!(progress.reached(Phenophase::P1), Some(date(6, 10)));
        // P4 (386) met on day 54 (388.8)
        assert_eq!(progress.pbw_clock_start, Some(date(7, 24)));
        assert!((progress.pbw_gdd - 7.0 * 7.2).abs() < 1e-6);
        assert_eq!(progress.reached(Phenophase::P6), None);
    }

    #[test]
    fn first_passage_dates_are_never_overwritten() {
        let catalog = ThresholdCatalog::cotton();
        let row = catalog.row(SowingWindow::June1To4);
        let mut acc = GddAccumulator::new(row);

        let mut hot = WeatherDay::new(date(6, 1)).with_temps(34.0, 34.0);
        for offset in 0..10 {
            hot.date = date(6, 1) + chrono::Duration::days(offset);
            acc.record(&hot);
        }
        let progress = acc.finish();
        // 18.4 GDD/day crosses P1 (70) on day 4
        assert_eq!(progress.reached(Phenophase::P1), Some(date(6, 4)));
        let dates: Vec<_> = progress.phenophase_dates.iter().map(|d| d.date).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_series_yields_zeroed_progress() {
        let catalog = ThresholdCatalog::cotton();
        let progress = accumulate_gdd(
            &WeatherSeries::empty(),
            date(6, 1),
            date(8, 1),
            catalog.row(SowingWindow::June1To4),
        );
        assert!(!progress.has_data());
        assert_eq!(progress.cumulative_gdd, 0.0);
        assert_eq!(progress.total_rainfall_mm, 0.0);
        assert!(progress.phenophase_dates.is_empty());
        assert!(progress.pbw_clock_start.is_none());
    }

    #[test]
    fn average_temp_for_question_day() {
        let series = constant_series(date(6, 1), 3, 32.0, 22.0);
        assert_eq!(average_temp_on(&series, date(6, 2)), Some(27.0));
        assert_eq!(average_temp_on(&series, date(6, 9)), None);
    }
}
