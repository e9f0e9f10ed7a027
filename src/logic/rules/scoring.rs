use crate::logic::calculations::rainy_days_month_to_date;
use crate::models::{RiskCondition, WeatherDay, WeatherParameter, WeatherSeries};
use chrono::NaiveDate;

/// Everything a risk condition can be tested against on one day.
#[derive(Debug, Clone, Copy)]
pub struct DayConditions<'a> {
    pub day: &'a WeatherDay,
    /// Rainy days from the first of the month through `day`.
    pub rainy_days: u32,
}

impl<'a> DayConditions<'a> {
    pub fn new(day: &'a WeatherDay, rainy_days: u32) -> Self {
        Self { day, rainy_days }
    }

    /// Conditions for `date`, or `None` when the series has no row for it.
    pub fn from_series(series: &'a WeatherSeries, date: NaiveDate) -> Option<Self> {
        let day = series.get(date)?;
        Some(Self::new(day, rainy_days_month_to_date(series, date)))
    }

    /// Observed value of a parameter; `None` means the condition cannot be
    /// evaluated today.
    pub fn value(&self, parameter: WeatherParameter) -> Option<f64> {
        match parameter {
            WeatherParameter::TempMax => self.day.tmax_c,
            WeatherParameter::TempMin => self.day.tmin_c,
            WeatherParameter::Humidity => self.day.humidity_percent,
            WeatherParameter::SunshineHours => self.day.sunshine_hours,
            WeatherParameter::RainProbability => self.day.rain_probability_percent,
            WeatherParameter::CloudCover => self.day.cloud_cover_percent,
            WeatherParameter::Precipitation => self.day.precipitation_mm,
            WeatherParameter::RainyDays => Some(self.rainy_days as f64),
        }
    }
}

/// Weighted risk score in percent.
///
/// Only conditions with an observed value take part, so the denominator is
/// the sum of evaluated weights. Nothing evaluable scores 0%.
pub fn risk_percentage(conditions: &[RiskCondition], day: &DayConditions<'_>) -> f64 {
    let mut scored = 0.0;
    let mut evaluated = 0.0;

    for condition in conditions {
        let Some(value) = day.value(condition.parameter) else {
            continue;
        };
        evaluated += condition.weight;
        if condition.test.passes(value) {
            scored += condition.weight;
        }
    }

    if evaluated > 0.0 {
        100.0 * scored / evaluated
    } else {
        0.0
    }
}
