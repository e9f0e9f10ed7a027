use crate::error::{CottonOpsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of observations for a grid cell.
///
/// Every numeric field is optional: a `None` means the feed had no value for
/// that day, which is different from a measured zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub tmax_c: Option<f64>,
    pub tmin_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub sunshine_hours: Option<f64>,
    pub humidity_percent: Option<f64>,
    pub cloud_cover_percent: Option<f64>,
    /// Not supplied by the grid weather table; file feeds may carry it.
    pub rain_probability_percent: Option<f64>,
}

impl WeatherDay {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            tmax_c: None,
            tmin_c: None,
            precipitation_mm: None,
            sunshine_hours: None,
            humidity_percent: None,
            cloud_cover_percent: None,
            rain_probability_percent: None,
        }
    }

    pub fn with_temps(mut self, tmax_c: f64, tmin_c: f64) -> Self {
        self.tmax_c = Some(tmax_c);
        self.tmin_c = Some(tmin_c);
        self
    }

    /// Mean of the day's max and min temperature, if both were observed.
    pub fn mean_temp_c(&self) -> Option<f64> {
        Some((self.tmax_c? + self.tmin_c?) / 2.0)
    }

    pub fn is_rainy(&self) -> bool {
        self.precipitation_mm.map(|p| p > 0.0).unwrap_or(false)
    }
}

/// Daily weather for one location, sorted by date with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherSeries {
    days: Vec<WeatherDay>,
}

impl WeatherSeries {
    pub fn new(days: Vec<WeatherDay>) -> Result<Self> {
        if let Some(pair) = days.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(CottonOpsError::InvalidData(format!(
                "weather series must be strictly ascending by date ({} then {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { days })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|d| d.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|d| d.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&WeatherDay> {
        self.days
            .binary_search_by_key(&date, |d| d.date)
            .ok()
            .map(|i| &self.days[i])
    }

    /// Days with `start <= date <= end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[WeatherDay] {
        let lo = self.days.partition_point(|d| d.date < start);
        let hi = self.days.partition_point(|d| d.date <= end);
        if lo >= hi {
            &[]
        } else {
            &self.days[lo..hi]
        }
    }
}

impl<'de> Deserialize<'de> for WeatherSeries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let days = Vec::<WeatherDay>::deserialize(deserializer)?;
        WeatherSeries::new(days).map_err(D::Error::custom)
    }
}
