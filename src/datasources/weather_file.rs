use crate::error::{CottonOpsError, Result};
use crate::models::{WeatherDay, WeatherSeries};
use std::path::Path;

/// Load a weather series from a JSON array of daily records.
///
/// Records must be strictly ascending by date. Numeric fields may be omitted
/// or `null` when the day had no observation.
pub fn load_weather_file(path: &Path) -> Result<WeatherSeries> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CottonOpsError::DataSourceUnavailable(format!(
            "Weather file {}: {}",
            path.display(),
            e
        ))
    })?;

    let days: Vec<WeatherDay> = serde_json::from_str(&contents)?;
    let series = WeatherSeries::new(days)?;
    tracing::debug!(
        days = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        "Loaded weather file {}",
        path.display()
    );
    Ok(series)
}
