use crate::config::DatabaseConfig;
use crate::error::{CottonOpsError, Result};
use crate::models::{CohortFarmer, FieldProfile, SowingCohort, WeatherDay, WeatherSeries};
use chrono::NaiveDate;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

const SOWING_DATE_COLUMN: &str = "Cotton sowing date ( कापसाची पेरणी त";

/// Daily grid-cell weather and farmer registrations from PostgreSQL.
pub struct GridWeatherClient {
    pool: PgPool,
}

impl GridWeatherClient {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| {
                CottonOpsError::DataSourceUnavailable(format!(
                    "Grid weather PostgreSQL ({}): {}",
                    config.masked(),
                    e
                ))
            })?;

        tracing::info!("Connected to grid weather database at {}", config.masked());
        Ok(Self { pool })
    }

    /// Daily rows for one grid cell, `start` through `end` inclusive.
    ///
    /// The table has no rain probability column, so that field is always
    /// `None`. Sunshine is stored in seconds and converted to hours.
    pub async fn fetch_weather(
        &self,
        grid_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<WeatherSeries> {
        let rows = sqlx::query(
            r#"
            SELECT
                DATE("date") AS date,
                temperature_2m_max::float8 AS tmax,
                temperature_2m_min::float8 AS tmin,
                precipitation_sum::float8 AS precipitation,
                (sunshine_duration / 3600)::float8 AS sunshine_hours,
                relative_humidity_2m_mean::float8 AS humidity,
                cloud_cover_mean::float8 AS cloud
            FROM farmer_grid_weather_data
            WHERE DATE("date") BETWEEN $1 AND $2
              AND grid_id = $3
            ORDER BY date
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(grid_id)
        .fetch_all(&self.pool)
        .await?;

        let mut days: Vec<WeatherDay> = Vec::with_capacity(rows.len());
        for row in &rows {
            let day = row_to_day(row)?;
            // Several stations can map to one cell; keep the first row per date
            if days.last().map(|d| d.date) == Some(day.date) {
                tracing::debug!(grid_id, date = %day.date, "Duplicate weather row skipped");
                continue;
            }
            days.push(day);
        }

        let series = WeatherSeries::new(days)?;
        match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => {
                tracing::debug!(grid_id, days = series.len(), %first, %last, "Fetched grid weather");
                if last < end {
                    tracing::warn!("Weather for grid_id={} ends on {}, before {}", grid_id, last, end);
                }
            }
            _ => tracing::warn!(
                "No weather data for grid_id={} from {} to {}",
                grid_id,
                start,
                end
            ),
        }
        Ok(series)
    }

    pub async fn fetch_farmer(&self, farmer_id: f64) -> Result<FieldProfile> {
        let query = format!(
            r#"
            SELECT
                "Farmer ID"::float8 AS farmer_id,
                "Farmer Name"::text AS farmer_name,
                "Cluster name"::text AS cluster_name,
                "Grid_ID"::text AS grid_id,
                grid_lat::float8 AS latitude,
                grid_lon::float8 AS longitude,
                DATE("{}") AS sowing_date
            FROM farmer_grid_mapping
            WHERE "Farmer ID" = $1
            LIMIT 1
            "#,
            SOWING_DATE_COLUMN
        );

        let row = sqlx::query(&query)
            .bind(farmer_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CottonOpsError::NotFound(format!("Farmer ID {}", farmer_id)))?;

        let sowing_date: Option<NaiveDate> = row.try_get("sowing_date")?;
        let sowing_date = sowing_date.ok_or_else(|| {
            CottonOpsError::InvalidData(format!("Farmer ID {} has no sowing date", farmer_id))
        })?;
        let grid_id: Option<String> = row.try_get("grid_id")?;
        let grid_id = grid_id.ok_or_else(|| {
            CottonOpsError::InvalidData(format!("Farmer ID {} has no grid cell", farmer_id))
        })?;

        Ok(FieldProfile {
            farmer_id: row.try_get("farmer_id")?,
            farmer_name: row
                .try_get::<Option<String>, _>("farmer_name")?
                .unwrap_or_default(),
            cluster_name: row.try_get("cluster_name")?,
            grid_id,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            sowing_date,
        })
    }

    /// Distinct sowing dates in a grid cell with the number of farmers on each.
    pub async fn fetch_grid_cohorts(&self, grid_id: &str) -> Result<Vec<SowingCohort>> {
        let query = format!(
            r#"
            SELECT
                DATE("{col}") AS sowing_date,
                COUNT(DISTINCT "Farmer ID") AS farmer_count
            FROM farmer_grid_mapping
            WHERE "Grid_ID"::text = $1
              AND "{col}" IS NOT NULL
            GROUP BY DATE("{col}")
            ORDER BY sowing_date
            "#,
            col = SOWING_DATE_COLUMN
        );

        let rows = sqlx::query(&query)
            .bind(grid_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<SowingCohort> {
                let farmer_count: i64 = row.try_get("farmer_count")?;
                Ok(SowingCohort {
                    sowing_date: row.try_get("sowing_date")?,
                    farmer_count: u32::try_from(farmer_count).unwrap_or(u32::MAX),
                })
            })
            .collect()
    }

    /// Farmers registered in `grid_id` with the given sowing date.
    pub async fn fetch_cohort_farmers(
        &self,
        grid_id: &str,
        sowing_date: NaiveDate,
    ) -> Result<Vec<CohortFarmer>> {
        let query = format!(
            r#"
            SELECT
                "Farmer ID"::float8 AS farmer_id,
                "Farmer Name"::text AS farmer_name
            FROM farmer_grid_mapping
            WHERE "Grid_ID"::text = $1
              AND DATE("{}") = $2
            ORDER BY farmer_id
            "#,
            SOWING_DATE_COLUMN
        );

        let rows = sqlx::query(&query)
            .bind(grid_id)
            .bind(sowing_date)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<CohortFarmer> {
                Ok(CohortFarmer {
                    farmer_id: row.try_get("farmer_id")?,
                    farmer_name: row
                        .try_get::<Option<String>, _>("farmer_name")?
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let result = sqlx::query("SELECT 1").fetch_one(&self.pool).await;

        Ok(result.is_ok())
    }
}

fn row_to_day(row: &PgRow) -> Result<WeatherDay> {
    let date: NaiveDate = row.try_get("date")?;
    let mut day = WeatherDay::new(date);

    day.tmax_c = row.try_get("tmax")?;
    day.tmin_c = row.try_get("tmin")?;
    day.precipitation_mm = row
        .try_get::<Option<f64>, _>("precipitation")?
        .filter(|p| *p >= 0.0);
    day.sunshine_hours = row.try_get("sunshine_hours")?;
    day.humidity_percent = row.try_get("humidity")?;
    day.cloud_cover_percent = row.try_get("cloud")?;

    Ok(day)
}
