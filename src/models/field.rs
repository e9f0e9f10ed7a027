use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A farmer's cotton field as registered in the grid mapping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProfile {
    pub farmer_id: f64,
    pub farmer_name: String,
    pub cluster_name: Option<String>,
    pub grid_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sowing_date: NaiveDate,
}

impl FieldProfile {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Farmers in one grid cell who sowed on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SowingCohort {
    pub sowing_date: NaiveDate,
    pub farmer_count: u32,
}

/// One farmer on the roster of a grid sowing cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortFarmer {
    pub farmer_id: f64,
    pub farmer_name: String,
}
