use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cotton development stage. `P0` is the pre-emergence sentinel; `P1`..`P10`
/// are entered once cumulative GDD crosses the stage's lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phenophase {
    P0,
    P1,
    P2,
    P3,
    P4,
    P5,
    P6,
    P7,
    P8,
    P9,
    P10,
}

impl Phenophase {
    /// The ten thresholded stages, in development order.
    pub const STAGES: [Phenophase; 10] = [
        Phenophase::P1,
        Phenophase::P2,
        Phenophase::P3,
        Phenophase::P4,
        Phenophase::P5,
        Phenophase::P6,
        Phenophase::P7,
        Phenophase::P8,
        Phenophase::P9,
        Phenophase::P10,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Phenophase::P0 => "P0",
            Phenophase::P1 => "P1",
            Phenophase::P2 => "P2",
            Phenophase::P3 => "P3",
            Phenophase::P4 => "P4",
            Phenophase::P5 => "P5",
            Phenophase::P6 => "P6",
            Phenophase::P7 => "P7",
            Phenophase::P8 => "P8",
            Phenophase::P9 => "P9",
            Phenophase::P10 => "P10",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Phenophase::P0 => "Pre-emergence",
            Phenophase::P1 => "Emergence",
            Phenophase::P2 => "First square",
            Phenophase::P3 => "First flower",
            Phenophase::P4 => "Peak flowering",
            Phenophase::P5 => "First boll",
            Phenophase::P6 => "Boll development",
            Phenophase::P7 => "First boll open",
            Phenophase::P8 => "50% boll open",
            Phenophase::P9 => "90% boll open",
            Phenophase::P10 => "Harvest ready",
        }
    }

    /// Position within `STAGES`, `None` for `P0`.
    pub fn stage_index(&self) -> Option<usize> {
        Self::STAGES.iter().position(|p| p == self)
    }
}

impl std::fmt::Display for Phenophase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code(), self.description())
    }
}

/// Sowing-date bucket selecting one row of the threshold catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SowingWindow {
    May20To23,
    May24To27,
    May28To31,
    June1To4,
    June5To8,
    June9To12,
    June13To16,
    June17To20,
    June21To24,
    June25To28,
    June29ToJuly2,
    July3To6,
    July7To10,
    July11To14,
    July15,
}

impl SowingWindow {
    pub const ALL: [SowingWindow; 15] = [
        SowingWindow::May20To23,
        SowingWindow::May24To27,
        SowingWindow::May28To31,
        SowingWindow::June1To4,
        SowingWindow::June5To8,
        SowingWindow::June9To12,
        SowingWindow::June13To16,
        SowingWindow::June17To20,
        SowingWindow::June21To24,
        SowingWindow::June25To28,
        SowingWindow::June29ToJuly2,
        SowingWindow::July3To6,
        SowingWindow::July7To10,
        SowingWindow::July11To14,
        SowingWindow::July15,
    ];

    /// Classify a sowing date by month and day. Dates outside May 20 - July 15
    /// have no window; the year is ignored.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        let day = date.day();
        match date.month() {
            5 => match day {
                20..=23 => Some(SowingWindow::May20To23),
                24..=27 => Some(SowingWindow::May24To27),
                28..=31 => Some(SowingWindow::May28To31),
                _ => None,
            },
            6 => match day {
                1..=4 => Some(SowingWindow::June1To4),
                5..=8 => Some(SowingWindow::June5To8),
                9..=12 => Some(SowingWindow::June9To12),
                13..=16 => Some(SowingWindow::June13To16),
                17..=20 => Some(SowingWindow::June17To20),
                21..=24 => Some(SowingWindow::June21To24),
                25..=28 => Some(SowingWindow::June25To28),
                29..=30 => Some(SowingWindow::June29ToJuly2),
                _ => None,
            },
            7 => match day {
                1..=2 => Some(SowingWindow::June29ToJuly2),
                3..=6 => Some(SowingWindow::July3To6),
                7..=10 => Some(SowingWindow::July7To10),
                11..=14 => Some(SowingWindow::July11To14),
                15 => Some(SowingWindow::July15),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SowingWindow::May20To23 => "May 20–23",
            SowingWindow::May24To27 => "May 24–27",
            SowingWindow::May28To31 => "May 28–31",
            SowingWindow::June1To4 => "June 1–4",
            SowingWindow::June5To8 => "June 5–8",
            SowingWindow::June9To12 => "June 9–12",
            SowingWindow::June13To16 => "June 13–16",
            SowingWindow::June17To20 => "June 17–20",
            SowingWindow::June21To24 => "June 21–24",
            SowingWindow::June25To28 => "June 25–28",
            SowingWindow::June29ToJuly2 => "June 29–July 2",
            SowingWindow::July3To6 => "July 3–6",
            SowingWindow::July7To10 => "July 7–10",
            SowingWindow::July11To14 => "July 11–14",
            SowingWindow::July15 => "July 15",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for SowingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Closed interval of cumulative GDD for one phenophase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GddRange {
    pub min_gdd: f64,
    pub max_gdd: f64,
}

impl GddRange {
    pub const fn new(min_gdd: f64, max_gdd: f64) -> Self {
        Self { min_gdd, max_gdd }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min_gdd + self.max_gdd) / 2.0
    }

    pub fn is_degenerate(&self) -> bool {
        self.min_gdd == self.max_gdd
    }
}

/// Crop stage derived from cumulative GDD for a given sowing date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhenophaseState {
    pub phenophase: Phenophase,
    pub description: &'static str,
}

impl PhenophaseState {
    pub fn new(phenophase: Phenophase) -> Self {
        Self {
            phenophase,
            description: phenophase.description(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.phenophase.code()
    }
}

impl std::fmt::Display for PhenophaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code(), self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn every_covered_day_has_exactly_one_window() {
        let mut day = date(5, 20);
        let last = date(7, 15);
        let mut previous: Option<SowingWindow> = None;
        while day <= last {
            let window = SowingWindow::from_date(day);
            assert!(window.is_some(), "no window for {}", day);
            // Contiguous buckets: the window index never goes backwards or skips
            if let (Some(prev), Some(cur)) = (previous, window) {
                assert!(cur.index() == prev.index() || cur.index() == prev.index() + 1);
            }
            previous = window;
            day = day.succ_opt().unwrap();
        }
        assert_eq!(previous, Some(SowingWindow::July15));
    }

    #[test]
    fn dates_outside_the_season_have_no_window() {
        assert_eq!(SowingWindow::from_date(date(5, 1)), None);
        assert_eq!(SowingWindow::from_date(date(5, 19)), None);
        assert_eq!(SowingWindow::from_date(date(7, 16)), None);
        assert_eq!(SowingWindow::from_date(date(8, 1)), None);
        assert_eq!(SowingWindow::from_date(date(4, 1)), None);
    }

    #[test]
    fn month_boundary_bucket_spans_june_and_july() {
        assert_eq!(
            SowingWindow::from_date(date(6, 29)),
            Some(SowingWindow::June29ToJuly2)
        );
        assert_eq!(
            SowingWindow::from_date(date(7, 2)),
            Some(SowingWindow::June29ToJuly2)
        );
        assert_eq!(SowingWindow::from_date(date(6, 1)).map(|w| w.label()), Some("June 1–4"));
    }

    #[test]
    fn window_index_matches_all_order() {
        for (i, window) in SowingWindow::ALL.iter().enumerate() {
            assert_eq!(window.index(), i);
        }
    }

    #[test]
    fn phenophase_display() {
        assert_eq!(Phenophase::P4.to_string(), "P4 - Peak flowering");
        assert_eq!(PhenophaseState::new(Phenophase::P0).to_string(), "P0 - Pre-emergence");
        assert_eq!(Phenophase::P0.stage_index(), None);
        assert_eq!(Phenophase::P10.stage_index(), Some(9));
    }
}
