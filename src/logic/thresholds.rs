use crate::models::{GddRange, Phenophase, SowingWindow};
use serde::Serialize;

const fn row(ranges: [(f64, f64); 10]) -> ThresholdRow {
    let mut out = [GddRange::new(0.0, 0.0); 10];
    let mut i = 0;
    while i < 10 {
        out[i] = GddRange::new(ranges[i].0, ranges[i].1);
        i += 1;
    }
    ThresholdRow { ranges: out }
}

/// Cumulative-GDD ranges for P1..P10, indexed by `SowingWindow::index()`.
#[rustfmt::skip]
static COTTON_THRESHOLDS: [ThresholdRow; 15] = [
    // May 20–23
    row([(76.0, 80.0), (285.0, 307.0), (348.0, 386.0), (552.0, 605.0), (670.0, 732.0), (971.0, 1058.0), (1104.0, 1227.0), (1322.0, 1428.0), (1423.0, 1513.0), (1506.0, 1652.0)]),
    // May 24–27
    row([(74.0, 78.0), (278.0, 299.0), (339.0, 377.0), (540.0, 591.0), (655.0, 714.0), (948.0, 1032.0), (1079.0, 1196.0), (1291.0, 1393.0), (1389.0, 1476.0), (1470.0, 1616.0)]),
    // May 28–31
    row([(72.0, 76.0), (271.0, 292.0), (331.0, 385.0), (527.0, 575.0), (638.0, 696.0), (925.0, 1005.0), (1053.0, 1166.0), (1261.0, 1359.0), (1356.0, 1440.0), (1433.0, 1580.0)]),
    // June 1–4
    row([(70.0, 78.0), (264.0, 300.0), (322.0, 377.0), (386.0, 386.0), (400.0, 466.0), (900.0, 1034.0), (1024.0, 1202.0), (1225.0, 1399.0), (1319.0, 1481.0), (1397.0, 1543.0)]),
    // June 5–8
    row([(68.0, 77.0), (257.0, 296.0), (315.0, 371.0), (501.0, 582.0), (606.0, 703.0), (879.0, 1016.0), (1001.0, 1183.0), (1198.0, 1376.0), (1289.0, 1458.0), (1361.0, 1507.0)]),
    // June 9–12
    row([(66.0, 75.0), (251.0, 290.0), (307.0, 363.0), (488.0, 571.0), (592.0, 690.0), (857.0, 999.0), (976.0, 1163.0), (1168.0, 1353.0), (1257.0, 1434.0), (1324.0, 1471.0)]),
    // June 13–16
    row([(65.0, 73.0), (244.0, 285.0), (298.0, 355.0), (475.0, 559.0), (576.0, 677.0), (835.0, 981.0), (950.0, 1143.0), (1139.0, 1330.0), (1225.0, 1411.0), (1288.0, 1434.0)]),
    // June 17–20
    row([(62.0, 64.0), (238.0, 278.0), (298.0, 349.0), (417.0, 487.0), (451.0, 527.0), (811.0, 922.0), (945.0, 1044.0), (1009.0, 1121.0), (1115.0, 1175.0), (1252.0, 1398.0)]),
    // June 21–24
    row([(61.0, 63.0), (231.0, 272.0), (289.0, 342.0), (405.0, 476.0), (438.0, 514.0), (788.0, 904.0), (917.0, 1024.0), (980.0, 1099.0), (1085.0, 1155.0), (1216.0, 1362.0)]),
    // June 25–28
    row([(58.0, 61.0), (224.0, 265.0), (282.0, 336.0), (394.0, 465.0), (426.0, 502.0), (765.0, 886.0), (891.0, 1004.0), (952.0, 1077.0), (1053.0, 1134.0), (1179.0, 1326.0)]),
    // June 29–July 2
    row([(57.0, 59.0), (218.0, 259.0), (273.0, 329.0), (382.0, 454.0), (414.0, 488.0), (743.0, 868.0), (865.0, 985.0), (923.0, 1055.0), (1021.0, 1114.0), (1143.0, 1289.0)]),
    // July 3–6
    row([(55.0, 57.0), (209.0, 249.0), (262.0, 312.0), (372.0, 436.0), (400.0, 473.0), (718.0, 848.0), (837.0, 990.0), (892.0, 1057.0), (985.0, 1109.0), (1107.0, 1253.0)]),
    // July 7–10
    row([(54.0, 57.0), (206.0, 249.0), (259.0, 312.0), (366.0, 436.0), (396.0, 473.0), (711.0, 848.0), (827.0, 990.0), (882.0, 1057.0), (974.0, 1109.0), (1100.0, 1217.0)]),
    // July 11–14
    row([(54.0, 55.0), (206.0, 242.0), (259.0, 304.0), (366.0, 425.0), (396.0, 460.0), (711.0, 827.0), (827.0, 964.0), (882.0, 1029.0), (974.0, 1074.0), (1100.0, 1180.0)]),
    // July 15
    row([(54.0, 54.0), (206.0, 235.0), (259.0, 295.0), (366.0, 413.0), (396.0, 447.0), (711.0, 805.0), (827.0, 937.0), (882.0, 999.0), (974.0, 1038.0), (1100.0, 1144.0)]),
];

/// GDD ranges of the ten thresholded phenophases for one sowing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdRow {
    ranges: [GddRange; 10],
}

impl ThresholdRow {
    pub fn new(ranges: [GddRange; 10]) -> Self {
        Self { ranges }
    }

    /// Range for a thresholded stage; `P0` has none.
    pub fn range(&self, phenophase: Phenophase) -> Option<GddRange> {
        phenophase.stage_index().map(|i| self.ranges[i])
    }

    pub fn lower_bound(&self, phenophase: Phenophase) -> Option<f64> {
        self.range(phenophase).map(|r| r.min_gdd)
    }

    /// Lower bound of peak flowering, which starts the pink bollworm clock.
    pub fn pbw_clock_threshold(&self) -> f64 {
        // P4
        self.ranges[3].min_gdd
    }

    /// Stages paired with their ranges, in P1..P10 order.
    pub fn iter(&self) -> impl Iterator<Item = (Phenophase, GddRange)> + '_ {
        Phenophase::STAGES.into_iter().zip(self.ranges.iter().copied())
    }

    /// Highest-bound-first order used for stage resolution. Equal lower bounds
    /// put the later stage first.
    pub fn descending_by_lower_bound(&self) -> Vec<(Phenophase, GddRange)> {
        let mut stages: Vec<_> = self.iter().collect();
        stages.sort_by(|(pa, a), (pb, b)| {
            b.min_gdd
                .partial_cmp(&a.min_gdd)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(pb.cmp(pa))
        });
        stages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// `min_gdd == max_gdd`: the stage has no width.
    Degenerate,
    /// The stage's lower bound sits inside the previous stage's range.
    OverlapsPrevious,
    /// The stage's lower bound is below the previous stage's lower bound.
    NonMonotonic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdAnomaly {
    pub window: SowingWindow,
    pub phenophase: Phenophase,
    pub kind: AnomalyKind,
    pub range: GddRange,
}

impl std::fmt::Display for ThresholdAnomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.kind {
            AnomalyKind::Degenerate => "degenerate range",
            AnomalyKind::OverlapsPrevious => "overlaps previous stage",
            AnomalyKind::NonMonotonic => "lower bound below previous stage",
        };
        write!(
            f,
            "{} {} ({:.0}, {:.0}): {}",
            self.window,
            self.phenophase.code(),
            self.range.min_gdd,
            self.range.max_gdd,
            what
        )
    }
}

/// Phenophase thresholds for every sowing window. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCatalog {
    rows: [ThresholdRow; 15],
}

impl ThresholdCatalog {
    /// The built-in cotton catalog.
    pub fn cotton() -> Self {
        Self {
            rows: COTTON_THRESHOLDS,
        }
    }

    pub fn row(&self, window: SowingWindow) -> &ThresholdRow {
        &self.rows[window.index()]
    }

    /// Irregular entries in the agronomic data. These are reported, not fixed.
    pub fn anomalies(&self) -> Vec<ThresholdAnomaly> {
        let mut found = Vec::new();
        for window in SowingWindow::ALL {
            let row = self.row(window);
            let mut previous: Option<GddRange> = None;
            for (phenophase, range) in row.iter() {
                if range.is_degenerate() {
                    found.push(ThresholdAnomaly {
                        window,
                        phenophase,
                        kind: AnomalyKind::Degenerate,
                        range,
                    });
                }
                if let Some(prev) = previous {
                    if range.min_gdd < prev.min_gdd {
                        found.push(ThresholdAnomaly {
                            window,
                            phenophase,
                            kind: AnomalyKind::NonMonotonic,
                            range,
                        });
                    } else if range.min_gdd <= prev.max_gdd {
                        found.push(ThresholdAnomaly {
                            window,
                            phenophase,
                            kind: AnomalyKind::OverlapsPrevious,
                            range,
                        });
                    }
                }
                previous = Some(range);
            }
        }
        found
    }
}

impl Default for ThresholdCatalog {
    fn default() -> Self {
        Self::cotton()
    }
}
