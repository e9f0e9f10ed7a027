use super::calculations::{rainy_days_month_to_date, GddAccumulator};
use super::phenophase::resolve_in_row;
use super::rules::{DayConditions, RiskEngine, RiskModel};
use super::thresholds::ThresholdRow;
use crate::models::{
    HistoricalSummary, HistoricalSummaryEntry, RiskFindings, RiskKind, WeatherSeries,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug)]
struct Tally {
    first_date: NaiveDate,
    days: u32,
    max_risk: f64,
    max_date: NaiveDate,
}

impl Tally {
    fn start(date: NaiveDate, risk: f64) -> Self {
        Self {
            first_date: date,
            days: 0,
            max_risk: risk,
            max_date: date,
        }
    }

    fn record(&mut self, date: NaiveDate, risk: f64) {
        self.days += 1;
        // Ties keep the earlier date
        if risk > self.max_risk {
            self.max_risk = risk;
            self.max_date = date;
        }
    }
}

/// Replay the season from `sowing_date` through `end_date` and summarize
/// every day a model of `kind` scored at or above `risk_threshold`.
///
/// Each call is an independent pass that re-derives GDD and crop stage day
/// by day. Pink bollworm joins the insect pass once its clock has started.
/// Only `risk_threshold` decides which days count; per-rule alert
/// thresholds are not applied here.
pub fn scan_history(
    kind: RiskKind,
    series: &WeatherSeries,
    sowing_date: NaiveDate,
    end_date: NaiveDate,
    row: &ThresholdRow,
    engine: &RiskEngine,
    risk_threshold: f64,
) -> HistoricalSummary {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    let mut acc = GddAccumulator::new(row);
    let pbw = &engine.catalog().pbw;

    let mut count = |name: &str, date: NaiveDate, risk: f64| {
        if risk >= risk_threshold {
            tallies
                .entry(name.to_string())
                .or_insert_with(|| Tally::start(date, risk))
                .record(date, risk);
        }
    };

    for day in series.between(sowing_date, end_date) {
        acc.record(day);
        let phenophase = resolve_in_row(acc.cumulative_gdd(), row).phenophase;
        let conditions = DayConditions::new(day, rainy_days_month_to_date(series, day.date));

        for rule in engine.rules(kind) {
            if let Some(risk) = rule.score(phenophase, &conditions) {
                count(&rule.name, day.date, risk);
            }
        }

        if kind == RiskKind::Insect && acc.pbw_clock_started() {
            if let Some(risk) = pbw.score(phenophase, &conditions) {
                count(&pbw.name, day.date, risk);
            }
        }
    }

    tracing::debug!(
        kind = %kind,
        models = tallies.len(),
        "Historical risk scan complete"
    );

    let findings = if tallies.is_empty() {
        RiskFindings::NoneDetected
    } else {
        RiskFindings::Detected(
            tallies
                .into_iter()
                .map(|(name, t)| HistoricalSummaryEntry {
                    name,
                    first_conducive_date: t.first_date,
                    conducive_days: t.days,
                    max_risk_percentage: t.max_risk,
                    max_risk_date: t.max_date,
                })
                .collect(),
        )
    };

    HistoricalSummary {
        kind,
        risk_threshold,
        findings,
    }
}
