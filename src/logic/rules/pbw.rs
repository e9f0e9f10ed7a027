//! Pink bollworm development clock.
//!
//! Stage, generation and baseline severity depend only on the GDD counted
//! since peak flowering. Weather decides the risk percentage, which can
//! escalate severity but never lower it.

use super::scoring::{risk_percentage, DayConditions};
use crate::models::{PbwAssessment, PbwForecast, PbwModel, PbwSeverity, PbwStage, Phenophase};

const PUPAE_GDD: f64 = 200.0;
const ADULT_GDD: f64 = 400.0;
const GDD_PER_GENERATION: f64 = 600.0;
const MAX_GENERATION: u8 = 3;
const MODERATE_SEVERITY_GDD: f64 = 300.0;
const HIGH_SEVERITY_GDD: f64 = 600.0;

pub fn pbw_stage(pbw_gdd: f64) -> PbwStage {
    if pbw_gdd < PUPAE_GDD {
        PbwStage::Larvae
    } else if pbw_gdd < ADULT_GDD {
        PbwStage::Pupae
    } else {
        PbwStage::Adult
    }
}

pub fn pbw_generation(pbw_gdd: f64) -> u8 {
    let completed = (pbw_gdd.max(0.0) / GDD_PER_GENERATION).floor();
    if completed >= (MAX_GENERATION - 1) as f64 {
        MAX_GENERATION
    } else {
        completed as u8 + 1
    }
}

pub fn baseline_severity(pbw_gdd: f64) -> PbwSeverity {
    if pbw_gdd < MODERATE_SEVERITY_GDD {
        PbwSeverity::Low
    } else if pbw_gdd < HIGH_SEVERITY_GDD {
        PbwSeverity::Moderate
    } else {
        PbwSeverity::High
    }
}

/// Forecast for one day. `day` is `None` when there is no weather row, which
/// leaves the risk at 0%.
pub fn forecast_pbw(
    model: &PbwModel,
    pbw_gdd: f64,
    phenophase: Phenophase,
    day: Option<&DayConditions<'_>>,
) -> PbwForecast {
    if !model.is_active_in(phenophase) {
        return PbwForecast::NotActive;
    }

    let risk = day
        .map(|d| risk_percentage(&model.conditions, d))
        .unwrap_or(0.0);

    let severity = if risk >= model.escalation_threshold {
        PbwSeverity::High
    } else {
        baseline_severity(pbw_gdd)
    };

    let recommendations = if risk >= model.alert_threshold {
        model.advisory.clone()
    } else {
        model.quiet_advisory.clone()
    };

    PbwForecast::Active(PbwAssessment {
        stage: pbw_stage(pbw_gdd),
        generation: pbw_generation(pbw_gdd),
        severity,
        risk_percentage: risk,
        recommendations,
    })
}
