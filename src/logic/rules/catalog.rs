use crate::error::{CottonOpsError, Result};
use crate::models::{
    ConditionTest, PbwModel, Phenophase, RiskCondition, RiskRule, WeatherParameter,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use Phenophase::*;
use WeatherParameter::*;

/// Insect, disease and pink bollworm rule tables.
///
/// The built-in tables are used unless a YAML catalog is configured. A file
/// replaces the whole catalog; there is no merging with the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCatalog {
    pub insects: Vec<RiskRule>,
    pub diseases: Vec<RiskRule>,
    pub pbw: PbwModel,
}

impl RiskCatalog {
    pub fn cotton() -> Self {
        Self {
            insects: vec![aphids(), whitefly()],
            diseases: vec![bacterial_blight(), fusarium_wilt()],
            pbw: pink_bollworm(),
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: RiskCatalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CottonOpsError::Config(format!(
                "Failed to read rule catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Reject tables that would make scoring meaningless.
    pub fn validate(&self) -> Result<()> {
        let all = self
            .insects
            .iter()
            .chain(self.diseases.iter())
            .map(|r| (r.name.as_str(), r.conditions.as_slice()))
            .chain(std::iter::once((
                self.pbw.name.as_str(),
                self.pbw.conditions.as_slice(),
            )));

        for (name, conditions) in all {
            if name.trim().is_empty() {
                return Err(CottonOpsError::InvalidData(
                    "Risk rule with an empty name".into(),
                ));
            }
            for condition in conditions {
                if !(condition.weight > 0.0) {
                    return Err(CottonOpsError::InvalidData(format!(
                        "{}: weight for '{}' must be positive",
                        name, condition.parameter
                    )));
                }
                if let ConditionTest::Range([min, max]) = condition.test {
                    if min > max {
                        return Err(CottonOpsError::InvalidData(format!(
                            "{}: range for '{}' is inverted ({} > {})",
                            name, condition.parameter, min, max
                        )));
                    }
                }
            }
        }

        let mut names: Vec<&str> = self
            .insects
            .iter()
            .chain(self.diseases.iter())
            .map(|r| r.name.as_str())
            .chain(std::iter::once(self.pbw.name.as_str()))
            .collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(CottonOpsError::InvalidData(format!(
                "Duplicate risk rule name '{}'",
                pair[0]
            )));
        }
        Ok(())
    }
}

impl Default for RiskCatalog {
    fn default() -> Self {
        Self::cotton()
    }
}

fn advisory(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

fn aphids() -> RiskRule {
    RiskRule {
        name: "Aphids".into(),
        phenophases: vec![P1, P2, P3],
        conditions: vec![
            RiskCondition::range(TempMax, 25.0, 35.0, 0.4),
            RiskCondition::range(Humidity, 60.0, 80.0, 0.3),
            RiskCondition::range(SunshineHours, 4.0, 8.0, 0.3),
        ],
        threshold: 40.0,
        advisory: advisory(&[
            "Apply neem oil or insecticidal soap.",
            "Introduce natural predators like ladybugs.",
            "Monitor aphid populations weekly.",
        ]),
    }
}

fn whitefly() -> RiskRule {
    RiskRule {
        name: "Whitefly".into(),
        phenophases: vec![P2, P3, P4],
        conditions: vec![
            RiskCondition::range(TempMax, 28.0, 38.0, 0.5),
            RiskCondition::range(Humidity, 50.0, 70.0, 0.3),
            RiskCondition::range(RainProbability, 0.0, 30.0, 0.2),
        ],
        threshold: 40.0,
        advisory: advisory(&[
            "Use yellow sticky traps.",
            "Apply imidacloprid or thiamethoxam.",
            "Remove alternate host plants.",
        ]),
    }
}

fn bacterial_blight() -> RiskRule {
    RiskRule {
        name: "Bacterial Blight".into(),
        phenophases: vec![P2, P3, P4, P5],
        conditions: vec![
            RiskCondition::range(TempMax, 25.0, 35.0, 0.3),
            RiskCondition::range(Humidity, 70.0, 90.0, 0.4),
            RiskCondition::range(RainProbability, 50.0, 100.0, 0.3),
        ],
        threshold: 40.0,
        advisory: advisory(&[
            "Use resistant varieties.",
            "Apply copper-based bactericides.",
            "Remove and destroy infected plant debris.",
        ]),
    }
}

fn fusarium_wilt() -> RiskRule {
    RiskRule {
        name: "Fusarium Wilt".into(),
        phenophases: vec![P3, P4, P5, P6],
        conditions: vec![
            RiskCondition::range(TempMax, 25.0, 32.0, 0.4),
            RiskCondition::range(Humidity, 60.0, 85.0, 0.3),
            RiskCondition::at_least(RainyDays, 5.0, 0.3),
        ],
        threshold: 40.0,
        advisory: advisory(&[
            "Use disease-free seeds.",
            "Apply soil fungicides.",
            "Practice crop rotation.",
        ]),
    }
}

fn pink_bollworm() -> PbwModel {
    PbwModel {
        name: "Pink Boll Worm".into(),
        active_phenophases: vec![P4, P5, P6, P7, P8],
        conditions: vec![
            RiskCondition::range(TempMax, 30.0, 40.0, 0.5),
            RiskCondition::range(Humidity, 60.0, 80.0, 0.3),
            RiskCondition::range(RainProbability, 0.0, 30.0, 0.2),
        ],
        alert_threshold: 40.0,
        escalation_threshold: 60.0,
        advisory: advisory(&[
            "Monitor fields regularly.",
            "Use pheromone traps for PBW.",
            "Apply insecticides if larvae are detected.",
        ]),
        quiet_advisory: advisory(&["Continue regular monitoring."]),
    }
}
