use super::phenology::Phenophase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    Insect,
    Disease,
}

impl RiskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskKind::Insect => "Insect",
            RiskKind::Disease => "Disease",
        }
    }
}

impl std::fmt::Display for RiskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weather quantity a risk condition is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherParameter {
    TempMax,
    TempMin,
    Humidity,
    SunshineHours,
    RainProbability,
    CloudCover,
    Precipitation,
    /// Days with measurable rain from the first of the month through the
    /// evaluated day.
    RainyDays,
}

impl WeatherParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherParameter::TempMax => "temp_max",
            WeatherParameter::TempMin => "temp_min",
            WeatherParameter::Humidity => "humidity",
            WeatherParameter::SunshineHours => "sunshine_hours",
            WeatherParameter::RainProbability => "rain_probability",
            WeatherParameter::CloudCover => "cloud_cover",
            WeatherParameter::Precipitation => "precipitation",
            WeatherParameter::RainyDays => "rainy_days",
        }
    }
}

impl std::fmt::Display for WeatherParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConditionTest {
    /// Closed range `[min, max]`.
    #[serde(rename = "range")]
    Range([f64; 2]),
    /// Count-style test: passes when the value is at least this much.
    #[serde(rename = "value")]
    AtLeast(f64),
}

impl ConditionTest {
    pub fn passes(&self, value: f64) -> bool {
        match *self {
            ConditionTest::Range([min, max]) => (min..=max).contains(&value),
            ConditionTest::AtLeast(min) => value >= min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCondition {
    pub parameter: WeatherParameter,
    #[serde(flatten)]
    pub test: ConditionTest,
    pub weight: f64,
}

impl RiskCondition {
    pub fn range(parameter: WeatherParameter, min: f64, max: f64, weight: f64) -> Self {
        Self {
            parameter,
            test: ConditionTest::Range([min, max]),
            weight,
        }
    }

    pub fn at_least(parameter: WeatherParameter, value: f64, weight: f64) -> Self {
        Self {
            parameter,
            test: ConditionTest::AtLeast(value),
            weight,
        }
    }
}

/// Weighted weather rule for one insect or disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRule {
    pub name: String,
    pub phenophases: Vec<Phenophase>,
    pub conditions: Vec<RiskCondition>,
    /// Minimum risk percentage for the rule to raise an alert on its own.
    pub threshold: f64,
    pub advisory: Vec<String>,
}

impl RiskRule {
    pub fn applies_to(&self, phenophase: Phenophase) -> bool {
        self.phenophases.contains(&phenophase)
    }
}

/// Pink bollworm model parameters. Stage, generation and base severity
/// come from the PBW GDD clock; the weather conditions only drive the risk
/// percentage and the escalation to high severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PbwModel {
    pub name: String,
    pub active_phenophases: Vec<Phenophase>,
    pub conditions: Vec<RiskCondition>,
    pub alert_threshold: f64,
    pub escalation_threshold: f64,
    pub advisory: Vec<String>,
    pub quiet_advisory: Vec<String>,
}

impl PbwModel {
    pub fn is_active_in(&self, phenophase: Phenophase) -> bool {
        self.active_phenophases.contains(&phenophase)
    }
}

/// A rule whose weather score reached its threshold on the evaluated day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAlert {
    pub name: String,
    pub kind: RiskKind,
    pub risk_percentage: f64,
    pub advisory: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PbwStage {
    Larvae,
    Pupae,
    Adult,
}

impl PbwStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PbwStage::Larvae => "Larvae",
            PbwStage::Pupae => "Pupae",
            PbwStage::Adult => "Adult",
        }
    }
}

impl std::fmt::Display for PbwStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PbwSeverity {
    Low,
    Moderate,
    High,
}

impl PbwSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            PbwSeverity::Low => "Low",
            PbwSeverity::Moderate => "Moderate",
            PbwSeverity::High => "High",
        }
    }
}

impl std::fmt::Display for PbwSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PbwAssessment {
    pub stage: PbwStage,
    pub generation: u8,
    pub severity: PbwSeverity,
    pub risk_percentage: f64,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PbwForecast {
    /// Crop is outside the boll-bearing stages; nothing to do.
    NotActive,
    Active(PbwAssessment),
}

impl PbwForecast {
    pub fn risk_percentage(&self) -> f64 {
        match self {
            PbwForecast::NotActive => 0.0,
            PbwForecast::Active(a) => a.risk_percentage,
        }
    }

    pub fn recommendations(&self) -> Vec<String> {
        match self {
            PbwForecast::NotActive => vec!["No action required.".to_string()],
            PbwForecast::Active(a) => a.recommendations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_test_is_closed() {
        let test = ConditionTest::Range([25.0, 35.0]);
        assert!(test.passes(25.0));
        assert!(test.passes(35.0));
        assert!(!test.passes(24.9));
        assert!(!test.passes(35.1));
    }

    #[test]
    fn at_least_test() {
        let test = ConditionTest::AtLeast(5.0);
        assert!(test.passes(5.0));
        assert!(test.passes(9.0));
        assert!(!test.passes(4.0));
    }

    #[test]
    fn condition_yaml_accepts_range_or_value() {
        let yaml = r#"
- parameter: temp_max
  range: [25, 32]
  weight: 0.4
- parameter: rainy_days
  value: 5
  weight: 0.3
"#;
        let conditions: Vec<RiskCondition> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            conditions[0],
            RiskCondition::range(WeatherParameter::TempMax, 25.0, 32.0, 0.4)
        );
        assert_eq!(
            conditions[1],
            RiskCondition::at_least(WeatherParameter::RainyDays, 5.0, 0.3)
        );
    }

    #[test]
    fn not_active_pbw_has_no_risk() {
        assert_eq!(PbwForecast::NotActive.risk_percentage(), 0.0);
        assert_eq!(
            PbwForecast::NotActive.recommendations(),
            vec!["No action required.".to_string()]
        );
    }

    #[test]
    fn severity_ordering() {
        assert!(PbwSeverity::High > PbwSeverity::Moderate);
        assert!(PbwSeverity::Moderate > PbwSeverity::Low);
    }
}
