use super::{pbw, DayConditions, RiskCatalog, RiskModel};
use crate::models::{
    AnalysisNotice, PbwForecast, Phenophase, RiskAlert, RiskKind, RiskRule, WeatherDay,
    WeatherParameter,
};

pub struct RiskEngine {
    catalog: RiskCatalog,
}

impl RiskEngine {
    pub fn new(catalog: RiskCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RiskCatalog {
        &self.catalog
    }

    /// Insect alerts for one day, each gated by its own rule threshold.
    pub fn evaluate_insects(&self, phenophase: Phenophase, day: &DayConditions<'_>) -> Vec<RiskAlert> {
        evaluate_rules(&self.catalog.insects, RiskKind::Insect, phenophase, day)
    }

    /// Disease alerts for one day, each gated by its own rule threshold.
    pub fn evaluate_diseases(&self, phenophase: Phenophase, day: &DayConditions<'_>) -> Vec<RiskAlert> {
        evaluate_rules(&self.catalog.diseases, RiskKind::Disease, phenophase, day)
    }

    pub fn evaluate_pbw(
        &self,
        pbw_gdd: f64,
        phenophase: Phenophase,
        day: Option<&DayConditions<'_>>,
    ) -> PbwForecast {
        pbw::forecast_pbw(&self.catalog.pbw, pbw_gdd, phenophase, day)
    }

    /// Models taking part in a historical scan of one kind. Pink bollworm
    /// is scanned with the insects.
    pub fn models(&self, kind: RiskKind) -> Vec<&dyn RiskModel> {
        match kind {
            RiskKind::Insect => self
                .catalog
                .insects
                .iter()
                .map(|r| r as &dyn RiskModel)
                .chain(std::iter::once(&self.catalog.pbw as &dyn RiskModel))
                .collect(),
            RiskKind::Disease => self
                .catalog
                .diseases
                .iter()
                .map(|r| r as &dyn RiskModel)
                .collect(),
        }
    }

    /// Generic rules of one kind, without pink bollworm.
    pub fn rules(&self, kind: RiskKind) -> &[RiskRule] {
        match kind {
            RiskKind::Insect => &self.catalog.insects,
            RiskKind::Disease => &self.catalog.diseases,
        }
    }

    /// Parameters referenced by a rule that no day in `days` ever supplied.
    /// Those conditions are dropped from scoring rather than failing the rule.
    pub fn configuration_gaps(&self, days: &[WeatherDay]) -> Vec<AnalysisNotice> {
        let mut gaps = Vec::new();
        let models = self.models(RiskKind::Insect).into_iter().chain(self.models(RiskKind::Disease));
        for model in models {
            let mut seen: Vec<WeatherParameter> = Vec::new();
            for condition in model.conditions() {
                let parameter = condition.parameter;
                if seen.contains(&parameter) || parameter == WeatherParameter::RainyDays {
                    continue;
                }
                seen.push(parameter);
                let supplied = days.iter().any(|d| DayConditions::new(d, 0).value(parameter).is_some());
                if !supplied {
                    gaps.push(AnalysisNotice::ConfigurationGap {
                        rule: model.name().to_string(),
                        parameter,
                    });
                }
            }
        }
        gaps
    }

    pub fn list_rules(&self) -> Vec<(RiskKind, &str)> {
        self.models(RiskKind::Insect)
            .into_iter()
            .map(|m| (RiskKind::Insect, m.name()))
            .chain(
                self.models(RiskKind::Disease)
                    .into_iter()
                    .map(|m| (RiskKind::Disease, m.name())),
            )
            .collect()
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(RiskCatalog::default())
    }
}

fn evaluate_rules(
    rules: &[RiskRule],
    kind: RiskKind,
    phenophase: Phenophase,
    day: &DayConditions<'_>,
) -> Vec<RiskAlert> {
    rules
        .iter()
        .filter_map(|rule| {
            let risk = rule.score(phenophase, day)?;
            (risk >= rule.threshold).then(|| RiskAlert {
                name: rule.name.clone(),
                kind,
                risk_percentage: risk,
                advisory: rule.advisory.clone(),
            })
        })
        .collect()
}
