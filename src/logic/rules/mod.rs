pub mod catalog;
pub mod engine;
pub mod pbw;
pub mod scoring;

pub use catalog::RiskCatalog;
pub use engine::RiskEngine;
pub use scoring::DayConditions;

use crate::models::{PbwModel, Phenophase, RiskCondition, RiskRule};

/// Trait for weather-scored pest and disease models
pub trait RiskModel: Send + Sync {
    /// Name used in alerts and historical summaries
    fn name(&self) -> &str;

    fn conditions(&self) -> &[RiskCondition];

    /// Whether the model is scored at all in this crop stage
    fn applies_to(&self, phenophase: Phenophase) -> bool;

    /// Risk percentage for the day, or `None` when the stage is out of scope
    fn score(&self, phenophase: Phenophase, day: &DayConditions<'_>) -> Option<f64> {
        self.applies_to(phenophase)
            .then(|| scoring::risk_percentage(self.conditions(), day))
    }
}

impl RiskModel for RiskRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn conditions(&self) -> &[RiskCondition] {
        &self.conditions
    }

    fn applies_to(&self, phenophase: Phenophase) -> bool {
        RiskRule::applies_to(self, phenophase)
    }
}

impl RiskModel for PbwModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn conditions(&self) -> &[RiskCondition] {
        &self.conditions
    }

    fn applies_to(&self, phenophase: Phenophase) -> bool {
        self.is_active_in(phenophase)
    }
}
