pub mod analysis;
pub mod calculations;
pub mod harvest;
pub mod history;
pub mod phenophase;
pub mod rules;
pub mod thresholds;

pub use analysis::{analyze, summarize_grid};
pub use rules::{RiskCatalog, RiskEngine};
pub use thresholds::ThresholdCatalog;
