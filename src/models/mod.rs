pub mod field;
pub mod phenology;
pub mod report;
pub mod risk;
pub mod weather;

pub use field::*;
pub use phenology::*;
pub use report::*;
pub use risk::*;
pub use weather::*;
