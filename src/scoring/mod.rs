pub mod compat;
pub mod tables;
pub mod weights;

pub use compat::{score, CompatibilityScore, ScoreBreakdown};
pub use weights::FactorWeights;
