pub mod analysis;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod llm;
pub mod scoring;
pub mod similarity;
pub mod store;
pub mod user;

pub use analysis::{Analysis, FanoutEvent, FanoutReport, MatchEngine, MatchStatus};
pub use config::MatchConfig;
pub use error::{LlmError, MatchError};
pub use llm::{CategoryScores, NarrativeModel, NarrativeReport};
pub use scoring::{score, CompatibilityScore, FactorWeights, ScoreBreakdown};
pub use store::{pair_key, AnalysisStore};
pub use user::{User, UserProfile, UserStore};
