//! Scoreline model and league rating fit
//!
//! The engine turns a pair of scoring rates into a distribution over final
//! scorelines; competitors fit their attack and defence against that
//! distribution one coordinate at a time; the league repeats those fits
//! until the joint likelihood settles.

pub mod competitor;
pub mod convergence;
pub mod engine;
pub mod grouping;
pub mod league;
pub mod search;

// Re-export commonly used types
pub use competitor::{match_probability, Competitor};
pub use convergence::{ConvergenceCriterion, RelativeLikelihoodChange};
pub use engine::{scoring_rate, Flow, ScorelineEngine};
pub use grouping::Grouping;
pub use league::League;
pub use search::{bracket_search, BracketSearchConfig, BracketSearchOutcome};
