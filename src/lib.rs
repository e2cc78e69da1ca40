//! League Predictor - scoreline forecasting for capped-margin leagues
//!
//! This crate fits per-competitor attack and defence rates to recorded match
//! results and predicts scoreline distributions for future fixtures, using a
//! continuous-time scoring model in which a match ends early once the score
//! margin reaches the cap.

pub mod config;
pub mod console;
pub mod error;
pub mod rating;
pub mod types;

// Re-export commonly used types and traits
pub use error::{PredictorError, Result};
pub use types::*;

// Re-export key components
pub use rating::{Competitor, League, ScorelineEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
