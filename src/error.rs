//! Error types for the league predictor
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific league scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictorError {
    #[error("No data found for competitor: {name}")]
    UnknownCompetitor { name: String },

    #[error("Invalid score pair {score_a}-{score_b} for score cap {limit}")]
    InvalidScorePair { score_a: u32, score_b: u32, limit: u32 },

    #[error("Competitor cannot play itself: {name}")]
    SelfMatch { name: String },

    #[error("Invalid scoring rate: {rate}")]
    InvalidRate { rate: f64 },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}
