//! Scoreline model configuration

use serde::{Deserialize, Serialize};

/// Parameters of the capped-score Markov model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Maximum score differential before a match is forced to end
    pub score_cap: u32,
    /// Time slices used to integrate one match
    pub time_steps: usize,
    /// Highest score per side enumerated when listing outcomes
    pub max_tracked_score: u32,
    /// Upper clamp for a single side's scoring rate
    pub max_scoring_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            score_cap: 5,
            time_steps: 50,
            max_tracked_score: 99,
            max_scoring_rate: 50.0,
        }
    }
}

impl ModelConfig {
    /// Same model with a different score cap
    pub fn with_score_cap(&self, score_cap: u32) -> Self {
        Self {
            score_cap,
            ..self.clone()
        }
    }
}
