//! League fitting configuration

use serde::{Deserialize, Serialize};

use crate::types::NEUTRAL_RATE;

/// Coordinate-ascent fitting parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub initial_attack: f64,
    pub initial_defence: f64,
    /// Hard cap on fitting rounds
    pub max_rounds: usize,
    /// Relative change of the joint likelihood that counts as converged
    pub convergence_tolerance: f64,
    /// Bracket width at which a single-parameter search stops
    pub search_tolerance: f64,
    /// Bracket sections per narrowing step (candidates = sections + 1)
    pub search_sections: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            initial_attack: NEUTRAL_RATE,
            initial_defence: NEUTRAL_RATE,
            max_rounds: 1000,
            convergence_tolerance: 1e-6,
            search_tolerance: 1e-6,
            search_sections: 4,
        }
    }
}
