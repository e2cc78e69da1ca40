//! Single-parameter bracket search
//!
//! Samples `sections + 1` equally spaced candidates across the current
//! bracket, keeps the best one and narrows the bracket to its neighbours.
//! This is a local hill-climb: it finds the global maximum only when the
//! objective is unimodal over the bracket, which holds in practice for the
//! scoreline likelihood but is not guaranteed.

use crate::config::FitConfig;

/// Bracket and stopping rule for [`bracket_search`]
#[derive(Debug, Clone)]
pub struct BracketSearchConfig {
    pub low: f64,
    pub high: f64,
    pub sections: usize,
    /// Stop once `high - low` is at most this
    pub tolerance: f64,
}

impl Default for BracketSearchConfig {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
            sections: 4,
            tolerance: 1e-6,
        }
    }
}

impl BracketSearchConfig {
    /// Search over `[0, 1]` with the fitter's tolerance and section count
    pub fn unit_interval(fit: &FitConfig) -> Self {
        Self {
            low: 0.0,
            high: 1.0,
            sections: fit.search_sections,
            tolerance: fit.search_tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketSearchOutcome {
    pub optimal_value: f64,
    pub optimal_score: f64,
    pub iterations: usize,
}

/// Maximise `objective` over the configured bracket.
///
/// Candidates are compared with a strict `>` starting from negative infinity,
/// so ties and NaN scores resolve to the lowest candidate index.
pub fn bracket_search(
    config: &BracketSearchConfig,
    mut objective: impl FnMut(f64) -> f64,
) -> BracketSearchOutcome {
    let sections = config.sections.max(2);
    let mut low = config.low;
    let mut high = config.high;
    let mut candidates = vec![0.0; sections + 1];
    let mut iterations = 0;
    let mut best_value = None;

    while high - low > config.tolerance {
        iterations += 1;

        let mut best = 0;
        let mut max = f64::NEG_INFINITY;
        for (index, candidate) in candidates.iter_mut().enumerate() {
            *candidate = (high * index as f64 + low * (sections - index) as f64) / sections as f64;
            let score = objective(*candidate);
            if score > max {
                best = index;
                max = score;
            }
        }

        best_value = Some((candidates[best], max));

        if best == 0 {
            high = candidates[1];
        } else if best == sections {
            low = candidates[sections - 1];
        } else {
            low = candidates[best - 1];
            high = candidates[best + 1];
        }
    }

    let (optimal_value, optimal_score) = match best_value {
        Some(found) => found,
        None => {
            let midpoint = (low + high) / 2.0;
            (midpoint, objective(midpoint))
        }
    };

    BracketSearchOutcome {
        optimal_value,
        optimal_score,
        iterations,
    }
}
