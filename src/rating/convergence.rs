//! Stopping rule for the league fitting loop

/// Decides whether two consecutive rounds are close enough to stop.
///
/// Both arguments are joint log-likelihoods; `previous` is negative infinity
/// before the first round has completed.
#[cfg_attr(test, mockall::automock)]
pub trait ConvergenceCriterion {
    fn has_converged(&self, previous: f64, current: f64) -> bool;
}

/// Converged once the joint likelihood's relative change drops below `tolerance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeLikelihoodChange {
    pub tolerance: f64,
}

impl RelativeLikelihoodChange {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }
}

impl ConvergenceCriterion for RelativeLikelihoodChange {
    fn has_converged(&self, previous: f64, current: f64) -> bool {
        // (L - L_prev) / L on the product scale, computed from the logs
        let change = 1.0 - (previous - current).exp();
        change < self.tolerance
    }
}
