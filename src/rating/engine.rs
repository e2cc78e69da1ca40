//! Scoreline probability engine
//!
//! Models a match as two independent Poisson scoring processes racing over
//! one unit of time, where the match ends as soon as the score difference
//! reaches the cap. Every reachable score pair is a state holding its
//! probability over discretised time; states are integrated with a
//! trapezoidal (Crank-Nicolson) step from the states that feed them.
//!
//! A state's entrances always have a coordinate sum one lower than the state
//! itself, so states are resolved layer by layer in increasing `a + b` and
//! stored in an arena indexed by sum, then by offset within the sum.

use tracing::trace;

use crate::config::ModelConfig;
use crate::error::PredictorError;
use crate::types::Scoreline;

/// Time slices per match unless configured otherwise
pub const DEFAULT_TIME_STEPS: usize = 50;

/// Highest per-side score enumerated by [`ScorelineEngine::top_outcomes`] by default
pub const DEFAULT_MAX_TRACKED_SCORE: u32 = 99;

/// Scoring rate of a side with `attack` against an opponent with `opponent_defence`
///
/// Zero attack never scores; zero defence concedes at `max_rate`.
pub fn scoring_rate(attack: f64, opponent_defence: f64, max_rate: f64) -> f64 {
    if attack.is_nan() || attack <= 0.0 {
        return 0.0;
    }
    if opponent_defence.is_nan() || opponent_defence <= 0.0 {
        return max_rate;
    }
    (attack / opponent_defence).min(max_rate)
}

/// How probability mass moves into and out of one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
    /// The match is still running here, so mass leaves at the combined rate
    pub decays: bool,
    /// Fed by side A scoring from `(a - 1, b)`
    pub from_a: bool,
    /// Fed by side B scoring from `(a, b - 1)`
    pub from_b: bool,
}

impl Flow {
    /// Classify `(a, b)` under the given cap.
    ///
    /// `(0, 0)` decays with no entrances, zero-score boundaries are fed only
    /// by the side that has scored, a state at the cap is terminal and fed
    /// only by the entrance that reached it, and a state one short of the cap
    /// is fed only by its live entrance.
    pub fn of(a: u32, b: u32, limit: u32) -> Self {
        let running = |a: u32, b: u32| a.abs_diff(b) < limit;

        Self {
            decays: running(a, b),
            from_a: a > 0 && running(a - 1, b),
            from_b: b > 0 && running(a, b - 1),
        }
    }
}

#[derive(Debug)]
struct Layer {
    /// Lowest side-A score present in this layer
    first: u32,
    /// Row-major time series, `time_steps + 1` samples per state
    samples: Vec<f64>,
}

/// Exact scoreline distribution for two scoring rates under a difference cap
#[derive(Debug)]
pub struct ScorelineEngine {
    rate_a: f64,
    rate_b: f64,
    limit: u32,
    time_steps: usize,
    max_tracked_score: u32,
    layers: Vec<Layer>,
}

impl ScorelineEngine {
    /// Create an engine, rejecting a zero cap and rates that are negative,
    /// non-finite or too fast for [`DEFAULT_TIME_STEPS`]
    pub fn new(rate_a: f64, rate_b: f64, limit: u32) -> crate::error::Result<Self> {
        for rate in [rate_a, rate_b] {
            if !rate.is_finite() || rate < 0.0 || rate > stable_rate_limit(DEFAULT_TIME_STEPS) {
                return Err(PredictorError::InvalidRate { rate }.into());
            }
        }
        if limit == 0 {
            return Err(PredictorError::ConfigurationError {
                message: "Score cap must be at least 1".to_string(),
            }
            .into());
        }

        Ok(Self::build(
            rate_a,
            rate_b,
            limit,
            DEFAULT_TIME_STEPS,
            DEFAULT_MAX_TRACKED_SCORE,
        ))
    }

    /// Create an engine from model settings; rates are clamped into
    /// `[0, max_scoring_rate]`, and never above what the step size can
    /// integrate, so construction cannot fail
    pub fn from_model(rate_a: f64, rate_b: f64, model: &ModelConfig) -> Self {
        let time_steps = model.time_steps.max(1);
        let ceiling = model.max_scoring_rate.min(stable_rate_limit(time_steps));
        let clamp = |rate: f64| {
            if rate.is_nan() {
                0.0
            } else {
                rate.clamp(0.0, ceiling)
            }
        };

        Self::build(
            clamp(rate_a),
            clamp(rate_b),
            model.score_cap.max(1),
            time_steps,
            model.max_tracked_score,
        )
    }

    fn build(rate_a: f64, rate_b: f64, limit: u32, time_steps: usize, max_score: u32) -> Self {
        Self {
            rate_a,
            rate_b,
            limit,
            time_steps,
            max_tracked_score: max_score,
            layers: Vec::new(),
        }
    }

    /// Override the number of integration steps; raised if needed so that
    /// neither rate outruns a single step
    pub fn with_time_steps(mut self, time_steps: usize) -> Self {
        let required = self.rate_a.max(self.rate_b).ceil() as usize;
        self.time_steps = time_steps.max(required).max(1);
        self.layers.clear();
        self
    }

    /// Override the per-side score range used by [`Self::top_outcomes`]
    pub fn with_max_tracked_score(mut self, max_score: u32) -> Self {
        self.max_tracked_score = max_score;
        self
    }

    pub fn rates(&self) -> (f64, f64) {
        (self.rate_a, self.rate_b)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn time_steps(&self) -> usize {
        self.time_steps
    }

    /// Whether `(a, b)` is a score pair this engine can be asked about
    pub fn is_valid(&self, a: u32, b: u32) -> bool {
        a.abs_diff(b) <= self.limit
    }

    /// Probability that the match ends at exactly `a`-`b`.
    ///
    /// # Panics
    /// If `|a - b|` exceeds the cap; callers must only ask for valid pairs.
    pub fn probability(&mut self, a: u32, b: u32) -> f64 {
        self.probability_at(a, b, self.time_steps)
    }

    /// Probability of being at `a`-`b` after `step` of the time slices
    ///
    /// # Panics
    /// If the pair is invalid or `step` exceeds the configured time steps.
    pub fn probability_at(&mut self, a: u32, b: u32, step: usize) -> f64 {
        assert!(
            self.is_valid(a, b),
            "{}",
            PredictorError::InvalidScorePair {
                score_a: a,
                score_b: b,
                limit: self.limit,
            }
        );
        assert!(step <= self.time_steps, "time step {step} out of range");

        self.resolve_through(a + b);
        sanitize(self.series(a, b)[step])
    }

    /// Every valid scoreline with both scores up to the tracked maximum,
    /// most likely first; ties are ordered by ascending `(a, b)`
    pub fn top_outcomes(&mut self) -> Vec<Scoreline> {
        let max_score = self.max_tracked_score;
        self.resolve_through(2 * max_score);

        let mut outcomes = Vec::new();
        for a in 0..=max_score {
            for b in 0..=max_score {
                if self.is_valid(a, b) {
                    outcomes.push(Scoreline {
                        score: a,
                        opponent_score: b,
                        probability: sanitize(self.series(a, b)[self.time_steps]),
                    });
                }
            }
        }

        outcomes.sort_by(|x, y| {
            y.probability
                .total_cmp(&x.probability)
                .then_with(|| (x.score, x.opponent_score).cmp(&(y.score, y.opponent_score)))
        });
        outcomes
    }

    fn lowest_a(&self, sum: u32) -> u32 {
        if sum > self.limit {
            (sum - self.limit + 1) / 2
        } else {
            0
        }
    }

    fn highest_a(&self, sum: u32) -> u32 {
        sum.min((sum + self.limit) / 2)
    }

    fn series(&self, a: u32, b: u32) -> &[f64] {
        let layer = &self.layers[(a + b) as usize];
        let width = self.time_steps + 1;
        let offset = (a - layer.first) as usize * width;
        &layer.samples[offset..offset + width]
    }

    fn resolve_through(&mut self, sum: u32) {
        while self.layers.len() <= sum as usize {
            let layer = self.resolve_layer(self.layers.len() as u32);
            self.layers.push(layer);
        }
    }

    /// Integrate every state with coordinate sum `sum`; all entrances live in
    /// layer `sum - 1`, which must already be resolved
    fn resolve_layer(&self, sum: u32) -> Layer {
        debug_assert_eq!(self.layers.len(), sum as usize);

        let first = self.lowest_a(sum);
        let last = self.highest_a(sum);
        let width = self.time_steps + 1;
        let mut samples = vec![0.0; (last - first + 1) as usize * width];

        let dt = 1.0 / self.time_steps as f64;
        let half_decay = dt * (self.rate_a + self.rate_b) / 2.0;

        for a in first..=last {
            let b = sum - a;
            let flow = Flow::of(a, b, self.limit);
            let row = (a - first) as usize * width;

            let entrance_a = flow.from_a.then(|| self.series(a - 1, b));
            let entrance_b = flow.from_b.then(|| self.series(a, b - 1));

            samples[row] = if sum == 0 { 1.0 } else { 0.0 };

            for i in 1..width {
                let mut p = samples[row + i - 1];

                if flow.decays {
                    p *= 1.0 - half_decay;
                }
                if let Some(prev) = entrance_a {
                    p += dt * self.rate_a * (prev[i] + prev[i - 1]) / 2.0;
                }
                if let Some(prev) = entrance_b {
                    p += dt * self.rate_b * (prev[i] + prev[i - 1]) / 2.0;
                }
                if flow.decays {
                    p /= 1.0 + half_decay;
                }

                samples[row + i] = p;
            }
        }

        trace!(sum, states = last - first + 1, "resolved scoreline layer");

        Layer { first, samples }
    }
}

/// Fastest per-side rate whose decay factor `1 - dt * (a + b) / 2` stays
/// non-negative with `time_steps` slices
pub fn stable_rate_limit(time_steps: usize) -> f64 {
    time_steps as f64
}

fn sanitize(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_mass(engine: &mut ScorelineEngine) -> f64 {
        engine.top_outcomes().iter().map(|s| s.probability).sum()
    }

    #[test]
    fn test_flow_classification() {
        let limit = 3;

        // Start
        assert_eq!(
            Flow::of(0, 0, limit),
            Flow { decays: true, from_a: false, from_b: false }
        );
        // Zero-score boundaries
        assert_eq!(
            Flow::of(0, 2, limit),
            Flow { decays: true, from_a: false, from_b: true }
        );
        assert_eq!(
            Flow::of(2, 0, limit),
            Flow { decays: true, from_a: true, from_b: false }
        );
        // Terminal margins
        assert_eq!(
            Flow::of(4, 1, limit),
            Flow { decays: false, from_a: true, from_b: false }
        );
        assert_eq!(
            Flow::of(1, 4, limit),
            Flow { decays: false, from_a: false, from_b: true }
        );
        // One short of the cap
        assert_eq!(
            Flow::of(3, 1, limit),
            Flow { decays: true, from_a: true, from_b: false }
        );
        // Interior
        assert_eq!(
            Flow::of(2, 2, limit),
            Flow { decays: true, from_a: true, from_b: true }
        );
    }

    #[test]
    fn test_cap_of_one_has_no_draws_after_kickoff() {
        let mut engine = ScorelineEngine::new(1.0, 1.0, 1).unwrap();

        assert_eq!(engine.probability(1, 1), 0.0);
        assert!(engine.probability(1, 0) > 0.0);
        assert!((total_mass(&mut engine) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_origin_starts_certain_and_decays() {
        let mut engine = ScorelineEngine::new(1.2, 0.8, 5).unwrap();

        assert_eq!(engine.probability_at(0, 0, 0), 1.0);
        let p = engine.probability(0, 0);
        assert!(p < 1.0);
        // Close to the continuous answer exp(-(rate_a + rate_b))
        assert!((p - (-2.0f64).exp()).abs() < 1e-3);
    }

    #[test]
    fn test_zero_rates_stay_goalless() {
        let mut engine = ScorelineEngine::new(0.0, 0.0, 5).unwrap();

        assert_eq!(engine.probability(0, 0), 1.0);
        assert_eq!(engine.probability(1, 0), 0.0);
        assert_eq!(engine.probability(0, 1), 0.0);
    }

    #[test]
    fn test_one_sided_rate_only_moves_one_side() {
        let mut engine = ScorelineEngine::new(0.0, 2.0, 2).unwrap();

        assert_eq!(engine.probability(1, 0), 0.0);
        assert_eq!(engine.probability(1, 1), 0.0);
        assert!(engine.probability(0, 1) > 0.0);
        assert!(engine.probability(0, 2) > engine.probability(0, 1));
        assert!((total_mass(&mut engine) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_mass_sums_to_one() {
        for (rate_a, rate_b, limit) in [(1.0, 1.5, 5), (0.3, 2.0, 2), (2.5, 0.7, 3), (1.0, 1.0, 10)] {
            let mut engine = ScorelineEngine::new(rate_a, rate_b, limit).unwrap();
            let mass = total_mass(&mut engine);
            assert!((mass - 1.0).abs() < 1e-3, "mass {mass} for {rate_a}/{rate_b}/{limit}");
        }
    }

    #[test]
    fn test_top_outcomes_sorted_descending() {
        let mut engine = ScorelineEngine::new(1.5, 1.0, 4).unwrap();
        let outcomes = engine.top_outcomes();

        assert!(outcomes
            .windows(2)
            .all(|pair| pair[0].probability >= pair[1].probability));
        assert!(outcomes
            .iter()
            .all(|s| s.score.abs_diff(s.opponent_score) <= 4));
    }

    #[test]
    fn test_memoised_queries_are_stable() {
        let mut lazy = ScorelineEngine::new(1.3, 0.9, 3).unwrap();
        let first = lazy.probability(2, 1);

        let mut eager = ScorelineEngine::new(1.3, 0.9, 3).unwrap();
        eager.top_outcomes();

        assert_eq!(first, eager.probability(2, 1));
        assert_eq!(first, lazy.probability(2, 1));
    }

    #[test]
    #[should_panic(expected = "Invalid score pair")]
    fn test_pair_beyond_cap_panics() {
        let mut engine = ScorelineEngine::new(1.0, 1.0, 2).unwrap();
        engine.probability(4, 1);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(ScorelineEngine::new(-1.0, 1.0, 3).is_err());
        assert!(ScorelineEngine::new(1.0, f64::NAN, 3).is_err());
        assert!(ScorelineEngine::new(1.0, 1.0, 0).is_err());
        assert!(ScorelineEngine::new(80.0, 1.0, 3).is_err());
    }

    #[test]
    fn test_fast_rates_are_clamped_to_step_size() {
        let model = ModelConfig {
            time_steps: 10,
            max_scoring_rate: 200.0,
            ..ModelConfig::default()
        };
        let mut engine = ScorelineEngine::from_model(150.0, 30.0, &model);

        assert_eq!(engine.rates(), (10.0, 10.0));
        assert!((total_mass(&mut engine) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_steps_never_outrun_rates() {
        let engine = ScorelineEngine::new(12.0, 3.0, 5).unwrap().with_time_steps(4);
        assert_eq!(engine.time_steps(), 12);
    }

    #[test]
    fn test_scoring_rate_guards() {
        assert_eq!(scoring_rate(0.0, 0.0, 50.0), 0.0);
        assert_eq!(scoring_rate(0.5, 0.0, 50.0), 50.0);
        assert_eq!(scoring_rate(1.0, 0.001, 50.0), 50.0);
        assert_eq!(scoring_rate(0.5, 0.25, 50.0), 2.0);
    }
}
