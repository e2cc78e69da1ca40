//! Competitors and their single-coordinate rate fits
//!
//! A competitor owns its half of every match it played and refers to
//! opponents by id only. Opponent rates are passed in as a slice indexed by
//! [`crate::types::CompetitorId`], so fitting one competitor never needs mutable access to
//! any other.

use serde::{Deserialize, Serialize};

use super::engine::{scoring_rate, ScorelineEngine};
use super::search::{bracket_search, BracketSearchConfig};
use crate::config::{FitConfig, ModelConfig};
use crate::types::{MatchResult, Prediction, Rates, Scoreline, Truncation};

/// A named competitor with fitted rates and its match history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    name: String,
    rates: Rates,
    matches: Vec<MatchResult>,
}

impl PartialEq for Competitor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Competitor {}

impl std::hash::Hash for Competitor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for Competitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Probability of the exact scoreline `score`-`opponent_score` between two rate sets
pub fn match_probability(
    own: Rates,
    opponent: Rates,
    score: u32,
    opponent_score: u32,
    model: &ModelConfig,
) -> f64 {
    // Outside the cap the model gives the scoreline no mass at all
    if score.abs_diff(opponent_score) > model.score_cap {
        return 0.0;
    }

    let own_rate = scoring_rate(own.attack, opponent.defence, model.max_scoring_rate);
    let opponent_rate = scoring_rate(opponent.attack, own.defence, model.max_scoring_rate);

    ScorelineEngine::from_model(own_rate, opponent_rate, model).probability(score, opponent_score)
}

impl Competitor {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_rates(name, Rates::default())
    }

    pub fn with_rates(name: impl Into<String>, rates: Rates) -> Self {
        Self {
            name: name.into(),
            rates,
            matches: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rates(&self) -> Rates {
        self.rates
    }

    pub fn attack(&self) -> f64 {
        self.rates.attack
    }

    pub fn defence(&self) -> f64 {
        self.rates.defence
    }

    pub fn set_rates(&mut self, rates: Rates) {
        self.rates = rates;
    }

    /// Recorded matches in the order they were added
    pub fn matches(&self) -> &[MatchResult] {
        &self.matches
    }

    pub fn record(&mut self, result: MatchResult) {
        self.matches.push(result);
    }

    /// Natural log of [`Self::probability_of_results`].
    ///
    /// `opponents` is indexed by opponent id; an opponent missing from the
    /// slice is scored at the neutral prior rates.
    pub fn log_likelihood(&self, opponents: &[Rates], model: &ModelConfig) -> f64 {
        self.log_likelihood_with(self.rates, opponents, model)
    }

    /// Joint probability of every recorded scoreline under the current rates;
    /// exactly 1 for a competitor with no matches
    pub fn probability_of_results(&self, opponents: &[Rates], model: &ModelConfig) -> f64 {
        self.log_likelihood(opponents, model).exp()
    }

    fn log_likelihood_with(&self, rates: Rates, opponents: &[Rates], model: &ModelConfig) -> f64 {
        self.matches
            .iter()
            .map(|result| {
                let opponent = opponents.get(result.opponent).copied().unwrap_or_default();
                match_probability(rates, opponent, result.score, result.opponent_score, model).ln()
            })
            .sum()
    }

    /// Fit attack over `[0, 1]` holding defence fixed; returns the new log-likelihood
    pub fn fit_attack(&mut self, opponents: &[Rates], model: &ModelConfig, fit: &FitConfig) -> f64 {
        let base = self.rates;
        let outcome = bracket_search(&BracketSearchConfig::unit_interval(fit), |attack| {
            self.log_likelihood_with(Rates { attack, ..base }, opponents, model)
        });

        self.rates.attack = outcome.optimal_value;
        outcome.optimal_score
    }

    /// Fit defence over `[0, 1]` holding attack fixed; returns the new log-likelihood
    pub fn fit_defence(&mut self, opponents: &[Rates], model: &ModelConfig, fit: &FitConfig) -> f64 {
        let base = self.rates;
        let outcome = bracket_search(&BracketSearchConfig::unit_interval(fit), |defence| {
            self.log_likelihood_with(Rates { defence, ..base }, opponents, model)
        });

        self.rates.defence = outcome.optimal_value;
        outcome.optimal_score
    }

    /// Attack fit followed by a defence fit that uses the fresh attack.
    ///
    /// A competitor without matches has a flat likelihood and keeps its rates.
    /// Returns the log-likelihood after both fits.
    pub fn determine_attack_and_defence(
        &mut self,
        opponents: &[Rates],
        model: &ModelConfig,
        fit: &FitConfig,
    ) -> f64 {
        if self.matches.is_empty() {
            return 0.0;
        }

        self.fit_attack(opponents, model, fit);
        self.fit_defence(opponents, model, fit)
    }

    /// Scoreline distribution against `other` under both sides' current rates.
    ///
    /// Win/draw/loss shares are taken over every enumerated scoreline before
    /// the outcome list is truncated.
    pub fn predict_against(
        &self,
        other: &Competitor,
        model: &ModelConfig,
        truncation: Truncation,
    ) -> Prediction {
        let own_rate = scoring_rate(self.attack(), other.defence(), model.max_scoring_rate);
        let other_rate = scoring_rate(other.attack(), self.defence(), model.max_scoring_rate);

        let outcomes = ScorelineEngine::from_model(own_rate, other_rate, model).top_outcomes();

        let win = share(&outcomes, |s| s.score > s.opponent_score);
        let loss = share(&outcomes, |s| s.score < s.opponent_score);
        let draw = share(&outcomes, |s| s.score == s.opponent_score);

        Prediction {
            competitor: self.name.clone(),
            opponent: other.name.clone(),
            score_cap: model.score_cap,
            outcomes: truncate(outcomes, truncation),
            win,
            draw,
            loss,
        }
    }
}

/// Fraction of the enumerated mass on scorelines matching `keep`
fn share(outcomes: &[Scoreline], keep: impl Fn(&Scoreline) -> bool) -> f64 {
    let total: f64 = outcomes.iter().map(|s| s.probability).sum();
    if total <= 0.0 {
        return 0.0;
    }

    outcomes
        .iter()
        .filter(|s| keep(*s))
        .map(|s| s.probability)
        .sum::<f64>()
        / total
}

fn truncate(outcomes: Vec<Scoreline>, truncation: Truncation) -> Vec<Scoreline> {
    match truncation {
        Truncation::TopN(count) => outcomes.into_iter().take(count).collect(),
        Truncation::MinProbability(threshold) => outcomes
            .into_iter()
            .take_while(|s| s.probability >= threshold)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ModelConfig {
        ModelConfig::default()
    }

    #[test]
    fn test_equality_is_by_name() {
        let a = Competitor::with_rates("Alpha", Rates::new(0.9, 0.1));
        let b = Competitor::new("Alpha");
        assert_eq!(a, b);
        assert_ne!(a, Competitor::new("Beta"));
    }

    #[test]
    fn test_no_matches_gives_certain_results() {
        let competitor = Competitor::new("Loner");
        assert_eq!(competitor.probability_of_results(&[], &model()), 1.0);
        assert_eq!(competitor.log_likelihood(&[], &model()), 0.0);
    }

    #[test]
    fn test_empty_history_keeps_prior_rates() {
        let mut competitor = Competitor::new("Loner");
        let log = competitor.determine_attack_and_defence(&[], &model(), &FitConfig::default());

        assert_eq!(log, 0.0);
        assert_eq!(competitor.rates(), Rates::default());
    }

    #[test]
    fn test_missing_opponent_uses_neutral_prior() {
        let mut competitor = Competitor::new("Alpha");
        competitor.record(MatchResult::new(3, 2, 1));

        let short = competitor.log_likelihood(&[], &model());
        let explicit = competitor.log_likelihood(&[Rates::default(); 4], &model());

        assert!(short.is_finite());
        assert_eq!(short, explicit);
    }

    #[test]
    fn test_scoreline_beyond_cap_is_impossible() {
        let p = match_probability(Rates::default(), Rates::default(), 7, 0, &model());
        assert_eq!(p, 0.0);
    }

    #[test]
    fn test_zero_attack_never_scores() {
        let own = Rates::new(0.0, 0.5);
        let opponent = Rates::default();

        assert_eq!(match_probability(own, opponent, 1, 0, &model()), 0.0);
        assert!(match_probability(own, opponent, 0, 1, &model()) > 0.0);
    }

    #[test]
    fn test_fit_attack_rewards_high_scoring() {
        // Opponent rates indexed by id; this competitor is id 0
        let opponents = vec![Rates::default(), Rates::default()];
        let mut competitor = Competitor::new("Alpha");
        competitor.record(MatchResult::new(1, 3, 0));

        let before = competitor.log_likelihood(&opponents, &model());
        let after = competitor.fit_attack(&opponents, &model(), &FitConfig::default());

        assert!(after >= before);
        assert!(competitor.attack() > 0.5);
    }

    #[test]
    fn test_fit_defence_rewards_clean_sheets() {
        let opponents = vec![Rates::default(), Rates::default()];
        let mut competitor = Competitor::new("Alpha");
        competitor.record(MatchResult::new(1, 1, 0));
        competitor.record(MatchResult::new(1, 2, 0));

        competitor.fit_defence(&opponents, &model(), &FitConfig::default());
        assert!(competitor.defence() > 0.5);
    }

    #[test]
    fn test_prediction_shares_and_truncation() {
        let strong = Competitor::with_rates("Strong", Rates::new(0.9, 0.6));
        let weak = Competitor::with_rates("Weak", Rates::new(0.3, 0.4));

        let prediction = strong.predict_against(&weak, &model(), Truncation::TopN(5));

        assert_eq!(prediction.outcomes.len(), 5);
        assert!((prediction.win + prediction.draw + prediction.loss - 1.0).abs() < 1e-9);
        assert!(prediction.win > prediction.loss);

        let thresholded =
            strong.predict_against(&weak, &model(), Truncation::MinProbability(0.001));
        assert!(thresholded
            .outcomes
            .iter()
            .all(|s| s.probability >= 0.001));
        assert!(thresholded.outcomes.len() > 5);
    }
}
