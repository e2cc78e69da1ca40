//! League of competitors and the global fitting loop
//!
//! The league owns every competitor, a name index and the cluster grouping.
//! Fitting is coordinate ascent: each round refits every competitor in
//! insertion order against a rate snapshot that is refreshed as soon as a
//! competitor moves, until the joint likelihood stops changing or the round
//! cap is reached.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::competitor::Competitor;
use super::convergence::{ConvergenceCriterion, RelativeLikelihoodChange};
use super::grouping::Grouping;
use crate::config::{AppConfig, FitConfig, ModelConfig};
use crate::error::{PredictorError, Result};
use crate::types::{
    Cluster, CompetitorId, FitReport, MatchResult, Prediction, Rates, Standing, Truncation,
};

#[derive(Debug, Clone)]
pub struct League {
    competitors: Vec<Competitor>,
    index: HashMap<String, CompetitorId>,
    grouping: Grouping,
    model: ModelConfig,
    fitting: FitConfig,
    stale: bool,
}

impl Default for League {
    fn default() -> Self {
        Self::new(ModelConfig::default(), FitConfig::default())
    }
}

impl League {
    pub fn new(model: ModelConfig, fitting: FitConfig) -> Self {
        Self {
            competitors: Vec::new(),
            index: HashMap::new(),
            grouping: Grouping::new(),
            model,
            fitting,
            stale: false,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.model.clone(), config.fitting.clone())
    }

    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    pub fn fitting(&self) -> &FitConfig {
        &self.fitting
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// True once a result has been added since the last fit
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Competitors in insertion order; position is the [`CompetitorId`]
    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    pub fn lookup(&self, name: &str) -> Option<&Competitor> {
        self.index.get(name).map(|&id| &self.competitors[id])
    }

    pub fn competitor_id(&self, name: &str) -> Option<CompetitorId> {
        self.index.get(name).copied()
    }

    /// Record a played match, registering either side on first mention.
    ///
    /// Each side keeps its own copy of the result with the scores swapped.
    /// Nothing is recorded when the input is rejected.
    pub fn add_result(
        &mut self,
        name_a: &str,
        score_a: u32,
        name_b: &str,
        score_b: u32,
    ) -> Result<()> {
        if name_a == name_b {
            return Err(PredictorError::SelfMatch {
                name: name_a.to_string(),
            }
            .into());
        }

        if score_a.abs_diff(score_b) > self.model.score_cap {
            return Err(PredictorError::InvalidScorePair {
                score_a,
                score_b,
                limit: self.model.score_cap,
            }
            .into());
        }

        let a = self.register(name_a);
        let b = self.register(name_b);

        let result = MatchResult::new(b, score_a, score_b);
        self.competitors[a].record(result);
        self.competitors[b].record(result.mirrored(a));
        self.grouping.merge_root(a, b);
        self.stale = true;

        debug!("Recorded {}({}) - {}({})", name_a, score_a, name_b, score_b);
        Ok(())
    }

    fn register(&mut self, name: &str) -> CompetitorId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }

        let prior = self.initial_rates();
        let id = self.grouping.add();
        debug_assert_eq!(id, self.competitors.len());
        self.competitors.push(Competitor::with_rates(name, prior));
        self.index.insert(name.to_string(), id);
        id
    }

    fn initial_rates(&self) -> Rates {
        Rates::new(self.fitting.initial_attack, self.fitting.initial_defence)
    }

    /// Current rates of every competitor, indexed by id
    pub fn rates(&self) -> Vec<Rates> {
        self.competitors.iter().map(Competitor::rates).collect()
    }

    /// Connected components of the match graph, ordered by first registration
    pub fn clusters(&mut self) -> Vec<Cluster> {
        self.grouping
            .partition()
            .into_iter()
            .map(|(root, members)| Cluster {
                root: self.competitors[root].name().to_string(),
                members: members
                    .into_iter()
                    .map(|id| self.competitors[id].name().to_string())
                    .collect(),
            })
            .collect()
    }

    /// Sum of every competitor's log-likelihood under the current rates
    pub fn log_likelihood(&self) -> f64 {
        let rates = self.rates();
        self.competitors
            .iter()
            .map(|competitor| competitor.log_likelihood(&rates, &self.model))
            .sum()
    }

    /// Fit every competitor's rates from the neutral prior
    pub fn fit(&mut self) -> FitReport {
        let criterion = RelativeLikelihoodChange::new(self.fitting.convergence_tolerance);
        self.fit_with(&criterion)
    }

    /// Fit with a custom stopping rule.
    ///
    /// Rates are reset first, so repeated fits over the same results are
    /// identical. Hitting the round cap is reported through
    /// [`FitReport::converged`] and leaves the last round's rates in place.
    pub fn fit_with(&mut self, criterion: &dyn ConvergenceCriterion) -> FitReport {
        let prior = self.initial_rates();
        for competitor in &mut self.competitors {
            competitor.set_rates(prior);
        }

        let clusters = self.clusters();
        info!(
            "Fitting {} competitors in {} clusters",
            self.competitors.len(),
            clusters.len()
        );

        let mut rates = self.rates();
        let mut previous = f64::NEG_INFINITY;
        let mut rounds = 0;
        let mut converged = false;

        while rounds < self.fitting.max_rounds {
            rounds += 1;

            let mut current = 0.0;
            for (id, competitor) in self.competitors.iter_mut().enumerate() {
                current +=
                    competitor.determine_attack_and_defence(&rates, &self.model, &self.fitting);
                rates[id] = competitor.rates();
            }

            debug!("Round {}: log-likelihood {:.6}", rounds, current);

            converged = criterion.has_converged(previous, current);
            previous = current;
            if converged {
                break;
            }
        }

        if !converged {
            warn!(
                "Fit stopped at the {} round cap without converging",
                self.fitting.max_rounds
            );
        }

        self.stale = false;
        info!(
            "Fit finished after {} rounds (log-likelihood {:.6})",
            rounds, previous
        );

        FitReport {
            rounds,
            converged,
            log_likelihood: previous,
            clusters,
            fitted_at: Utc::now(),
        }
    }

    /// Predict `name`'s scorelines against `opponent` at the league's cap
    pub fn predict(&self, name: &str, opponent: &str, truncation: Truncation) -> Option<Prediction> {
        self.predict_with_cap(name, opponent, self.model.score_cap, truncation)
    }

    /// Predict under a different score cap, e.g. a first-to-3 format.
    ///
    /// A cap of 0 is treated as 1, and the prediction reports the cap used.
    pub fn predict_with_cap(
        &self,
        name: &str,
        opponent: &str,
        score_cap: u32,
        truncation: Truncation,
    ) -> Option<Prediction> {
        let competitor = self.lookup(name)?;
        let other = self.lookup(opponent)?;
        let model = self.model.with_score_cap(score_cap.max(1));

        Some(competitor.predict_against(other, &model, truncation))
    }

    /// Per-cluster rankings by `attack * defence`, strongest first.
    ///
    /// Scores are log base 2 relative to the weakest finite competitor in the
    /// whole league, so a score of 1 means twice that competitor's strength.
    pub fn standings(&self, clusters: &[Cluster]) -> Vec<Vec<Standing>> {
        let floor = self
            .competitors
            .iter()
            .map(|competitor| competitor.rates().strength().ln())
            .filter(|log| log.is_finite())
            .fold(None, |min: Option<f64>, log| {
                Some(min.map_or(log, |min| min.min(log)))
            })
            .unwrap_or(0.0);

        clusters
            .iter()
            .map(|cluster| {
                let mut standings: Vec<Standing> = cluster
                    .members
                    .iter()
                    .filter_map(|name| self.lookup(name))
                    .map(|competitor| Standing {
                        name: competitor.name().to_string(),
                        attack: competitor.attack(),
                        defence: competitor.defence(),
                        score: (competitor.rates().strength().ln() - floor)
                            / std::f64::consts::LN_2,
                    })
                    .collect();

                standings.sort_by(|a, b| b.score.total_cmp(&a.score));
                standings
            })
            .collect()
    }
}
