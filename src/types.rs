//! Common types used throughout the league predictor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a competitor within one league (insertion index)
pub type CompetitorId = usize;

/// Prior used for both rates before a fit
pub const NEUTRAL_RATE: f64 = 0.5;

/// Attack and defence multipliers for a competitor
///
/// A side's scoring rate against an opponent is `attack / opponent.defence`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub attack: f64,
    pub defence: f64,
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            attack: NEUTRAL_RATE,
            defence: NEUTRAL_RATE,
        }
    }
}

impl Rates {
    pub fn new(attack: f64, defence: f64) -> Self {
        Self { attack, defence }
    }

    /// Combined strength used for rankings
    pub fn strength(&self) -> f64 {
        self.attack * self.defence
    }
}

/// One side's record of a played match
///
/// Each match produces two of these, one owned by each participant, with the
/// scores swapped. The opponent is referenced by id only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub opponent: CompetitorId,
    pub score: u32,
    pub opponent_score: u32,
}

impl MatchResult {
    pub fn new(opponent: CompetitorId, score: u32, opponent_score: u32) -> Self {
        Self {
            opponent,
            score,
            opponent_score,
        }
    }

    /// The same match seen from the opponent's side
    pub fn mirrored(&self, owner: CompetitorId) -> Self {
        Self {
            opponent: owner,
            score: self.opponent_score,
            opponent_score: self.score,
        }
    }
}

/// A final score with its modelled probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scoreline {
    pub score: u32,
    pub opponent_score: u32,
    pub probability: f64,
}

impl std::fmt::Display for Scoreline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "P({}, {}) = {:.1}%",
            self.score,
            self.opponent_score,
            self.probability * 100.0
        )
    }
}

/// How a prediction's outcome list is cut down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Truncation {
    /// Keep the `n` most likely scorelines
    TopN(usize),
    /// Keep every scoreline at or above the given probability
    MinProbability(f64),
}

impl Default for Truncation {
    fn default() -> Self {
        Truncation::TopN(5)
    }
}

/// Predicted scorelines between two competitors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub competitor: String,
    pub opponent: String,
    pub score_cap: u32,
    /// Most likely scorelines, self score first, descending probability
    pub outcomes: Vec<Scoreline>,
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

/// A maximal set of competitors connected by recorded matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub root: String,
    pub members: Vec<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }
}

/// Outcome of a league fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    /// Rounds actually run
    pub rounds: usize,
    /// False when the round cap was hit first; rates are then best effort
    pub converged: bool,
    /// Sum over competitors of their log-likelihood after the last round
    pub log_likelihood: f64,
    pub clusters: Vec<Cluster>,
    pub fitted_at: DateTime<Utc>,
}

/// One competitor's line in a cluster ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub attack: f64,
    pub defence: f64,
    /// `log2(attack * defence)` relative to the weakest finite competitor
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates_are_neutral() {
        let rates = Rates::default();
        assert_eq!(rates.attack, 0.5);
        assert_eq!(rates.defence, 0.5);
        assert_eq!(rates.strength(), 0.25);
    }

    #[test]
    fn test_mirrored_match_swaps_scores() {
        let result = MatchResult::new(1, 3, 1);
        let mirror = result.mirrored(0);

        assert_eq!(mirror.opponent, 0);
        assert_eq!(mirror.score, 1);
        assert_eq!(mirror.opponent_score, 3);
    }

    #[test]
    fn test_scoreline_display() {
        let scoreline = Scoreline {
            score: 2,
            opponent_score: 1,
            probability: 0.1234,
        };
        assert_eq!(scoreline.to_string(), "P(2, 1) = 12.3%");
    }

    #[test]
    fn test_cluster_membership() {
        let cluster = Cluster {
            root: "Beta".to_string(),
            members: vec!["Alpha".to_string(), "Beta".to_string()],
        };

        assert_eq!(cluster.len(), 2);
        assert!(!cluster.is_empty());
        assert!(cluster.contains("Alpha"));
        assert!(!cluster.contains("Gamma"));
    }
}
