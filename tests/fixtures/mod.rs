//! Shared league builders for integration tests

#![allow(dead_code)]

use league_predictor::config::{FitConfig, ModelConfig};
use league_predictor::League;

/// Fit settings loose enough to keep integration tests fast
pub fn quick_fitting() -> FitConfig {
    FitConfig {
        search_tolerance: 1e-5,
        ..FitConfig::default()
    }
}

pub fn empty_league() -> League {
    League::new(ModelConfig::default(), quick_fitting())
}

/// A league built from `(name_a, score_a, name_b, score_b)` tuples
pub fn league_with(results: &[(&str, u32, &str, u32)]) -> League {
    let mut league = empty_league();
    for &(name_a, score_a, name_b, score_b) in results {
        league
            .add_result(name_a, score_a, name_b, score_b)
            .expect("fixture results are valid");
    }
    league
}

/// Alpha beat Beta 3-1 and nothing else was played
pub fn alpha_beta() -> League {
    league_with(&[("Alpha", 3, "Beta", 1)])
}

/// Two separate mini-leagues plus one competitor joining late
pub fn two_divisions() -> League {
    league_with(&[
        ("Alpha", 3, "Beta", 1),
        ("Gamma", 2, "Delta", 2),
        ("Beta", 1, "Epsilon", 0),
        ("Delta", 4, "Zeta", 1),
        ("Alpha", 2, "Epsilon", 0),
    ])
}

pub fn assert_close(left: f64, right: f64, tolerance: f64) {
    assert!(
        (left - right).abs() <= tolerance,
        "expected {} to be within {} of {}",
        left,
        tolerance,
        right
    );
}
