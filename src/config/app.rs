//! Main application configuration
//!
//! This module defines the primary configuration structures for the league
//! predictor, including environment variable and TOML file loading and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use super::fitting::FitConfig;
use super::model::ModelConfig;
use crate::rating::engine::stable_rate_limit;
use crate::types::Truncation;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub model: ModelConfig,
    pub fitting: FitConfig,
    pub prediction: PredictionSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// How predictions are cut down for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionSettings {
    /// Number of scorelines shown per prediction
    pub top_outcomes: usize,
    /// When set, show every scoreline at or above this probability instead
    pub min_probability: Option<f64>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "league-predictor".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            top_outcomes: 5,
            min_probability: None,
        }
    }
}

impl PredictionSettings {
    pub fn truncation(&self) -> Truncation {
        match self.min_probability {
            Some(threshold) => Truncation::MinProbability(threshold),
            None => Truncation::TopN(self.top_outcomes),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        override_from_env("SCORE_CAP", &mut config.model.score_cap)?;
        override_from_env("TIME_STEPS", &mut config.model.time_steps)?;
        override_from_env("MAX_TRACKED_SCORE", &mut config.model.max_tracked_score)?;
        override_from_env("MAX_SCORING_RATE", &mut config.model.max_scoring_rate)?;

        override_from_env("MAX_FIT_ROUNDS", &mut config.fitting.max_rounds)?;
        override_from_env(
            "CONVERGENCE_TOLERANCE",
            &mut config.fitting.convergence_tolerance,
        )?;
        override_from_env("SEARCH_TOLERANCE", &mut config.fitting.search_tolerance)?;

        override_from_env("TOP_OUTCOMES", &mut config.prediction.top_outcomes)?;
        if let Ok(threshold) = env::var("MIN_PROBABILITY") {
            config.prediction.min_probability = Some(
                threshold
                    .parse()
                    .map_err(|_| anyhow!("Invalid MIN_PROBABILITY value: {}", threshold))?,
            );
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }
}

fn override_from_env<T: FromStr>(var: &str, target: &mut T) -> Result<()> {
    if let Ok(value) = env::var(var) {
        *target = value
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", var, value))?;
    }
    Ok(())
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Model
    if config.model.score_cap == 0 {
        return Err(anyhow!("Score cap must be at least 1"));
    }
    if config.model.time_steps == 0 {
        return Err(anyhow!("Time steps must be greater than 0"));
    }
    if config.model.max_tracked_score < config.model.score_cap {
        return Err(anyhow!(
            "Max tracked score ({}) cannot be below the score cap ({})",
            config.model.max_tracked_score,
            config.model.score_cap
        ));
    }
    if !(config.model.max_scoring_rate.is_finite() && config.model.max_scoring_rate > 0.0) {
        return Err(anyhow!("Max scoring rate must be positive"));
    }
    if config.model.max_scoring_rate > stable_rate_limit(config.model.time_steps) {
        return Err(anyhow!(
            "Max scoring rate ({}) cannot exceed the time steps ({}); the integration step would go negative",
            config.model.max_scoring_rate,
            config.model.time_steps
        ));
    }

    // Fitting
    for (label, value) in [
        ("Initial attack", config.fitting.initial_attack),
        ("Initial defence", config.fitting.initial_defence),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(anyhow!("{} must lie in [0, 1], got {}", label, value));
        }
    }
    if config.fitting.max_rounds == 0 {
        return Err(anyhow!("Max fit rounds must be greater than 0"));
    }
    if config.fitting.convergence_tolerance <= 0.0 {
        return Err(anyhow!("Convergence tolerance must be positive"));
    }
    if config.fitting.search_tolerance <= 0.0 {
        return Err(anyhow!("Search tolerance must be positive"));
    }
    if config.fitting.search_sections < 2 {
        return Err(anyhow!("Search needs at least 2 sections"));
    }

    // Prediction
    if config.prediction.top_outcomes == 0 {
        return Err(anyhow!("Top outcomes must be greater than 0"));
    }
    if let Some(threshold) = config.prediction.min_probability {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(anyhow!("Min probability must lie in [0, 1]"));
        }
    }

    Ok(())
}
