//! Configuration management for the league predictor
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for the model and the fitter.

pub mod app;
pub mod fitting;
pub mod model;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, PredictionSettings, ServiceSettings};
pub use fitting::FitConfig;
pub use model::ModelConfig;
