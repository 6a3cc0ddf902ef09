// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! # protogonos-config
//!
//! TOML-file, environment-variable and CLI-argument layered
//! configuration for evolution runs. [`RunConfig`] is the single
//! source of truth; [`validate_config`] turns it into the typed
//! `protogonos_population::PopulationConfig` the population loop runs
//! with, rejecting unknown enum tags and out-of-range values up
//! front instead of at generation time.

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::{PopulationSection, RunConfig, RunSection, StoreSection, TuningSection};
pub use validation::{validate_config, ConfigValidationError};

/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration-loading error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("validation failed: {0}")]
    ValidationError(#[from] validation::ConfigValidationError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_run_config_validates() {
        let config = RunConfig::default();
        let population = validate_config(&config).unwrap();
        assert!(population.population_size > 0);
    }
}
