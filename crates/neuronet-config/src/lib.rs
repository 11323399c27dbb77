// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # NeuroNet Configuration System
//!
//! Type-safe configuration loader with support for:
//! - TOML file parsing (`neuronet.toml`)
//! - Environment variable overrides (`NEURONET_*`)
//! - CLI argument overrides (`key=value` pairs)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use neuronet_config::{load_config, validate_config};
//!
//! let config = load_config(None, None).expect("Failed to load config");
//! validate_config(&config).expect("Invalid config");
//!
//! println!("Time step: {} ms", config.simulation.dt);
//! println!("Pool workers: {}", config.pool.workers);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Name of the configuration file searched for on disk
pub const CONFIG_FILE_NAME: &str = "neuronet.toml";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
