// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every check runs; all failures are reported together.

use crate::{ConfigError, ConfigResult, NeuronetConfig};

const RECORDER_MODES: &[&str] = &["memory", "disk"];
const OPEN_MODES: &[&str] = &["overwrite", "append", "read_only"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotPositive { field: String, value: f64 },
    Zero { field: String },
    UnknownOption { field: String, value: String, allowed: &'static [&'static str] },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{} = {} must be positive", field, value)
            }
            Self::Zero { field } => write!(f, "{} must be at least 1", field),
            Self::UnknownOption {
                field,
                value,
                allowed,
            } => write!(
                f,
                "{} = '{}' is not one of: {}",
                field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check
pub fn validate_config(config: &NeuronetConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_value_ranges(config, &mut errors);
    validate_options(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_value_ranges(config: &NeuronetConfig, errors: &mut Vec<ConfigValidationError>) {
    // NaN fails this comparison too
    if !(config.simulation.dt > 0.0) {
        errors.push(ConfigValidationError::NotPositive {
            field: "simulation.dt".to_string(),
            value: config.simulation.dt,
        });
    }
    if !(config.simulation.progress_interval_secs > 0.0) {
        errors.push(ConfigValidationError::NotPositive {
            field: "simulation.progress_interval_secs".to_string(),
            value: config.simulation.progress_interval_secs,
        });
    }
    if config.store.buffer_records == 0 {
        errors.push(ConfigValidationError::Zero {
            field: "store.buffer_records".to_string(),
        });
    }
    if config.store.chunk_records == 0 {
        errors.push(ConfigValidationError::Zero {
            field: "store.chunk_records".to_string(),
        });
    }
}

fn check_option(
    field: &str,
    value: &str,
    allowed: &'static [&'static str],
    errors: &mut Vec<ConfigValidationError>,
) {
    if !allowed.contains(&value.to_ascii_lowercase().as_str()) {
        errors.push(ConfigValidationError::UnknownOption {
            field: field.to_string(),
            value: value.to_string(),
            allowed,
        });
    }
}

fn validate_options(config: &NeuronetConfig, errors: &mut Vec<ConfigValidationError>) {
    check_option("recorder.mode", &config.recorder.mode, RECORDER_MODES, errors);
    check_option("recorder.open_mode", &config.recorder.open_mode, OPEN_MODES, errors);
    check_option("logging.level", &config.logging.level, LOG_LEVELS, errors);
    check_option("logging.format", &config.logging.format, LOG_FORMATS, errors);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_dt() {
        let mut config = NeuronetConfig::default();
        config.simulation.dt = 0.0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("simulation.dt"));

        config.simulation.dt = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_reports_every_failure() {
        let mut config = NeuronetConfig::default();
        config.store.buffer_records = 0;
        config.store.chunk_records = 0;
        config.recorder.mode = "tape".to_string();

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("store.buffer_records"));
        assert!(message.contains("store.chunk_records"));
        assert!(message.contains("recorder.mode = 'tape'"));
    }

    #[test]
    fn test_options_are_case_insensitive() {
        let mut config = NeuronetConfig::default();
        config.logging.level = "DEBUG".to_string();
        config.recorder.mode = "Disk".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
