// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Logging settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Unknown log format '{}'", other)),
        }
    }
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level for targets without a debug flag (trace, debug, info, warn, error)
    pub level: String,
    pub format: LogFormat,
    /// Base directory for run log folders (`file-logging` feature only)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
        }
    }
}

impl TryFrom<&neuronet_config::LoggingConfig> for LoggingSettings {
    type Error = anyhow::Error;

    fn try_from(config: &neuronet_config::LoggingConfig) -> Result<Self, Self::Error> {
        Ok(LoggingSettings {
            level: config.level.to_ascii_lowercase(),
            format: config.format.parse()?,
            log_dir: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_logging_config() {
        let config = neuronet_config::LoggingConfig {
            level: "WARN".to_string(),
            format: "Json".to_string(),
        };
        let settings = LoggingSettings::try_from(&config).unwrap();
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
