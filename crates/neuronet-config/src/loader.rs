// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading and override handling

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ConfigError, ConfigResult, NeuronetConfig, CONFIG_FILE_NAME};

/// Find the configuration file.
///
/// Search order:
/// 1. `NEURONET_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEURONET_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEURONET_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        search_paths.extend(cwd.ancestors().skip(1).take(5).map(|p| p.join(CONFIG_FILE_NAME)));
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet NEURONET_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file.
///
/// With `config_path` = `None` the file is searched for with [`find_config_file`].
/// Environment overrides are applied first, then `cli_args`.
///
/// # Errors
///
/// Returns error if the file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeuronetConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeuronetConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEURONET_DT` -> `simulation.dt`
/// - `NEURONET_VERBOSE` -> `simulation.verbose`
/// - `NEURONET_WORKERS` -> `pool.workers`
/// - `NEURONET_RECORDER_MODE` -> `recorder.mode`
/// - `NEURONET_RECORDER_DIR` -> `recorder.directory`
/// - `NEURONET_LOG_LEVEL` -> `logging.level`
/// - `NEURONET_LOG_FORMAT` -> `logging.format`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut NeuronetConfig) {
    if let Ok(value) = env::var("NEURONET_DT") {
        if let Ok(dt) = value.parse::<f64>() {
            config.simulation.dt = dt;
        }
    }
    if let Ok(value) = env::var("NEURONET_VERBOSE") {
        config.simulation.verbose = parse_flag(&value);
    }
    if let Ok(value) = env::var("NEURONET_WORKERS") {
        if let Ok(workers) = value.parse::<usize>() {
            config.pool.workers = workers;
        }
    }
    if let Ok(value) = env::var("NEURONET_RECORDER_MODE") {
        config.recorder.mode = value;
    }
    if let Ok(value) = env::var("NEURONET_RECORDER_DIR") {
        config.recorder.directory = PathBuf::from(value);
    }
    if let Ok(value) = env::var("NEURONET_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("NEURONET_LOG_FORMAT") {
        config.logging.format = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"dt": "0.05", "workers": "4"}`)
pub fn apply_cli_overrides(config: &mut NeuronetConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("dt") {
        if let Ok(dt) = value.parse::<f64>() {
            config.simulation.dt = dt;
        }
    }
    if let Some(value) = cli_args.get("verbose") {
        config.simulation.verbose = parse_flag(value);
    }
    if let Some(value) = cli_args.get("progress_interval") {
        if let Ok(secs) = value.parse::<f64>() {
            config.simulation.progress_interval_secs = secs;
        }
    }
    if let Some(value) = cli_args.get("workers") {
        if let Ok(workers) = value.parse::<usize>() {
            config.pool.workers = workers;
        }
    }
    if let Some(value) = cli_args.get("buffer_records") {
        if let Ok(n) = value.parse::<usize>() {
            config.store.buffer_records = n;
        }
    }
    if let Some(value) = cli_args.get("chunk_records") {
        if let Ok(n) = value.parse::<usize>() {
            config.store.chunk_records = n;
        }
    }
    if let Some(value) = cli_args.get("recorder_mode") {
        config.recorder.mode = value.clone();
    }
    if let Some(value) = cli_args.get("recorder_dir") {
        config.recorder.directory = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
