// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `neuronet.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuronetConfig {
    pub simulation: SimulationConfig,
    pub pool: PoolConfig,
    pub store: StoreConfig,
    pub recorder: RecorderConfig,
    pub logging: LoggingConfig,
}

/// Time stepping and progress reporting
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Integration time step in milliseconds
    pub dt: f64,
    /// Minimum seconds between progress lines while simulating
    pub progress_interval_secs: f64,
    pub verbose: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            progress_interval_secs: 1.0,
            verbose: false,
        }
    }
}

/// Worker pool sizing
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of workers; 0 = available parallelism
    pub workers: usize,
}

/// Fixed-record store tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Appended records held in memory before a write to disk
    pub buffer_records: usize,
    /// Records processed per chunk by elementwise operations
    pub chunk_records: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_records: 128,
            chunk_records: 131_072,
        }
    }
}

/// Where recorders keep their traces
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// "memory" or "disk"
    pub mode: String,
    /// Trace directory for disk mode
    pub directory: PathBuf,
    /// "overwrite", "append" or "read_only" (disk mode only)
    pub open_mode: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            mode: "memory".to_string(),
            directory: PathBuf::from("recordings"),
            open_mode: "overwrite".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
