// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! # neuronet-observability
//!
//! Logging setup shared by every NeuroNet binary and test harness, with
//! per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: additionally write JSON logs into a timestamped run directory

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Log targets of the NeuroNet crates, as used by `--debug-<crate>` flags
pub const KNOWN_CRATES: &[&str] = &[
    "neuronet",
    "neuronet_config",
    "neuronet_engine",
    "neuronet_pool",
    "neuronet_store",
];
