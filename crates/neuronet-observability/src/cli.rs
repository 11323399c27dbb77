// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-neuronet_pool` or `--debug-neuronet-pool`
//! (hyphens are normalised to the underscore log target).

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Set of crates whose logs are raised to `debug`
///
/// # Example
/// ```rust
/// use neuronet_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-neuronet-pool".to_string()]);
/// assert!(flags.is_enabled("neuronet_pool"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

fn target_name(crate_name: &str) -> String {
    crate_name.trim().replace('-', "_")
}

impl CrateDebugFlags {
    /// Looks for `--debug-{crate-name}` arguments; `--debug-all` enables every known crate.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        let name = target_name(crate_name);
        if !name.is_empty() {
            self.enabled_crates.insert(name);
        }
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(&target_name(crate_name))
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Filter directive string for `EnvFilter`, e.g.
    /// `"neuronet_pool=debug,warn"` with `default_level` = `"warn"`.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        self.enabled_crates
            .iter()
            .map(|name| format!("{}=debug", name))
            .chain(std::iter::once(default_level.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Debug flags from the process arguments plus the `NEURONET_DEBUG`
/// environment variable (comma-separated crate names, or `all`).
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("NEURONET_DEBUG") {
        if env_var == "all" {
            flags.enable_all();
        } else {
            for crate_name in env_var.split(',') {
                flags.enable(crate_name);
            }
        }
    }

    flags
}

/// Help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  NEURONET_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  NEURONET_DEBUG=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}
