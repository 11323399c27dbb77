// Copyright 2025 NeuroNet Developers
// SPDX-License-Identifier: Apache-2.0

//! Global subscriber installation
//!
//! Console output is always installed. With the `file-logging` feature and a
//! `log_dir`, a JSON log is also written into a timestamped run folder:
//! ```text
//! <log_dir>/
//!   └── run_20250101_120000/
//!       └── neuronet.log
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::cli::{parse_debug_flags, CrateDebugFlags};
use crate::config::{LogFormat, LoggingSettings};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps background log writers alive; drop it last.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving file logs, if any
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Install the global subscriber.
///
/// # Errors
/// Fails on an invalid filter directive, when the run folder cannot be
/// created, or when a global subscriber is already installed.
pub fn init_logging(debug_flags: &CrateDebugFlags, settings: &LoggingSettings) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&settings.level);
    let new_filter = || {
        EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter '{}'", filter))
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let console_layer = match settings.format {
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_filter(new_filter()?)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_filter(new_filter()?)
            .boxed(),
    };
    layers.push(console_layer);

    #[cfg(feature = "file-logging")]
    let (file_guard, log_dir) = match &settings.log_dir {
        Some(base) => {
            let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
            let run_folder = base.join(format!("run_{}", timestamp));
            std::fs::create_dir_all(&run_folder).with_context(|| {
                format!("Failed to create log directory: {}", run_folder.display())
            })?;

            let appender = tracing_appender::rolling::never(&run_folder, "neuronet.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_filter(new_filter()?)
                    .boxed(),
            );
            (Some(guard), Some(run_folder))
        }
        None => (None, None),
    };
    #[cfg(not(feature = "file-logging"))]
    let log_dir = None;

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install global subscriber")?;

    Ok(LoggingGuard {
        #[cfg(feature = "file-logging")]
        _file_guard: file_guard,
        log_dir,
    })
}

/// Install logging from the process arguments, `NEURONET_DEBUG`, and default settings
pub fn init_logging_default() -> Result<LoggingGuard> {
    init_logging(&parse_debug_flags(), &LoggingSettings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected_before_install() {
        let settings = LoggingSettings {
            level: "neuronet=verbose".to_string(),
            ..Default::default()
        };
        assert!(init_logging(&CrateDebugFlags::default(), &settings).is_err());
    }

    #[test]
    fn test_second_install_fails() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-neuronet_pool".to_string()]);
        let _first = init_logging(&flags, &LoggingSettings::default());
        assert!(init_logging(&flags, &LoggingSettings::default()).is_err());
    }
}
