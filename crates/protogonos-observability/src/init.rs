// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization: a console layer plus an optional
//! non-blocking file layer, gated by `LoggingConfig::output`.

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;
use tracing_subscriber::{EnvFilter, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LogOutput, LoggingConfig};

/// Resolve the tracing filter, with `RUST_LOG` taking precedence over
/// the per-crate debug flags.
fn resolve_env_filter(debug_flags: &CrateDebugFlags) -> Result<EnvFilter> {
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(rust_log.clone()).map_err(|e| anyhow!("invalid RUST_LOG '{}': {}", rust_log, e));
    }
    Ok(EnvFilter::new(debug_flags.to_filter_string()))
}

/// Holds the non-blocking writer guard alive for the lifetime of the
/// process; dropping it flushes buffered log lines.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize the global tracing subscriber from a [`LoggingConfig`]
/// and the process's per-crate debug flags. Returns a guard that must
/// be held for as long as logging should keep flushing.
pub fn init_logging(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    let env_filter = resolve_env_filter(debug_flags)?;
    let json = config.format == LogFormat::Json;

    match &config.output {
        LogOutput::Stdout => {
            if json {
                let layer = tracing_subscriber::fmt::layer().with_target(false).json().with_filter(env_filter);
                Registry::default().with(layer).init();
            } else {
                let layer = tracing_subscriber::fmt::layer().with_target(false).with_filter(env_filter);
                Registry::default().with(layer).init();
            }
            Ok(LoggingGuard { _file_guard: None })
        }
        LogOutput::File(path) => {
            let (dir, file_name) = split_log_path(path);
            std::fs::create_dir_all(&dir).with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(&dir, &file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            if json {
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .json()
                    .with_filter(env_filter);
                Registry::default().with(layer).init();
            } else {
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_filter(env_filter);
                Registry::default().with(layer).init();
            }
            Ok(LoggingGuard { _file_guard: Some(guard) })
        }
    }
}

/// Initialize logging with the default `LoggingConfig` (text, stdout)
/// and debug flags parsed from args/environment.
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(&LoggingConfig::default(), debug_flags)
}

fn split_log_path(path: &std::path::Path) -> (PathBuf, String) {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "protogonos.log".to_string());
    (dir.to_path_buf(), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_log_path_separates_directory_and_file() {
        let (dir, file) = split_log_path(std::path::Path::new("runs/current/trace.log"));
        assert_eq!(dir, PathBuf::from("runs/current"));
        assert_eq!(file, "trace.log");
    }

    #[test]
    fn split_log_path_defaults_directory_for_bare_filename() {
        let (dir, file) = split_log_path(std::path::Path::new("trace.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "trace.log");
    }
}
