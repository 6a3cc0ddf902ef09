//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-protogonos-eval`, `--debug-protogonos-tuner`,
//! etc. to raise a single crate's log level without turning on debug
//! logging everywhere.

use std::collections::HashMap;
use std::env;

use crate::KNOWN_CRATES;

/// Parsed set of per-crate debug flags.
///
/// # Example
/// ```rust
/// use protogonos_observability::CrateDebugFlags;
/// let flags = CrateDebugFlags::from_args(std::env::args().collect::<Vec<_>>());
/// if flags.is_enabled("protogonos-eval") {
///     // Enable debug logging for protogonos-eval
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments.
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all known crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut enabled_crates = HashMap::new();
        let mut debug_all = false;

        for arg in args {
            if arg == "--debug-all" {
                debug_all = true;
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                enabled_crates.insert(crate_name.to_string(), true);
            }
        }

        if debug_all {
            for crate_name in KNOWN_CRATES {
                enabled_crates.insert(crate_name.to_string(), true);
            }
        }

        CrateDebugFlags { enabled_crates }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(crate_name)
    }

    pub fn enabled_crates(&self) -> Vec<&String> {
        self.enabled_crates.keys().collect()
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Log level for a given crate: `DEBUG` if its flag is set, `INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter`-compatible string, e.g.
    /// `"protogonos-eval=debug,info"`.
    pub fn to_filter_string(&self) -> String {
        if self.enabled_crates.is_empty() {
            return "info".to_string();
        }

        let mut filters = Vec::new();
        for crate_name in self.enabled_crates.keys() {
            filters.push(format!("{}=debug", crate_name));
        }
        filters.push("info".to_string());
        filters.join(",")
    }
}

/// Parse debug flags from both command-line arguments and the
/// `PROTOGONOS_DEBUG` environment variable (comma-separated crate
/// names, or `all`).
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("PROTOGONOS_DEBUG") {
        if env_var == "all" {
            for crate_name in KNOWN_CRATES {
                flags.enabled_crates.insert(crate_name.to_string(), true);
            }
        } else {
            for crate_name in env_var.split(',') {
                let crate_name = crate_name.trim();
                if !crate_name.is_empty() {
                    flags.enabled_crates.insert(crate_name.to_string(), true);
                }
            }
        }
    }

    flags
}

/// Help text listing the available debug flags, for `--help` output.
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                      Enable debug logging for all crates
  --debug-{{crate-name}}            Enable debug logging for a specific crate

Available crates:
  {}

Environment Variable:
  PROTOGONOS_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  PROTOGONOS_DEBUG=all                              Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}
