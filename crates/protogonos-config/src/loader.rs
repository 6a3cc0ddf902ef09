// Copyright 2025 Protogonos Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support.
//!
//! Implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::types::RunConfig;
use crate::ConfigError;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the protogonos configuration file.
///
/// Search order:
/// 1. `PROTOGONOS_CONFIG_PATH` environment variable
/// 2. Current working directory: `./protogonos.toml`
/// 3. Parent directory: `../protogonos.toml`
pub fn find_config_file() -> Result<PathBuf, ConfigError> {
    if let Ok(env_path) = env::var("PROTOGONOS_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        return if path.exists() {
            Ok(path)
        } else {
            Err(ConfigError::FileNotFound(format!(
                "config file specified by PROTOGONOS_CONFIG_PATH not found: {}",
                path.display()
            )))
        };
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join("protogonos.toml"));
        if let Some(parent) = cwd.parent() {
            search_paths.push(parent.join("protogonos.toml"));
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths.iter().map(|p| format!("  - {}", p.display())).collect::<Vec<_>>().join("\n");
    Err(ConfigError::FileNotFound(format!(
        "protogonos.toml not found in any of these locations:\n{}\n\nSet PROTOGONOS_CONFIG_PATH to a custom location, or pass an explicit path.",
        search_list
    )))
}

/// Load a `RunConfig` from a TOML file, then layer environment and CLI
/// overrides on top.
///
/// * `config_path` - Explicit path; if `None`, [`find_config_file`] is used.
///   Missing file is only an error if `config_path` was given explicitly
///   or no `run.toml` default could be located; callers that want a
///   pure-default run should pass `Some`/create the file, or skip this
///   function and use `RunConfig::default()` directly.
/// * `cli_overrides` - Flattened `section.field` -> value strings (mirrors the
///   CLI's `--set section.field=value` flag).
pub fn load_config(config_path: Option<&Path>, cli_overrides: Option<&HashMap<String, String>>) -> Result<RunConfig, ConfigError> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: RunConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(overrides) = cli_overrides {
        apply_cli_overrides(&mut config, overrides);
    }

    Ok(config)
}

/// Apply `PROTOGONOS_*` environment variable overrides.
///
/// - `PROTOGONOS_SEED` -> `run.seed`
/// - `PROTOGONOS_SCAPE` -> `run.scape`
/// - `PROTOGONOS_MAX_GENERATIONS` -> `run.max_generations`
/// - `PROTOGONOS_POPULATION_SIZE` -> `population.population_size`
/// - `PROTOGONOS_WORKER_COUNT` -> `population.worker_count`
/// - `PROTOGONOS_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut RunConfig) {
    if let Ok(value) = env::var("PROTOGONOS_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.run.seed = seed;
        }
    }
    if let Ok(value) = env::var("PROTOGONOS_SCAPE") {
        config.run.scape = value;
    }
    if let Ok(value) = env::var("PROTOGONOS_MAX_GENERATIONS") {
        config.run.max_generations = value.parse::<u64>().ok();
    }
    if let Ok(value) = env::var("PROTOGONOS_POPULATION_SIZE") {
        if let Ok(size) = value.parse::<usize>() {
            config.population.population_size = size;
        }
    }
    if let Ok(value) = env::var("PROTOGONOS_WORKER_COUNT") {
        if let Ok(count) = value.parse::<usize>() {
            config.population.worker_count = count;
        }
    }
    if let Ok(value) = env::var("PROTOGONOS_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply explicit `section.field=value` CLI overrides. Unknown keys are
/// ignored rather than rejected, so an old key in a script doesn't break
/// a newer binary.
pub fn apply_cli_overrides(config: &mut RunConfig, overrides: &HashMap<String, String>) {
    for (key, value) in overrides {
        match key.as_str() {
            "run.seed" => {
                if let Ok(v) = value.parse() {
                    config.run.seed = v;
                }
            }
            "run.scape" => config.run.scape = value.clone(),
            "run.max_generations" => config.run.max_generations = value.parse().ok(),
            "run.evaluations_limit" => config.run.evaluations_limit = value.parse().ok(),
            "run.fitness_goal" => config.run.fitness_goal = value.parse().ok(),
            "run.start_paused" => config.run.start_paused = value == "true" || value == "1",
            "population.population_size" => {
                if let Ok(v) = value.parse() {
                    config.population.population_size = v;
                }
            }
            "population.worker_count" => {
                if let Ok(v) = value.parse() {
                    config.population.worker_count = v;
                }
            }
            "population.elite_count" => {
                if let Ok(v) = value.parse() {
                    config.population.elite_count = v;
                }
            }
            "population.selection_strategy" => config.population.selection_strategy = value.clone(),
            "population.speciation_mode" => config.population.speciation_mode = value.clone(),
            "logging.level" => config.logging.level = value.clone(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn find_config_file_honors_env_var() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom.toml");
        File::create(&config_path).unwrap();

        env::set_var("PROTOGONOS_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("PROTOGONOS_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn load_minimal_config_overrides_population_size() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("protogonos.toml");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[run]").unwrap();
        writeln!(file, "scape = \"xor\"").unwrap();
        writeln!(file, "seed = 7").unwrap();
        writeln!(file, "[population]").unwrap();
        writeln!(file, "population_size = 16").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();
        assert_eq!(config.run.seed, 7);
        assert_eq!(config.population.population_size, 16);
    }

    #[test]
    fn environment_overrides_apply_on_top_of_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("protogonos.toml");
        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[run]").unwrap();
        writeln!(file, "seed = 1").unwrap();

        env::set_var("PROTOGONOS_SEED", "99");
        let config = load_config(Some(&config_path), None).unwrap();
        env::remove_var("PROTOGONOS_SEED");

        assert_eq!(config.run.seed, 99);
    }

    #[test]
    fn cli_overrides_win_over_environment() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("protogonos.toml");
        File::create(&config_path).unwrap();

        env::set_var("PROTOGONOS_SEED", "5");
        let mut overrides = HashMap::new();
        overrides.insert("run.seed".to_string(), "123".to_string());
        let config = load_config(Some(&config_path), Some(&overrides)).unwrap();
        env::remove_var("PROTOGONOS_SEED");

        assert_eq!(config.run.seed, 123);
    }
}
