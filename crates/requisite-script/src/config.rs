// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Runtime configuration.
//!
//! Layers, lowest priority first: built-in defaults, the user config file
//! (`<config dir>/requisite/requisite.toml`), `./requisite.toml`, an explicit
//! `--config` file, then `REQUISITE_*` environment variables.

use crate::error::{Result, ScriptError};
use requisite_core::{LoadCheckMode, LoaderConfig, ResolvedRedefinition};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of configuration files
pub const CONFIG_FILE_NAME: &str = "requisite.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "REQUISITE_";

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Configuration for the script runtime and CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directories searched for locations not found relative to the script
    pub search_paths: Vec<PathBuf>,

    /// Module loader settings
    pub loader: LoaderConfig,

    /// Default log level
    pub log_level: String,

    /// REPL history size
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            loader: LoaderConfig::default(),
            log_level: "warn".to_string(),
            history_size: 1000,
        }
    }
}

/// A configuration file: every key is optional so that files layer
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    search_paths: Option<Vec<PathBuf>>,
    loader: Option<LoaderFile>,
    log_level: Option<String>,
    history_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct LoaderFile {
    resolved_redefinition: Option<ResolvedRedefinition>,
    load_check: Option<LoadCheckMode>,
}

impl Config {
    /// Load configuration from the default locations, plus `explicit` if given.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(user_config) = user_config_path() {
            if user_config.is_file() {
                config.merge_from_file(&user_config)?;
            }
        }

        let project_config = PathBuf::from(CONFIG_FILE_NAME);
        if project_config.is_file() {
            config.merge_from_file(&project_config)?;
        }

        if let Some(path) = explicit {
            config.merge_from_file(path)?;
        }

        config.load_from_vars(std::env::vars())?;

        Ok(config)
    }

    /// Merge a TOML configuration file.
    ///
    /// Relative search paths are taken relative to the file's directory and
    /// appended to the ones already configured.
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "Loading configuration file");
        let content = std::fs::read_to_string(path)?;
        self.merge_from_str(&content, path.parent())
    }

    fn merge_from_str(&mut self, content: &str, base: Option<&Path>) -> Result<()> {
        let file: ConfigFile = toml::from_str(content)?;

        if let Some(paths) = file.search_paths {
            for path in paths {
                let path = match base {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                };
                if !self.search_paths.contains(&path) {
                    self.search_paths.push(path);
                }
            }
        }
        if let Some(loader) = file.loader {
            if let Some(policy) = loader.resolved_redefinition {
                self.loader.resolved_redefinition = policy;
            }
            if let Some(check) = loader.load_check {
                self.loader.load_check = check;
            }
        }
        if let Some(level) = file.log_level {
            self.set("log-level", &level)?;
        }
        if let Some(size) = file.history_size {
            self.history_size = size;
        }
        Ok(())
    }

    /// Apply `REQUISITE_*` variables from `vars`.
    ///
    /// `REQUISITE_LOAD_CHECK=resolvable` sets `load-check`, and so on.
    pub fn load_from_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                self.set(&config_key, &value)?;
            }
        }
        Ok(())
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "search-path" | "search-paths" => {
                self.search_paths = std::env::split_paths(value).collect();
            }
            "resolved-redefinition" | "load-check" => self.loader.set(key, value)?,
            "log-level" => {
                let level = value.trim().to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(ScriptError::config(format!(
                        "unknown log level '{}' (expected one of {})",
                        value,
                        LOG_LEVELS.join(", ")
                    )));
                }
                self.log_level = level;
            }
            "history-size" => {
                self.history_size = value.trim().parse().map_err(|_| {
                    ScriptError::config(format!("history-size must be a number, not '{}'", value))
                })?;
            }
            other => {
                return Err(ScriptError::config(format!("unknown setting '{}'", other)));
            }
        }
        Ok(())
    }
}

/// Path of the user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("requisite").join(CONFIG_FILE_NAME))
}
