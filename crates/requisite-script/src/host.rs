// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Filesystem-backed source host.
//!
//! Locations are resolved in this order:
//! 1. `file://` URLs
//! 2. Absolute paths
//! 3. Paths relative to the script currently executing
//! 4. Paths relative to the working directory
//! 5. Each configured search path
//!
//! Remote schemes (`http`, `https`, ...) are refused, so a batch falls back
//! to its next candidate location.

use crate::error::{Result, ScriptError};
use crate::script::ModuleScript;
use requisite_core::{ModuleError, ModuleLoader, SourceHost, Value};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Path reported for scripts that do not come from a file
pub const INLINE_SCRIPT: &str = "<inline>";

/// The result of one `require` list in a script
#[derive(Debug, Clone)]
pub struct RequireOutcome {
    /// Requested module names
    pub modules: Vec<String>,
    /// Resolved instances, matching `modules`
    pub values: Vec<Value>,
}

/// Executes module scripts against a loader
#[derive(Debug, Default)]
pub struct ScriptHost {
    search_paths: Vec<PathBuf>,
    /// Scripts currently executing, innermost last
    loading_stack: Vec<PathBuf>,
    /// Scripts that finished executing
    included: FxHashSet<PathBuf>,
    outcomes: Vec<RequireOutcome>,
}

impl ScriptHost {
    /// Create a host with search paths
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths,
            ..Self::default()
        }
    }

    /// The script currently executing
    pub fn current_script(&self) -> Option<&Path> {
        self.loading_stack.last().map(PathBuf::as_path)
    }

    /// Whether a script already ran to completion
    pub fn was_included(&self, path: &Path) -> bool {
        self.included.contains(path)
    }

    /// Outcomes of every `require` list executed so far
    pub fn outcomes(&self) -> &[RequireOutcome] {
        &self.outcomes
    }

    /// Take and clear the recorded outcomes
    pub fn take_outcomes(&mut self) -> Vec<RequireOutcome> {
        std::mem::take(&mut self.outcomes)
    }

    /// Forget included scripts and outcomes
    pub fn reset(&mut self) {
        self.loading_stack.clear();
        self.included.clear();
        self.outcomes.clear();
    }

    /// Resolve a location to an existing file
    pub fn resolve_location(&self, location: &str) -> Result<PathBuf> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ScriptError::LocationNotFound(location.to_string()));
        }

        if let Ok(url) = Url::parse(location) {
            match url.scheme() {
                "file" => {
                    let path = url.to_file_path().map_err(|_| {
                        ScriptError::unsupported(location, "not a local file URL")
                    })?;
                    return existing(path, location);
                }
                // Windows drive letters parse as one-letter schemes
                scheme if scheme.len() == 1 => {}
                scheme => {
                    return Err(ScriptError::unsupported(
                        location,
                        format!("the '{}' scheme cannot be loaded", scheme),
                    ));
                }
            }
        }

        let path = Path::new(location);
        if path.is_absolute() {
            return existing(path.to_path_buf(), location);
        }

        let script_dir = self
            .current_script()
            .and_then(Path::parent)
            .map(Path::to_path_buf);

        script_dir
            .into_iter()
            .chain(std::iter::once(PathBuf::new()))
            .chain(self.search_paths.iter().cloned())
            .map(|base| base.join(path))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| ScriptError::LocationNotFound(location.to_string()))
    }

    /// Resolve and execute a location
    pub fn include_location(&mut self, location: &str, loader: &mut ModuleLoader) -> Result<()> {
        let path = self.resolve_location(location)?;
        self.execute_file(&path, loader)
    }

    /// Execute the script at `path`.
    ///
    /// A script that already ran is skipped. Including a script that is
    /// still executing fails with [`ScriptError::IncludeCycle`].
    pub fn execute_file(&mut self, path: &Path, loader: &mut ModuleLoader) -> Result<()> {
        let path = std::fs::canonicalize(path)?;

        if let Some(start) = self.loading_stack.iter().position(|p| *p == path) {
            let mut chain = self.loading_stack[start..].to_vec();
            chain.push(path);
            return Err(ScriptError::IncludeCycle { chain });
        }
        if self.included.contains(&path) {
            debug!(path = %path.display(), "Script already included");
            return Ok(());
        }

        let source = std::fs::read_to_string(&path)?;
        let script = ModuleScript::parse(&path, &source)?;

        debug!(path = %path.display(), "Executing script");
        self.loading_stack.push(path.clone());
        let result = self.execute(&script, loader);
        self.loading_stack.pop();
        result?;

        self.included.insert(path);
        Ok(())
    }

    /// Execute inline script source. Relative locations resolve against the
    /// working directory.
    pub fn execute_source(&mut self, source: &str, loader: &mut ModuleLoader) -> Result<()> {
        let script = ModuleScript::parse(Path::new(INLINE_SCRIPT), source)?;
        self.execute(&script, loader)
    }

    /// Run every section of a parsed script
    pub fn execute(&mut self, script: &ModuleScript, loader: &mut ModuleLoader) -> Result<()> {
        for location in &script.include {
            self.include_location(location, loader)?;
        }

        let batches = script.batches()?;
        if !batches.is_empty() {
            loader.load_externals(self, &batches)?;
        }

        if let Some(plan) = script.include_plan() {
            loader.try_include(self, &plan)?;
        }

        for definition in &script.define {
            let factory = definition.factory()?;
            loader.define(definition.name.clone(), definition.deps.clone(), factory)?;
        }

        for modules in &script.require {
            let values = loader.require(modules, |values| values.to_vec())?;
            info!(modules = ?modules, "require() satisfied");
            self.outcomes.push(RequireOutcome {
                modules: modules.clone(),
                values,
            });
        }

        Ok(())
    }
}

impl SourceHost for ScriptHost {
    fn include(&mut self, location: &str, loader: &mut ModuleLoader) -> requisite_core::Result<()> {
        self.include_location(location, loader)
            .map_err(|err| ModuleError::host(location, err))
    }
}

fn existing(path: PathBuf, location: &str) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ScriptError::LocationNotFound(location.to_string()))
    }
}
