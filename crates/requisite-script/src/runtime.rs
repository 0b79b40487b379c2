// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Script runtime: a module loader plus the host that feeds it

use crate::config::Config;
use crate::error::Result;
use crate::host::{RequireOutcome, ScriptHost};
use requisite_core::{IncludePlan, ModuleLoader, ResolutionPlan, SourceBatch, Value};
use std::path::Path;
use tracing::debug;

/// Owns a [`ModuleLoader`] and the [`ScriptHost`] that loads sources into it
#[derive(Debug, Default)]
pub struct ScriptRuntime {
    loader: ModuleLoader,
    host: ScriptHost,
}

impl ScriptRuntime {
    /// Create a runtime from configuration
    pub fn new(config: &Config) -> Self {
        debug!(search_paths = ?config.search_paths, "Creating script runtime");
        Self {
            loader: ModuleLoader::with_config(config.loader.clone()),
            host: ScriptHost::new(config.search_paths.clone()),
        }
    }

    /// Execute a script file
    pub fn run_file(&mut self, path: &Path) -> Result<()> {
        self.host.execute_file(path, &mut self.loader)
    }

    /// Execute inline script source
    pub fn run_source(&mut self, source: &str) -> Result<()> {
        self.host.execute_source(source, &mut self.loader)
    }

    /// Resolve and execute a location
    pub fn include(&mut self, location: &str) -> Result<()> {
        self.host.include_location(location, &mut self.loader)
    }

    /// Load source batches through the host
    pub fn externals(&mut self, batches: &[SourceBatch]) -> Result<()> {
        self.loader.load_externals(&mut self.host, batches)?;
        Ok(())
    }

    /// Include files under path prefixes through the host
    pub fn try_include(&mut self, plan: &IncludePlan) -> Result<()> {
        self.loader.try_include(&mut self.host, plan)?;
        Ok(())
    }

    /// Resolve modules and return their instances
    pub fn require<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<Value>> {
        Ok(self.loader.require(names, |values| values.to_vec())?)
    }

    /// Plan a resolution without running factories
    pub fn plan<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolutionPlan> {
        Ok(self.loader.plan(names)?)
    }

    /// The module loader
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Outcomes of `require` lists executed by scripts
    pub fn outcomes(&self) -> &[RequireOutcome] {
        self.host.outcomes()
    }

    /// Take and clear recorded outcomes
    pub fn take_outcomes(&mut self) -> Vec<RequireOutcome> {
        self.host.take_outcomes()
    }

    /// Forget every module, attempted batch and included script
    pub fn reset(&mut self) {
        self.loader.reset();
        self.host.reset();
    }
}
