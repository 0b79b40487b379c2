// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The module loader: owns the registry and every piece of loader state

use crate::config::{LoadCheckMode, LoaderConfig, ResolvedRedefinition};
use crate::error::{ModuleError, Result};
use crate::module_system::definition::ModuleDefinition;
use crate::module_system::graph::{DependencyGraph, ResolutionPlan};
use crate::module_system::registry::ModuleRegistry;
use crate::module_system::require;
use crate::value::{Callable, Value};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// Module loader.
///
/// Holds definitions, resolved instances, failed factories and the set of
/// source batches already attempted. Applications create and own loaders
/// explicitly; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct ModuleLoader {
    registry: ModuleRegistry,
    /// Location lists of batches already attempted
    pub(crate) attempted: FxHashSet<Vec<String>>,
    config: LoaderConfig,
}

impl ModuleLoader {
    /// Create a loader with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with a specific configuration
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The underlying registry
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    /// Declare a module.
    ///
    /// Never runs the factory. Redefining a pending module replaces it;
    /// redefining a resolved one follows
    /// [`LoaderConfig::resolved_redefinition`].
    pub fn define<N, I>(&mut self, name: N, dependencies: I, factory: Callable) -> Result<()>
    where
        N: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let definition = ModuleDefinition::new(
            name.into(),
            dependencies.into_iter().map(Into::into).collect(),
            factory,
        )?;
        let name = definition.name().to_string();

        if self.registry.is_resolved(&name) {
            return match self.config.resolved_redefinition {
                ResolvedRedefinition::Ignore => {
                    warn!(module = %name, "Overriding define() of a resolved module; keeping the cached instance");
                    Ok(())
                }
                ResolvedRedefinition::Reject => Err(ModuleError::AlreadyResolved(name)),
            };
        }

        debug!(module = %name, deps = ?definition.dependencies(), "define()");
        if self.registry.insert_definition(definition).is_some() {
            warn!(module = %name, "Overriding define()");
        }
        Ok(())
    }

    /// Declare a module from a plain closure taking one argument per dependency
    pub fn define_fn<N, I, F>(&mut self, name: N, dependencies: I, factory: F) -> Result<()>
    where
        N: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
        F: Fn(&[Value]) -> std::result::Result<Value, String> + 'static,
    {
        let name = name.into();
        let dependencies: Vec<String> = dependencies.into_iter().map(Into::into).collect();
        let factory = Callable::new(name.clone(), factory).with_arity(dependencies.len());
        self.define(name, dependencies, factory)
    }

    /// Resolve `names` and run `continuation` with their instances
    pub fn require<S, F, R>(&mut self, names: &[S], continuation: F) -> Result<R>
    where
        S: AsRef<str>,
        F: FnOnce(&[Value]) -> R,
    {
        require::require(self, names, continuation)
    }

    /// Resolve a single module
    pub fn require_one(&mut self, name: &str) -> Result<Value> {
        require::require_one(self, name)
    }

    /// Plan the resolution of `names` without running any factory
    pub fn plan<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolutionPlan> {
        DependencyGraph::new(&self.registry).plan(names)
    }

    /// Check if a module has been declared
    pub fn is_defined(&self, name: &str) -> bool {
        self.registry.is_defined(name)
    }

    /// Check if a module has a resolved instance
    pub fn is_resolved(&self, name: &str) -> bool {
        self.registry.is_resolved(name)
    }

    /// The default loaded test applied to source batches
    pub fn is_loaded(&self, name: &str) -> bool {
        match self.config.load_check {
            LoadCheckMode::Defined => self.registry.is_defined(name),
            LoadCheckMode::Resolvable => require::require_resolvable(self, name),
        }
    }

    /// Whether a batch with these locations was already attempted
    pub fn was_attempted<S: AsRef<str>>(&self, locations: &[S]) -> bool {
        let key: Vec<String> = locations.iter().map(|l| l.as_ref().to_string()).collect();
        self.attempted.contains(&key)
    }

    /// Drop all definitions, instances, failures and attempted batches
    pub fn reset(&mut self) {
        debug!("Resetting module loader");
        self.registry.clear();
        self.attempted.clear();
    }
}
