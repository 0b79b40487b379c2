// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module registry: pending definitions and the resolved cache

use crate::module_system::definition::ModuleDefinition;
use crate::value::Value;
use rustc_hash::FxHashMap;

/// Pending module definitions plus the cache of resolved instances.
///
/// A resolved entry is written once, the first time its module resolves, and
/// is only dropped by [`ModuleRegistry::clear`].
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    /// Definitions by module name
    definitions: FxHashMap<String, ModuleDefinition>,
    /// Resolved instances by module name
    resolved: FxHashMap<String, Value>,
    /// Factories that returned an error, with the reason
    failed: FxHashMap<String, String>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a definition, returning the one it replaced
    pub(crate) fn insert_definition(
        &mut self,
        definition: ModuleDefinition,
    ) -> Option<ModuleDefinition> {
        let name = definition.name().to_string();
        self.failed.remove(&name);
        self.definitions.insert(name, definition)
    }

    /// Store a resolved instance
    pub(crate) fn store_instance(&mut self, name: String, instance: Value) {
        debug_assert!(!self.resolved.contains_key(&name), "module resolved twice");
        self.resolved.insert(name, instance);
    }

    /// Record that a module's factory failed
    pub(crate) fn record_failure(&mut self, name: String, reason: String) {
        self.failed.insert(name, reason);
    }

    /// Get a module definition
    pub fn definition(&self, name: &str) -> Option<&ModuleDefinition> {
        self.definitions.get(name)
    }

    /// Get a resolved instance
    pub fn instance(&self, name: &str) -> Option<&Value> {
        self.resolved.get(name)
    }

    /// Reason a module's factory failed, if it did
    pub fn failure(&self, name: &str) -> Option<&str> {
        self.failed.get(name).map(String::as_str)
    }

    /// Check if a module has been declared
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name) || self.resolved.contains_key(name)
    }

    /// Check if a module has a resolved instance
    pub fn is_resolved(&self, name: &str) -> bool {
        self.resolved.contains_key(name)
    }

    /// All declared module names, sorted
    pub fn defined_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.definitions.keys().cloned().collect();
        names.sort();
        names
    }

    /// All resolved module names, sorted
    pub fn resolved_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resolved.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of declared modules
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if no module has been declared
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Drop every definition, instance and failure
    pub fn clear(&mut self) {
        self.definitions.clear();
        self.resolved.clear();
        self.failed.clear();
    }
}
