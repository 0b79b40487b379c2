// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module script format.
//!
//! A module script is a JSON document whose sections run in a fixed order:
//!
//! ```json
//! {
//!   "include": ["common.json"],
//!   "externals": [{ "modules": ["vec3"], "urls": ["lib/vec3.json", "vendor/vec3.json"] }],
//!   "try_include": { "files": [{ "src": "flock.json", "defines": ["Flock"] }], "paths": ["lib/", ""] },
//!   "define": [{ "name": "Boid", "deps": ["vec3"], "exports": { "speed": 2 }, "extends": ["vec3"] }],
//!   "require": [["Boid"]]
//! }
//! ```

use crate::error::{Result, ScriptError};
use requisite_core::{
    Callable, IncludeFile, IncludePlan, InjectSource, ObjectRef, SourceBatch, Value, inject_object,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A parsed module script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModuleScript {
    /// Locations executed unconditionally, in order
    pub include: Vec<String>,
    /// Source batches handed to the external source loader
    pub externals: Vec<ExternalSpec>,
    /// Multi-prefix includes
    pub try_include: Option<TryIncludeSpec>,
    /// Module declarations
    pub define: Vec<DefineSpec>,
    /// Requirement lists, each resolved as one `require()` call
    pub require: Vec<Vec<String>>,
}

impl ModuleScript {
    /// Parse a script read from `path`
    pub fn parse(path: &Path, source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|source| ScriptError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Source batches for the `externals` section
    pub fn batches(&self) -> Result<Vec<SourceBatch>> {
        self.externals.iter().map(ExternalSpec::to_batch).collect()
    }

    /// Include plan for the `try_include` section
    pub fn include_plan(&self) -> Option<IncludePlan> {
        self.try_include.as_ref().map(TryIncludeSpec::to_plan)
    }
}

/// One entry of the `externals` section.
///
/// `module` and `url` are single-entry shorthands for `modules` and `urls`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalSpec {
    /// Modules that must be defined afterwards
    pub modules: Vec<String>,
    /// Shorthand for a single module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Candidate locations
    pub urls: Vec<String>,
    /// Shorthand for a single location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ExternalSpec {
    /// Build the source batch
    pub fn to_batch(&self) -> Result<SourceBatch> {
        let modules = pick(&self.modules, &self.module);
        let urls = pick(&self.urls, &self.url);
        if urls.is_empty() && !modules.is_empty() {
            return Err(ScriptError::Module(requisite_core::ModuleError::invalid_argument(
                format!("externals for {} list no urls", modules.join(", ")),
            )));
        }
        Ok(SourceBatch::new(modules, urls))
    }
}

fn pick(list: &[String], single: &Option<String>) -> Vec<String> {
    if list.is_empty() {
        single.iter().cloned().collect()
    } else {
        list.to_vec()
    }
}

/// The `try_include` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TryIncludeSpec {
    /// Files to include
    pub files: Vec<IncludeSpec>,
    /// Path prefixes tried for every file
    pub paths: Vec<String>,
}

impl TryIncludeSpec {
    fn to_plan(&self) -> IncludePlan {
        let files = self
            .files
            .iter()
            .map(|file| {
                let include = IncludeFile::new(file.src.clone());
                if file.defines.is_empty() {
                    include
                } else {
                    include.defining(file.defines.clone())
                }
            })
            .collect();
        IncludePlan::new(files, self.paths.clone())
    }
}

/// A file of the `try_include` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncludeSpec {
    /// Location under each prefix
    pub src: String,
    /// Modules the file must define to count as loaded
    pub defines: Vec<String>,
}

/// One entry of the `define` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefineSpec {
    /// Module name
    pub name: String,
    /// Dependency names
    #[serde(alias = "dependencies")]
    pub deps: Vec<String>,
    /// Properties of the instance
    pub exports: serde_json::Map<String, serde_json::Value>,
    /// Dependencies whose own properties are shimmed into the instance
    pub extends: Vec<String>,
}

impl DefineSpec {
    /// Build the module factory.
    ///
    /// Each call produces a fresh object holding the exports, every
    /// dependency under its own name, and the properties of each `extends`
    /// dependency that the object does not already provide.
    pub fn factory(&self) -> Result<Callable> {
        let mut extends = Vec::with_capacity(self.extends.len());
        for name in &self.extends {
            let Some(index) = self.deps.iter().position(|dep| dep == name) else {
                return Err(ScriptError::InvalidDefinition {
                    module: self.name.clone(),
                    reason: format!("extends '{}' which is not a dependency", name),
                });
            };
            extends.push(index);
        }

        let deps = self.deps.clone();
        let exports: Vec<(String, serde_json::Value)> = self
            .exports
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let factory = Callable::new(self.name.clone(), move |args| {
            let instance = ObjectRef::new();
            for (key, value) in &exports {
                instance.set(key.clone(), json_to_value(value));
            }
            for (dep, value) in deps.iter().zip(args) {
                instance.set(dep.clone(), value.clone());
            }
            for &index in &extends {
                let Some(base) = args[index].as_object() else {
                    return Err(format!(
                        "cannot extend '{}': it is {}, not an object",
                        deps[index],
                        args[index].kind()
                    ));
                };
                inject_object(&instance, InjectSource::from_object(base), false)
                    .map_err(|err| err.to_string())?;
            }
            Ok(Value::Object(instance))
        });

        Ok(factory.with_arity(self.deps.len()))
    }
}

/// Convert JSON data to a module value
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Object(ObjectRef::from_entries(
            map.iter().map(|(k, v)| (k.clone(), json_to_value(v))),
        )),
    }
}
