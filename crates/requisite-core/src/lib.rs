// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # requisite-core
//!
//! A module-dependency resolution and lazy-loading engine.
//!
//! Modules are declared with a name, the names of their dependencies and a
//! factory. Consumers request modules by name; the loader resolves the
//! transitive dependencies, runs each factory once in dependency order and
//! memoizes the results. Undeclared modules can be fetched from candidate
//! locations through a [`SourceHost`].
//!
//! ## Quick Start
//!
//! ```rust
//! use requisite_core::{ModuleLoader, Value};
//!
//! let mut loader = ModuleLoader::new();
//! loader.define_fn("Foo3", Vec::<String>::new(), |_| Ok(Value::from(3.0))).unwrap();
//! loader.define_fn("Foo2", ["Foo3"], |deps| Ok(deps[0].clone())).unwrap();
//!
//! let value = loader.require(&["Foo2"], |deps| deps[0].clone()).unwrap();
//! assert_eq!(value, Value::from(3.0));
//! ```
//!
//! ## Loading external sources
//!
//! ```rust
//! use requisite_core::{Callable, ModuleLoader, Result, SourceBatch, Value};
//!
//! let mut loader = ModuleLoader::new();
//! let mut host = |location: &str, loader: &mut ModuleLoader| -> Result<()> {
//!     if location == "vec3.json" {
//!         loader.define("vec3", Vec::<String>::new(), Callable::anonymous(|_| Ok(Value::object())))?;
//!     }
//!     Ok(())
//! };
//!
//! loader
//!     .load_externals(&mut host, &[SourceBatch::new(["vec3"], ["old/vec3.json", "vec3.json"])])
//!     .unwrap();
//! assert!(loader.is_defined("vec3"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod inject;
pub mod module_system;
pub mod object;
pub mod value;

pub use config::{LoadCheckMode, LoaderConfig, ResolvedRedefinition};
pub use error::{ModuleError, Result};
pub use inject::{InjectSource, Properties, inject, inject_object};
pub use module_system::{
    DependencyGraph, IncludeFile, IncludePlan, ModuleDefinition, ModuleLoader, ModuleRegistry,
    ResolutionPlan, SourceBatch, SourceHost,
};
pub use object::ObjectRef;
pub use value::{Callable, Value, ValueKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
