// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! AMD-style module system
//!
//! ## Declaring
//! - `define(name, dependencies, factory)` registers a module without running it
//! - Redefinitions of pending modules replace the earlier definition
//!
//! ## Resolving
//! - `require(names, continuation)` resolves every name, then runs the continuation
//! - Factories run once, dependencies first, in declared order
//! - Cycles and missing modules are reported, never recursed into
//!
//! ## Loading
//! - `load_externals(host, batches)` includes candidate locations until
//!   the required modules are defined
//! - `try_include(host, plan)` includes files under a list of path prefixes

mod definition;
mod externals;
mod graph;
mod include;
mod loader;
mod registry;
mod require;
mod resolver;

pub use definition::{ModuleDefinition, is_valid_module_name};
pub use externals::{LoadCheck, SourceBatch, SourceHost};
pub use graph::{DependencyGraph, ResolutionPlan};
pub use include::{IncludeCheck, IncludeFile, IncludePlan};
pub use loader::ModuleLoader;
pub use registry::ModuleRegistry;
pub use require::{require, require_one, require_resolvable};
pub use resolver::Resolver;
