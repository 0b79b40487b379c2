// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # requisite-script
//!
//! A filesystem-backed host for the `requisite` module loader.
//!
//! Module scripts are JSON documents that include other scripts, load
//! external sources from fallback locations, declare modules and require
//! them. [`ScriptRuntime`] owns a loader together with the [`ScriptHost`]
//! that executes scripts into it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use requisite_script::{Config, ScriptRuntime};
//! use std::path::Path;
//!
//! fn main() -> requisite_script::Result<()> {
//!     let config = Config::load(None)?;
//!     let mut runtime = ScriptRuntime::new(&config);
//!     runtime.run_file(Path::new("boids.json"))?;
//!     let boid = runtime.require(&["Boid"])?;
//!     println!("{}", boid[0]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod host;
pub mod runtime;
pub mod script;

pub use config::Config;
pub use error::{Result, ScriptError};
pub use host::{RequireOutcome, ScriptHost};
pub use runtime::ScriptRuntime;
pub use script::ModuleScript;
