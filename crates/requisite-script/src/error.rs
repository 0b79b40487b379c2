// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the script host

use std::path::PathBuf;
use thiserror::Error;

/// Result type for script host operations
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Errors that can occur while locating, parsing or executing module scripts
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Module system error
    #[error("{0}")]
    Module(#[from] requisite_core::ModuleError),

    /// File system error
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),

    /// Malformed module script
    #[error("Invalid module script '{}': {source}", .path.display())]
    Parse {
        /// Script path
        path: PathBuf,
        /// Parser error
        source: serde_json::Error,
    },

    /// Malformed configuration file
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// No file exists for a location
    #[error("Cannot find '{0}'")]
    LocationNotFound(String),

    /// Location uses a scheme the host cannot load
    #[error("Unsupported location '{location}': {reason}")]
    UnsupportedLocation {
        /// The location as written
        location: String,
        /// Why it was refused
        reason: String,
    },

    /// A script included itself, directly or transitively
    #[error("Include cycle detected: {}", .chain.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    IncludeCycle {
        /// Scripts on the include stack, ending with the repeated one
        chain: Vec<PathBuf>,
    },

    /// A `define` entry that cannot become a module
    #[error("Invalid definition of '{module}': {reason}")]
    InvalidDefinition {
        /// Module name
        module: String,
        /// Reason
        reason: String,
    },
}

impl ScriptError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unsupported location error
    pub fn unsupported(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedLocation {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
