// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module system

use std::fmt;
use thiserror::Error;

/// Result type for module system operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Errors that can occur while defining, loading or resolving modules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleError {
    /// Malformed call to `define`, `require`, `inject` or a source batch
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// One or more requested modules cannot be resolved
    #[error("Missing dependencies: {}", .missing.join(", "))]
    MissingDependencies {
        /// Names that have neither a definition nor a resolved instance
        missing: Vec<String>,
        /// Defined modules that could not be built because of `missing`
        blocked: Vec<String>,
    },

    /// A resolution chain revisited a module already in progress
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// The chain of names, starting and ending with the repeated module
        cycle: Vec<String>,
    },

    /// Every candidate location was tried without defining the required modules
    #[error("Tried to load '{location}'; missing modules: {}", .missing.join(", "))]
    LoadFailure {
        /// The last location tried
        location: String,
        /// Required modules still not loaded
        missing: Vec<String>,
        /// Host errors reported for individual locations
        causes: Vec<String>,
    },

    /// A module factory returned an error
    #[error("Factory for module '{module}' failed: {reason}")]
    FactoryFailed {
        /// Module whose factory failed
        module: String,
        /// Message returned by the factory
        reason: String,
    },

    /// A resolved module was redefined while redefinition is rejected
    #[error("Module '{0}' is already resolved and cannot be redefined")]
    AlreadyResolved(String),

    /// The include helper could not load one or more files
    #[error("Failed to load {} file(s): {}", .files.len(), .files.join(", "))]
    IncludeFailed {
        /// Files that were never loaded
        files: Vec<String>,
        /// One line per failed attempt or check
        details: Vec<String>,
    },

    /// The host failed to include a location
    #[error("Error loading '{location}': {reason}")]
    Host {
        /// Location passed to the host
        location: String,
        /// Host-provided reason
        reason: String,
    },
}

impl ModuleError {
    /// Create a new InvalidArgument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a MissingDependencies error for a set of undefined names
    pub fn missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingDependencies {
            missing: names.into_iter().map(Into::into).collect(),
            blocked: Vec::new(),
        }
    }

    /// Create a host error for a location
    pub fn host(location: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Host {
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Names reported as missing, if this is a missing-module error
    pub fn missing_names(&self) -> &[String] {
        match self {
            Self::MissingDependencies { missing, .. } | Self::LoadFailure { missing, .. } => {
                missing
            }
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependencies_message_lists_every_name() {
        let err = ModuleError::missing(["Foo1", "Foo2"]);
        assert_eq!(err.to_string(), "Missing dependencies: Foo1, Foo2");
        assert_eq!(err.missing_names(), ["Foo1".to_string(), "Foo2".to_string()]);
    }

    #[test]
    fn test_cycle_message() {
        let err = ModuleError::CyclicDependency {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> A");
    }

    #[test]
    fn test_load_failure_message() {
        let err = ModuleError::LoadFailure {
            location: "bad2".into(),
            missing: vec!["M".into()],
            causes: Vec::new(),
        };
        assert_eq!(err.to_string(), "Tried to load 'bad2'; missing modules: M");
        assert_eq!(err.missing_names(), ["M".to_string()]);
    }
}
