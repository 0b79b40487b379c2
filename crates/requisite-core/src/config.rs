// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration.

use crate::error::{ModuleError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What happens when a module that already has a resolved instance is defined again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolvedRedefinition {
    /// Keep the cached instance, drop the new definition and warn
    #[default]
    Ignore,
    /// Fail with [`ModuleError::AlreadyResolved`]
    Reject,
}

impl FromStr for ResolvedRedefinition {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(ModuleError::invalid_argument(format!(
                "unknown redefinition policy '{}' (expected 'ignore' or 'reject')",
                other
            ))),
        }
    }
}

/// Default test used by the external source loader to decide whether a
/// required module has been loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadCheckMode {
    /// The module has a definition (it may still be unresolved)
    #[default]
    Defined,
    /// The module is resolved, or its whole dependency tree is defined
    Resolvable,
}

impl FromStr for LoadCheckMode {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "defined" => Ok(Self::Defined),
            "resolvable" => Ok(Self::Resolvable),
            other => Err(ModuleError::invalid_argument(format!(
                "unknown load check '{}' (expected 'defined' or 'resolvable')",
                other
            ))),
        }
    }
}

/// Configuration for a [`ModuleLoader`](crate::ModuleLoader).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoaderConfig {
    /// Policy for redefining already-resolved modules
    pub resolved_redefinition: ResolvedRedefinition,

    /// Default loaded check for source batches without their own check
    pub load_check: LoadCheckMode,
}

impl LoaderConfig {
    /// Set a configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "resolved-redefinition" => self.resolved_redefinition = value.parse()?,
            "load-check" => self.load_check = value.parse()?,
            other => {
                return Err(ModuleError::invalid_argument(format!(
                    "unknown loader setting '{}'",
                    other
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.resolved_redefinition, ResolvedRedefinition::Ignore);
        assert_eq!(config.load_check, LoadCheckMode::Defined);
    }

    #[test]
    fn test_set() {
        let mut config = LoaderConfig::default();
        config.set("resolved-redefinition", "Reject").unwrap();
        config.set("load-check", "resolvable").unwrap();
        assert_eq!(config.resolved_redefinition, ResolvedRedefinition::Reject);
        assert_eq!(config.load_check, LoadCheckMode::Resolvable);

        assert!(config.set("load-check", "sometimes").is_err());
        assert!(config.set("colour", "blue").is_err());
    }
}
