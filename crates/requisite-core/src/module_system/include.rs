// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Multi-prefix include helper

use crate::error::{ModuleError, Result};
use crate::module_system::externals::SourceHost;
use crate::module_system::loader::ModuleLoader;
use crate::module_system::registry::ModuleRegistry;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Test run after including a file to decide whether it loaded correctly
pub type IncludeCheck = Rc<dyn Fn(&ModuleRegistry) -> bool>;

/// One file to include
#[derive(Clone)]
pub struct IncludeFile {
    /// Location relative to each path prefix
    pub src: String,
    /// Optional post-include check
    pub check: Option<IncludeCheck>,
}

impl IncludeFile {
    /// A file with no check: the first successful include counts
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            check: None,
        }
    }

    /// Attach a check
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&ModuleRegistry) -> bool + 'static,
    {
        self.check = Some(Rc::new(check));
        self
    }

    /// Check that every one of `modules` is defined after the include
    pub fn defining<I>(self, modules: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let modules: Vec<String> = modules.into_iter().map(Into::into).collect();
        self.with_check(move |registry| modules.iter().all(|m| registry.is_defined(m)))
    }
}

impl fmt::Debug for IncludeFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncludeFile")
            .field("src", &self.src)
            .field("check", &self.check.is_some())
            .finish()
    }
}

/// Files plus the path prefixes to try for each of them
#[derive(Debug, Clone, Default)]
pub struct IncludePlan {
    /// Files, included in order
    pub files: Vec<IncludeFile>,
    /// Prefixes prepended to each file's `src`, tried in order
    pub paths: Vec<String>,
}

impl IncludePlan {
    /// Create a plan
    pub fn new(files: Vec<IncludeFile>, paths: Vec<String>) -> Self {
        Self { files, paths }
    }
}

impl ModuleLoader {
    /// Include every file of `plan`, trying each path prefix in order until
    /// the file's check passes.
    ///
    /// Failed includes and failed checks move on to the next prefix. When any
    /// file never passes, fails with [`ModuleError::IncludeFailed`] listing
    /// every such file and every failed attempt.
    pub fn try_include<H>(&mut self, host: &mut H, plan: &IncludePlan) -> Result<()>
    where
        H: SourceHost + ?Sized,
    {
        let empty = [String::new()];
        let paths: &[String] = if plan.paths.is_empty() {
            &empty
        } else {
            &plan.paths
        };

        let mut failed = Vec::new();
        let mut details = Vec::new();

        for file in &plan.files {
            let mut loaded = false;
            for prefix in paths {
                let location = format!("{}{}", prefix, file.src);
                debug!(%location, "Trying include");

                if let Err(err) = host.include(&location, self) {
                    details.push(err.to_string());
                    continue;
                }

                let passed = file
                    .check
                    .as_ref()
                    .is_none_or(|check| check(self.registry()));
                if passed {
                    loaded = true;
                    break;
                }
                details.push(format!("include check failed for {} ({})", file.src, location));
            }

            if !loaded {
                warn!(file = %file.src, "Failed to include file");
                failed.push(file.src.clone());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ModuleError::IncludeFailed {
                files: failed,
                details,
            })
        }
    }
}
