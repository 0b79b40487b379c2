// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! External source loading.
//!
//! A [`SourceBatch`] names modules that must become defined and the
//! candidate locations whose source may define them. The loader asks a
//! [`SourceHost`] to include each location in turn until every module is
//! loaded or the locations run out.

use crate::error::{ModuleError, Result};
use crate::module_system::definition::validate_module_name;
use crate::module_system::loader::ModuleLoader;
use crate::module_system::registry::ModuleRegistry;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Custom "is this module loaded" test for a batch
pub type LoadCheck = Rc<dyn Fn(&ModuleRegistry, &str) -> bool>;

/// The host's blocking "load source from location" primitive.
///
/// Including a location may define modules and may load further externals
/// through the loader it is handed.
pub trait SourceHost {
    /// Execute the source found at `location` against `loader`
    fn include(&mut self, location: &str, loader: &mut ModuleLoader) -> Result<()>;
}

impl<F> SourceHost for F
where
    F: FnMut(&str, &mut ModuleLoader) -> Result<()>,
{
    fn include(&mut self, location: &str, loader: &mut ModuleLoader) -> Result<()> {
        self(location, loader)
    }
}

/// Modules to load plus the locations to try, in order
#[derive(Clone)]
pub struct SourceBatch {
    /// Modules that must be loaded once the batch is done
    pub modules: Vec<String>,
    /// Candidate locations, tried in order
    pub locations: Vec<String>,
    /// Replaces the loader's default check when set
    pub is_loaded: Option<LoadCheck>,
}

impl SourceBatch {
    /// Create a batch
    pub fn new<M, L>(modules: M, locations: L) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            locations: locations.into_iter().map(Into::into).collect(),
            is_loaded: None,
        }
    }

    /// Create a batch for one module and one location
    pub fn single(module: impl Into<String>, location: impl Into<String>) -> Self {
        Self::new([module.into()], [location.into()])
    }

    /// Use a custom loaded test
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&ModuleRegistry, &str) -> bool + 'static,
    {
        self.is_loaded = Some(Rc::new(check));
        self
    }

    fn validate(&self) -> Result<()> {
        for module in &self.modules {
            validate_module_name(module, "externals module")?;
        }
        if self.locations.iter().any(|l| l.trim().is_empty()) {
            return Err(ModuleError::invalid_argument(
                "externals locations must be non-empty strings",
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SourceBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBatch")
            .field("modules", &self.modules)
            .field("locations", &self.locations)
            .field("custom_check", &self.is_loaded.is_some())
            .finish()
    }
}

impl ModuleLoader {
    /// Make sure every batch's modules are loaded, including candidate
    /// locations through `host` as needed.
    ///
    /// Batches are processed in order and the first batch that cannot be
    /// satisfied aborts the call. A batch whose location list was attempted
    /// before is never loaded twice.
    pub fn load_externals<H>(&mut self, host: &mut H, batches: &[SourceBatch]) -> Result<()>
    where
        H: SourceHost + ?Sized,
    {
        for batch in batches {
            self.load_batch(host, batch)?;
        }
        Ok(())
    }

    fn load_batch<H>(&mut self, host: &mut H, batch: &SourceBatch) -> Result<()>
    where
        H: SourceHost + ?Sized,
    {
        batch.validate()?;

        if self.attempted.contains(&batch.locations) {
            let missing = self.unloaded(batch);
            if !missing.is_empty() {
                warn!(
                    locations = ?batch.locations,
                    missing = ?missing,
                    "Source batch already attempted; not loading again"
                );
            }
            return Ok(());
        }

        if self.unloaded(batch).is_empty() {
            debug!(modules = ?batch.modules, "Source batch already satisfied");
            return Ok(());
        }

        self.attempted.insert(batch.locations.clone());

        let mut causes = Vec::new();
        let mut missing = self.unloaded(batch);
        for location in &batch.locations {
            debug!(%location, "Loading external source");
            if let Err(err) = host.include(location, self) {
                warn!(%location, error = %err, "Failed to load external source");
                causes.push(err.to_string());
            }

            missing = self.unloaded(batch);
            if missing.is_empty() {
                info!(%location, modules = ?batch.modules, "Source batch loaded");
                return Ok(());
            }
        }

        Err(ModuleError::LoadFailure {
            location: batch
                .locations
                .last()
                .cloned()
                .unwrap_or_else(|| "<none>".to_string()),
            missing,
            causes,
        })
    }

    /// Modules of `batch` that are not loaded yet
    fn unloaded(&self, batch: &SourceBatch) -> Vec<String> {
        batch
            .modules
            .iter()
            .filter(|module| match &batch.is_loaded {
                Some(check) => !check(self.registry(), module.as_str()),
                None => !self.is_loaded(module),
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Callable, Value};
    use std::collections::HashMap;

    /// A host serving module definitions from memory
    #[derive(Default)]
    struct MemoryHost {
        sources: HashMap<String, Vec<(String, Vec<String>)>>,
        nested: HashMap<String, Vec<SourceBatch>>,
        log: Vec<String>,
    }

    impl MemoryHost {
        fn serve(mut self, location: &str, modules: &[(&str, &[&str])]) -> Self {
            self.sources.insert(
                location.to_string(),
                modules
                    .iter()
                    .map(|(name, deps)| {
                        (name.to_string(), deps.iter().map(|d| d.to_string()).collect())
                    })
                    .collect(),
            );
            self
        }

        fn nest(mut self, location: &str, batches: Vec<SourceBatch>) -> Self {
            self.nested.insert(location.to_string(), batches);
            self
        }
    }

    impl SourceHost for MemoryHost {
        fn include(&mut self, location: &str, loader: &mut ModuleLoader) -> Result<()> {
            self.log.push(location.to_string());
            if let Some(batches) = self.nested.get(location).cloned() {
                loader.load_externals(self, &batches)?;
            }
            let Some(modules) = self.sources.get(location).cloned() else {
                return Err(ModuleError::host(location, "not found"));
            };
            for (name, deps) in modules {
                let label = name.clone();
                loader.define(name, deps, Callable::anonymous(move |_| Ok(Value::from(label.as_str()))))?;
            }
            Ok(())
        }
    }

    #[test]
    fn test_falls_back_to_next_location() {
        let mut host = MemoryHost::default().serve("bad1", &[]).serve("bad2", &[("M", &[])]);
        let mut loader = ModuleLoader::new();

        loader
            .load_externals(&mut host, &[SourceBatch::new(["M"], ["bad1", "bad2"])])
            .unwrap();

        assert_eq!(host.log, vec!["bad1", "bad2"]);
        assert_eq!(loader.require_one("M").unwrap(), Value::from("M"));
    }

    #[test]
    fn test_stops_at_first_satisfying_location() {
        let mut host = MemoryHost::default()
            .serve("good", &[("M", &[])])
            .serve("spare", &[("M", &[])]);
        let mut loader = ModuleLoader::new();

        loader
            .load_externals(&mut host, &[SourceBatch::new(["M"], ["good", "spare"])])
            .unwrap();
        assert_eq!(host.log, vec!["good"]);
    }

    #[test]
    fn test_exhausted_locations_report_last_tried() {
        let mut host = MemoryHost::default().serve("bad1", &[]);
        let mut loader = ModuleLoader::new();

        let err = loader
            .load_externals(&mut host, &[SourceBatch::new(["M"], ["bad1", "bad2"])])
            .unwrap_err();

        match err {
            ModuleError::LoadFailure {
                location,
                missing,
                causes,
            } => {
                assert_eq!(location, "bad2");
                assert_eq!(missing, vec!["M"]);
                assert_eq!(causes, vec!["Error loading 'bad2': not found"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_attempted_batch_is_not_reloaded() {
        let mut host = MemoryHost::default().serve("bad1", &[]);
        let mut loader = ModuleLoader::new();
        let batch = SourceBatch::new(["M"], ["bad1"]);

        assert!(loader.load_externals(&mut host, &[batch.clone()]).is_err());
        assert!(loader.was_attempted(&["bad1"]));

        // Second request only warns
        loader.load_externals(&mut host, &[batch]).unwrap();
        assert_eq!(host.log, vec!["bad1"]);
    }

    #[test]
    fn test_satisfied_batch_skips_loading() {
        let mut host = MemoryHost::default();
        let mut loader = ModuleLoader::new();
        loader
            .define("M", Vec::<String>::new(), Callable::anonymous(|_| Ok(Value::Null)))
            .unwrap();

        loader
            .load_externals(&mut host, &[SourceBatch::single("M", "m.json")])
            .unwrap();
        assert!(host.log.is_empty());
        assert!(!loader.was_attempted(&["m.json"]));
    }

    #[test]
    fn test_custom_check() {
        let mut host = MemoryHost::default()
            .serve("first", &[("M", &[])])
            .serve("second", &[("M.ready", &[])]);
        let mut loader = ModuleLoader::new();
        let batch = SourceBatch::new(["M"], ["first", "second"])
            .with_check(|registry, name| registry.is_defined(&format!("{name}.ready")));

        loader.load_externals(&mut host, &[batch]).unwrap();
        assert_eq!(host.log, vec!["first", "second"]);
    }

    #[test]
    fn test_nested_externals() {
        let mut host = MemoryHost::default()
            .serve("outer", &[("Outer", &["Inner"])])
            .serve("inner", &[("Inner", &[])])
            .nest("outer", vec![SourceBatch::single("Inner", "inner")]);
        let mut loader = ModuleLoader::new();

        loader
            .load_externals(&mut host, &[SourceBatch::single("Outer", "outer")])
            .unwrap();

        assert_eq!(host.log, vec!["outer", "inner"]);
        assert_eq!(loader.require_one("Outer").unwrap(), Value::from("Outer"));
    }

    #[test]
    fn test_closure_host() {
        let mut loader = ModuleLoader::new();
        let mut host = |location: &str, loader: &mut ModuleLoader| {
            loader.define(location, Vec::<String>::new(), Callable::anonymous(|_| Ok(Value::Null)))
        };

        loader
            .load_externals(&mut host, &[SourceBatch::single("Lib", "Lib")])
            .unwrap();
        assert!(loader.is_defined("Lib"));
    }

    #[test]
    fn test_invalid_batch() {
        let mut loader = ModuleLoader::new();
        let mut host = MemoryHost::default();
        let err = loader
            .load_externals(&mut host, &[SourceBatch::new([""], ["a"])])
            .unwrap_err();
        assert!(matches!(err, ModuleError::InvalidArgument(_)));
    }

    #[test]
    fn test_load_failure_lists_only_unloaded_modules() {
        let mut loader = ModuleLoader::new();
        loader
            .define("A", Vec::<String>::new(), Callable::anonymous(|_| Ok(Value::Null)))
            .unwrap();
        let mut host = MemoryHost::default();

        let err = loader
            .load_externals(&mut host, &[SourceBatch::new(["A", "M"], Vec::<String>::new())])
            .unwrap_err();

        match err {
            ModuleError::LoadFailure {
                location,
                missing,
                causes,
            } => {
                assert_eq!(location, "<none>");
                assert_eq!(missing, vec!["M"]);
                assert!(causes.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(host.log.is_empty());
    }
}
