// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module resolution: runs factories in dependency order and memoizes them

use crate::error::{ModuleError, Result};
use crate::module_system::graph::DependencyGraph;
use crate::module_system::registry::ModuleRegistry;
use crate::value::Value;
use tracing::{debug, warn};

/// Resolves module names against a registry
pub struct Resolver<'a> {
    registry: &'a mut ModuleRegistry,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a registry
    pub fn new(registry: &'a mut ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Resolve a single module
    pub fn resolve(&mut self, name: &str) -> Result<Value> {
        if let Some(instance) = self.registry.instance(name) {
            return Ok(instance.clone());
        }
        let mut instances = self.resolve_all(&[name])?;
        instances
            .pop()
            .ok_or_else(|| ModuleError::missing([name]))
    }

    /// Resolve several modules at once.
    ///
    /// Everything that can be built is built and cached, even when some other
    /// name is missing; the error then lists every missing name.
    pub fn resolve_all<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<Value>> {
        let plan = DependencyGraph::new(self.registry).plan(names)?;

        self.instantiate(&plan.order)?;

        if !plan.is_complete() {
            debug!(missing = ?plan.missing, blocked = ?plan.blocked, "Unresolved modules");
            return Err(ModuleError::MissingDependencies {
                missing: plan.missing,
                blocked: plan.blocked,
            });
        }

        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.registry
                    .instance(name)
                    .cloned()
                    .ok_or_else(|| ModuleError::missing([name]))
            })
            .collect()
    }

    fn instantiate(&mut self, order: &[String]) -> Result<()> {
        for name in order {
            if self.registry.is_resolved(name) {
                continue;
            }
            let Some(definition) = self.registry.definition(name) else {
                continue;
            };

            let factory = definition.factory().clone();
            let args: Vec<Value> = definition
                .dependencies()
                .iter()
                .filter_map(|dep| self.registry.instance(dep).cloned())
                .collect();

            debug!(module = %name, args = args.len(), "Instantiating module");

            match factory.call(&args) {
                Ok(instance) => self.registry.store_instance(name.clone(), instance),
                Err(reason) => {
                    warn!(module = %name, %reason, "Module factory failed");
                    self.registry.record_failure(name.clone(), reason.clone());
                    return Err(ModuleError::FactoryFailed {
                        module: name.clone(),
                        reason,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module_system::definition::ModuleDefinition;
    use crate::object::ObjectRef;
    use crate::value::Callable;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn define(registry: &mut ModuleRegistry, name: &str, deps: &[&str], factory: Callable) {
        registry.insert_definition(
            ModuleDefinition::new(
                name.to_string(),
                deps.iter().map(|d| d.to_string()).collect(),
                factory,
            )
            .unwrap(),
        );
    }

    /// A factory that logs its name and returns a fresh object
    fn logging(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Callable {
        let log = Rc::clone(log);
        Callable::new(name, move |_| {
            log.borrow_mut().push(name.to_string());
            Ok(Value::Object(ObjectRef::new()))
        })
    }

    #[test]
    fn test_resolve_is_memoized() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        define(&mut registry, "X", &[], logging("X", &log));

        let mut resolver = Resolver::new(&mut registry);
        let first = resolver.resolve("X").unwrap();
        let second = resolver.resolve("X").unwrap();

        assert!(first.same(&second));
        assert_eq!(*log.borrow(), vec!["X"]);
    }

    #[test]
    fn test_factory_runs_once_when_shared() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        define(&mut registry, "Foo3", &[], logging("Foo3", &log));
        define(&mut registry, "Foo2", &["Foo3"], logging("Foo2", &log));
        define(&mut registry, "Foo1", &["Foo2", "Foo3"], logging("Foo1", &log));
        define(
            &mut registry,
            "FooService",
            &["Foo1", "Foo2", "Foo3"],
            logging("FooService", &log),
        );

        Resolver::new(&mut registry).resolve("FooService").unwrap();
        assert_eq!(*log.borrow(), vec!["Foo3", "Foo2", "Foo1", "FooService"]);
    }

    #[test]
    fn test_factory_receives_dependencies_in_order() {
        let mut registry = ModuleRegistry::new();
        define(&mut registry, "A", &[], Callable::anonymous(|_| Ok(Value::from("a"))));
        define(&mut registry, "B", &[], Callable::anonymous(|_| Ok(Value::from("b"))));
        define(
            &mut registry,
            "AB",
            &["A", "B"],
            Callable::anonymous(|args| {
                let joined: String = args.iter().filter_map(Value::as_str).collect();
                Ok(Value::from(joined))
            })
            .with_arity(2),
        );

        let value = Resolver::new(&mut registry).resolve("AB").unwrap();
        assert_eq!(value, Value::from("ab"));
    }

    #[test]
    fn test_partial_subtrees_are_still_built() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        define(&mut registry, "A", &[], logging("A", &log));
        define(&mut registry, "X", &["A", "Missing"], logging("X", &log));

        let err = Resolver::new(&mut registry).resolve("X").unwrap_err();
        assert_eq!(
            err,
            ModuleError::MissingDependencies {
                missing: vec!["Missing".into()],
                blocked: vec!["X".into()],
            }
        );
        assert_eq!(*log.borrow(), vec!["A"]);
        assert!(registry.is_resolved("A"));
        assert!(!registry.is_resolved("X"));
    }

    #[test]
    fn test_undefined_name() {
        let mut registry = ModuleRegistry::new();
        let err = Resolver::new(&mut registry).resolve("Z").unwrap_err();
        assert_eq!(err.missing_names(), ["Z".to_string()]);
    }

    #[test]
    fn test_cycle_does_not_run_factories() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        define(&mut registry, "A", &["B"], logging("A", &log));
        define(&mut registry, "B", &["A"], logging("B", &log));

        let mut resolver = Resolver::new(&mut registry);
        assert!(matches!(
            resolver.resolve("A"),
            Err(ModuleError::CyclicDependency { .. })
        ));
        assert!(matches!(
            resolver.resolve("B"),
            Err(ModuleError::CyclicDependency { .. })
        ));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_failed_factory_is_not_retried() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let mut registry = ModuleRegistry::new();
        define(
            &mut registry,
            "Broken",
            &[],
            Callable::anonymous(move |_| {
                *counter.borrow_mut() += 1;
                Err("no vec3 available".to_string())
            }),
        );

        let mut resolver = Resolver::new(&mut registry);
        for _ in 0..2 {
            let err = resolver.resolve("Broken").unwrap_err();
            assert_eq!(
                err,
                ModuleError::FactoryFailed {
                    module: "Broken".into(),
                    reason: "no vec3 available".into(),
                }
            );
        }
        assert_eq!(*calls.borrow(), 1);
    }
}
