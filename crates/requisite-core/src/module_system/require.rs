// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The require() entry point

use crate::error::Result;
use crate::module_system::definition::validate_module_name;
use crate::module_system::graph::DependencyGraph;
use crate::module_system::loader::ModuleLoader;
use crate::module_system::resolver::Resolver;
use crate::value::Value;
use tracing::warn;

/// Resolve `names` and run `continuation` with the instances.
///
/// Instances are passed positionally matching `names`. Resolution is
/// all-or-nothing: when any name cannot be resolved the error lists every
/// missing name and `continuation` is never called.
pub fn require<S, F, R>(loader: &mut ModuleLoader, names: &[S], continuation: F) -> Result<R>
where
    S: AsRef<str>,
    F: FnOnce(&[Value]) -> R,
{
    for name in names {
        validate_module_name(name.as_ref(), "require() dependency")?;
    }

    match Resolver::new(loader.registry_mut()).resolve_all(names) {
        Ok(instances) => Ok(continuation(&instances)),
        Err(err) => {
            warn!("require() failed: {}", err);
            Err(err)
        }
    }
}

/// Resolve a single module.
pub fn require_one(loader: &mut ModuleLoader, name: &str) -> Result<Value> {
    validate_module_name(name, "require() dependency")?;
    Resolver::new(loader.registry_mut()).resolve(name)
}

/// Check whether `name` could be resolved right now, without running factories.
pub fn require_resolvable(loader: &ModuleLoader, name: &str) -> bool {
    let registry = loader.registry();
    registry.is_resolved(name)
        || DependencyGraph::new(registry)
            .plan(&[name])
            .is_ok_and(|plan| plan.is_complete())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use crate::value::Callable;
    use std::cell::Cell;
    use std::rc::Rc;

    fn loader() -> ModuleLoader {
        let mut loader = ModuleLoader::new();
        loader
            .define("A", Vec::<String>::new(), Callable::anonymous(|_| Ok(Value::object())))
            .unwrap();
        loader
            .define(
                "B",
                ["A"],
                Callable::anonymous(|args| {
                    let b = Value::object();
                    if let Some(obj) = b.as_object() {
                        obj.set("a", args[0].clone());
                    }
                    Ok(b)
                }),
            )
            .unwrap();
        loader
    }

    #[test]
    fn test_require_shares_instances() {
        let mut loader = loader();

        let a_inside_b = require(&mut loader, &["B"], |deps| {
            deps[0].as_object().and_then(|b| b.get("a")).unwrap()
        })
        .unwrap();
        let a = require(&mut loader, &["A"], |deps| deps[0].clone()).unwrap();

        assert!(a.same(&a_inside_b));
    }

    #[test]
    fn test_require_positional_instances() {
        let mut loader = loader();
        let (first, second) =
            require(&mut loader, &["A", "B"], |deps| (deps[0].clone(), deps[1].clone())).unwrap();

        assert!(first.same(&require_one(&mut loader, "A").unwrap()));
        assert!(second.same(&require_one(&mut loader, "B").unwrap()));
    }

    #[test]
    fn test_missing_module_never_calls_continuation() {
        let mut loader = loader();
        let called = Rc::new(Cell::new(false));
        let flag = Rc::clone(&called);

        let err = require(&mut loader, &["Z"], move |_| flag.set(true)).unwrap_err();

        assert_eq!(err.missing_names(), ["Z".to_string()]);
        assert!(!called.get());
    }

    #[test]
    fn test_all_missing_names_reported_at_once() {
        let mut loader = loader();
        let err = require(&mut loader, &["X", "A", "Y"], |_| ()).unwrap_err();
        assert_eq!(err.missing_names(), ["X".to_string(), "Y".to_string()]);
        // A was still built
        assert!(loader.is_resolved("A"));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut loader = loader();
        let err = require(&mut loader, &["A", ""], |_| ()).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidArgument(_)));
        assert!(!loader.is_resolved("A"));
    }

    #[test]
    fn test_require_resolvable() {
        let mut loader = loader();
        loader
            .define("C", ["Nope"], Callable::anonymous(|_| Ok(Value::Null)))
            .unwrap();

        assert!(require_resolvable(&loader, "B"));
        assert!(!require_resolvable(&loader, "C"));
        assert!(!require_resolvable(&loader, "Nope"));
        // Planning never runs factories
        assert!(!loader.is_resolved("A"));
    }
}
