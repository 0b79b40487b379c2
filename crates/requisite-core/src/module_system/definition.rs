// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module definitions awaiting resolution

use crate::error::{ModuleError, Result};
use crate::value::Callable;

/// A declared module: its name, ordered dependency names and factory.
#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    name: String,
    dependencies: Vec<String>,
    factory: Callable,
}

impl ModuleDefinition {
    /// Create a validated definition.
    ///
    /// The name and every dependency must be valid module names. A factory
    /// with a fixed arity must accept exactly one argument per dependency.
    pub fn new(name: String, dependencies: Vec<String>, factory: Callable) -> Result<Self> {
        validate_module_name(&name, "define() name")?;
        for dep in &dependencies {
            validate_module_name(dep, "define() dependency")?;
        }
        if let Some(arity) = factory.arity {
            if arity != dependencies.len() {
                return Err(ModuleError::invalid_argument(format!(
                    "define('{}'): factory takes {} argument(s) but {} dependencies were declared",
                    name,
                    arity,
                    dependencies.len()
                )));
            }
        }
        Ok(Self {
            name,
            dependencies,
            factory,
        })
    }

    /// The module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dependency names in declared order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// The factory invoked with resolved dependencies
    pub fn factory(&self) -> &Callable {
        &self.factory
    }
}

/// Check whether a string can name a module.
///
/// Names are non-empty and contain no whitespace or control characters.
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control())
}

pub(crate) fn validate_module_name(name: &str, role: &str) -> Result<()> {
    if is_valid_module_name(name) {
        Ok(())
    } else {
        Err(ModuleError::invalid_argument(format!(
            "{} must be a non-empty module name, not {:?}",
            role, name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn factory() -> Callable {
        Callable::anonymous(|_| Ok(Value::Undefined))
    }

    #[test]
    fn test_module_names() {
        assert!(is_valid_module_name("FooService"));
        assert!(is_valid_module_name("vec3.utils"));
        assert!(is_valid_module_name("@scope/name"));
        assert!(!is_valid_module_name(""));
        assert!(!is_valid_module_name("Foo Service"));
        assert!(!is_valid_module_name("Foo\n"));
    }

    #[test]
    fn test_new_definition() {
        let def = ModuleDefinition::new(
            "Foo1".into(),
            vec!["Foo2".into(), "Foo3".into()],
            factory(),
        )
        .unwrap();
        assert_eq!(def.name(), "Foo1");
        assert_eq!(def.dependencies(), ["Foo2".to_string(), "Foo3".to_string()]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let err = ModuleDefinition::new(String::new(), vec![], factory()).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidArgument(_)));

        let err = ModuleDefinition::new("Foo".into(), vec!["".into()], factory()).unwrap_err();
        assert!(err.to_string().contains("define() dependency"));
    }

    #[test]
    fn test_factory_arity_must_match() {
        let err = ModuleDefinition::new(
            "Foo".into(),
            vec!["Bar".into()],
            factory().with_arity(2),
        )
        .unwrap_err();
        assert!(err.to_string().contains("takes 2 argument(s)"));

        assert!(ModuleDefinition::new("Foo".into(), vec!["Bar".into()], factory().with_arity(1)).is_ok());
    }
}
