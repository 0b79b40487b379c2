// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Dependency graph over the module registry.
//!
//! Nodes are module names and edges point from a module to each of its
//! declared dependencies. Planning walks the graph depth first with an
//! explicit stack, so arbitrarily deep chains never touch the native call
//! stack, and reports cycles through the in-progress path.

use crate::error::{ModuleError, Result};
use crate::module_system::registry::ModuleRegistry;
use rustc_hash::FxHashMap;

/// The outcome of planning a resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionPlan {
    /// Modules to instantiate, each after all of its dependencies
    pub order: Vec<String>,
    /// Names with neither a definition nor an instance, in discovery order
    pub missing: Vec<String>,
    /// Defined modules that cannot be built because something below is missing
    pub blocked: Vec<String>,
}

impl ResolutionPlan {
    /// Whether every requested root can be resolved
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Ready,
    Unresolvable,
}

#[derive(Debug, Clone, Copy)]
enum Visit<'s> {
    Enter(&'s str),
    Exit(&'s str),
}

/// A read-only graph view of a registry
pub struct DependencyGraph<'a> {
    registry: &'a ModuleRegistry,
}

impl<'a> DependencyGraph<'a> {
    /// Create a graph view over a registry
    pub fn new(registry: &'a ModuleRegistry) -> Self {
        Self { registry }
    }

    /// Modules that declare `name` as a direct dependency, sorted
    pub fn dependents(&self, name: &str) -> Vec<String> {
        self.registry
            .defined_names()
            .into_iter()
            .filter(|candidate| {
                self.registry
                    .definition(candidate)
                    .is_some_and(|def| def.dependencies().iter().any(|d| d == name))
            })
            .collect()
    }

    /// Plan the resolution of `roots`.
    ///
    /// Every root is explored (no short-circuit on the first missing name).
    /// Dependencies are visited in declared order and each subtree finishes
    /// before the next sibling starts. A name reached again while it is still
    /// on the current path fails with [`ModuleError::CyclicDependency`]; a
    /// module whose factory already failed fails with
    /// [`ModuleError::FactoryFailed`].
    pub fn plan<'s, S>(&self, roots: &'s [S]) -> Result<ResolutionPlan>
    where
        S: AsRef<str>,
        'a: 's,
    {
        let mut plan = ResolutionPlan::default();
        let mut marks: FxHashMap<&'s str, Mark> = FxHashMap::default();
        let mut path: Vec<&'s str> = Vec::new();
        let mut stack: Vec<Visit<'s>> = roots
            .iter()
            .rev()
            .map(|root| Visit::Enter(root.as_ref()))
            .collect();

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(name) => {
                    match marks.get(name) {
                        Some(Mark::InProgress) => return Err(cycle_error(&path, name)),
                        Some(_) => continue,
                        None => {}
                    }

                    if self.registry.is_resolved(name) {
                        marks.insert(name, Mark::Ready);
                        continue;
                    }

                    if let Some(reason) = self.registry.failure(name) {
                        return Err(ModuleError::FactoryFailed {
                            module: name.to_string(),
                            reason: reason.to_string(),
                        });
                    }

                    let Some(definition) = self.registry.definition(name) else {
                        marks.insert(name, Mark::Unresolvable);
                        plan.missing.push(name.to_string());
                        continue;
                    };

                    marks.insert(name, Mark::InProgress);
                    path.push(name);
                    stack.push(Visit::Exit(name));
                    stack.extend(
                        definition
                            .dependencies()
                            .iter()
                            .rev()
                            .map(|dep| Visit::Enter(dep.as_str())),
                    );
                }
                Visit::Exit(name) => {
                    path.pop();

                    let ready = self.registry.definition(name).is_some_and(|def| {
                        def.dependencies()
                            .iter()
                            .all(|dep| marks.get(dep.as_str()) == Some(&Mark::Ready))
                    });

                    if ready {
                        marks.insert(name, Mark::Ready);
                        plan.order.push(name.to_string());
                    } else {
                        marks.insert(name, Mark::Unresolvable);
                        plan.blocked.push(name.to_string());
                    }
                }
            }
        }

        Ok(plan)
    }
}

fn cycle_error(path: &[&str], repeated: &str) -> ModuleError {
    let start = path.iter().position(|n| *n == repeated).unwrap_or(0);
    let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
    cycle.push(repeated.to_string());
    ModuleError::CyclicDependency { cycle }
}
