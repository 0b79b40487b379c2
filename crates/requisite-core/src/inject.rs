// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Shimming: attach capabilities to shared objects.
//!
//! Without `overwrite`, a property is only assigned when the target does not
//! already hold a value of the same kind under that key, so an existing
//! implementation always wins over a shim.

use crate::error::{ModuleError, Result};
use crate::object::ObjectRef;
use crate::value::{Value, ValueKind};
use std::fmt;
use tracing::trace;

/// Named values to attach
pub type Properties = Vec<(String, Value)>;

/// Where injected properties come from
pub enum InjectSource {
    /// A ready set of properties
    Properties(Properties),
    /// Invoked exactly once to produce the properties
    Producer(Box<dyn FnOnce() -> std::result::Result<Properties, String>>),
}

impl InjectSource {
    /// Wrap a producer function
    pub fn producer<F>(f: F) -> Self
    where
        F: FnOnce() -> std::result::Result<Properties, String> + 'static,
    {
        Self::Producer(Box::new(f))
    }

    /// Use an object's own properties
    pub fn from_object(object: &ObjectRef) -> Self {
        Self::Properties(object.entries())
    }

    fn into_properties(self) -> Result<Properties> {
        match self {
            Self::Properties(props) => Ok(props),
            Self::Producer(produce) => produce().map_err(|reason| {
                ModuleError::invalid_argument(format!("inject() producer failed: {}", reason))
            }),
        }
    }
}

impl fmt::Debug for InjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Properties(props) => f.debug_tuple("Properties").field(props).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<Properties> for InjectSource {
    fn from(props: Properties) -> Self {
        Self::Properties(props)
    }
}

impl From<&ObjectRef> for InjectSource {
    fn from(object: &ObjectRef) -> Self {
        Self::from_object(object)
    }
}

/// Inject `source` into `target`, returning how many properties were assigned.
///
/// `target` must be an object.
pub fn inject(target: &Value, source: InjectSource, overwrite: bool) -> Result<usize> {
    match target {
        Value::Object(object) => inject_object(object, source, overwrite),
        other => Err(ModuleError::invalid_argument(format!(
            "inject() target must be an object, not {}",
            other.kind()
        ))),
    }
}

/// Inject `source` into an object
pub fn inject_object(target: &ObjectRef, source: InjectSource, overwrite: bool) -> Result<usize> {
    let mut assigned = 0;
    for (key, value) in source.into_properties()? {
        if !overwrite {
            let current = target.get(&key).map_or(ValueKind::Undefined, |v| v.kind());
            if current == value.kind() {
                trace!(%key, kind = %current, "Keeping existing property");
                continue;
            }
        }
        target.set(key, value);
        assigned += 1;
    }
    Ok(assigned)
}
