// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Shared object representation.

use crate::value::Value;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct Object {
    prototype: Option<ObjectRef>,
    properties: FxHashMap<String, Value>,
}

/// A reference-counted handle to a mutable object.
///
/// Clones share the same object. Property lookup falls back to the
/// prototype chain, which is fixed when the object is created.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Creates a new empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an object whose lookups fall back to `prototype`.
    pub fn with_prototype(prototype: ObjectRef) -> Self {
        Self(Rc::new(RefCell::new(Object {
            prototype: Some(prototype),
            properties: FxHashMap::default(),
        })))
    }

    /// Creates an object from key/value pairs.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let obj = Self::new();
        for (key, value) in entries {
            obj.set(key, value);
        }
        obj
    }

    /// Gets a property value, walking the prototype chain.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let next = {
                let inner = current.0.borrow();
                if let Some(value) = inner.properties.get(key) {
                    return Some(value.clone());
                }
                inner.prototype.clone()
            };
            current = next?;
        }
    }

    /// Gets an own property value.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Sets an own property value.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.0.borrow_mut().properties.insert(key.into(), value);
    }

    /// Deletes an own property.
    pub fn delete(&self, key: &str) -> bool {
        self.0.borrow_mut().properties.remove(key).is_some()
    }

    /// Checks if a property exists on the object or its prototype chain.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Checks if an own property exists.
    pub fn has_own(&self, key: &str) -> bool {
        self.0.borrow().properties.contains_key(key)
    }

    /// Own property names, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.borrow().properties.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Own properties, sorted by name.
    pub fn entries(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .0
            .borrow()
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// The prototype, if any.
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.borrow().prototype.clone()
    }

    /// Number of own properties.
    pub fn len(&self) -> usize {
        self.0.borrow().properties.len()
    }

    /// Whether the object has no own properties.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    // Keys only: objects may contain themselves.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("keys", &self.keys())
            .field("has_prototype", &self.prototype().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_delete() {
        let obj = ObjectRef::new();
        assert!(obj.is_empty());

        obj.set("name", Value::from("blarg"));
        assert_eq!(obj.get("name"), Some(Value::from("blarg")));
        assert!(obj.has_own("name"));
        assert_eq!(obj.len(), 1);

        assert!(obj.delete("name"));
        assert!(!obj.delete("name"));
        assert!(obj.get("name").is_none());
    }

    #[test]
    fn test_prototype_lookup() {
        let proto = ObjectRef::from_entries([("doFoo", Value::from(1.0))]);
        let obj = ObjectRef::with_prototype(proto.clone());

        assert_eq!(obj.get("doFoo"), Some(Value::from(1.0)));
        assert!(obj.has("doFoo"));
        assert!(!obj.has_own("doFoo"));

        // Own properties shadow the prototype
        obj.set("doFoo", Value::from(2.0));
        assert_eq!(obj.get("doFoo"), Some(Value::from(2.0)));
        assert_eq!(proto.get("doFoo"), Some(Value::from(1.0)));
    }

    #[test]
    fn test_clones_share_state() {
        let a = ObjectRef::new();
        let b = a.clone();
        b.set("x", Value::Null);
        assert!(a.has_own("x"));
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&ObjectRef::new()));
    }

    #[test]
    fn test_keys_are_sorted() {
        let obj = ObjectRef::from_entries([
            ("doFooThings", Value::Null),
            ("doBarThings", Value::Null),
            ("doBazThings", Value::Null),
        ]);
        assert_eq!(obj.keys(), vec!["doBarThings", "doBazThings", "doFooThings"]);
        assert_eq!(obj.entries()[0].0, "doBarThings");
    }

    #[test]
    fn test_self_reference_debug() {
        let obj = ObjectRef::new();
        obj.set("me", Value::Object(obj.clone()));
        let debug = format!("{:?}", obj);
        assert!(debug.contains("me"));
    }
}
