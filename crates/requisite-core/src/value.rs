// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module instance values.
//!
//! Factories produce [`Value`]s and `require` continuations receive them.
//! Objects, arrays and functions are reference types: cloning a value shares
//! the underlying instance, so identity survives the resolved cache.

use crate::object::ObjectRef;
use std::fmt;
use std::rc::Rc;

/// A native (Rust) function body.
pub type NativeFunction = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// A callable value. Also used as a module factory.
#[derive(Clone)]
pub struct Callable {
    /// The function name (if any)
    pub name: Option<String>,
    /// Number of arguments the function accepts (`None` for variadic)
    pub arity: Option<usize>,
    func: NativeFunction,
}

impl Callable {
    /// Creates a named variadic function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        Self {
            name: Some(name.into()),
            arity: None,
            func: Rc::new(func),
        }
    }

    /// Creates an anonymous variadic function.
    pub fn anonymous<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        Self {
            name: None,
            arity: None,
            func: Rc::new(func),
        }
    }

    /// Fixes the number of arguments the function accepts.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Calls the function.
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        if let Some(arity) = self.arity {
            if args.len() != arity {
                return Err(format!(
                    "{} expected {} argument(s), got {}",
                    self.display_name(),
                    arity,
                    args.len()
                ));
            }
        }
        (self.func)(args)
    }

    /// Name used in diagnostics.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(anonymous)")
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arity {
            Some(arity) => write!(f, "NativeFunction({}/{})", self.display_name(), arity),
            None => write!(f, "NativeFunction({})", self.display_name()),
        }
    }
}

/// The runtime kind of a value, compared by the shimming utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// undefined
    Undefined,
    /// null
    Null,
    /// boolean
    Boolean,
    /// number
    Number,
    /// string
    String,
    /// array
    Array,
    /// object
    Object,
    /// function
    Function,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
            ValueKind::Function => "function",
        };
        f.write_str(name)
    }
}

/// A module instance or property value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Shared array
    Array(Rc<Vec<Value>>),
    /// Shared mutable object
    Object(ObjectRef),
    /// Function reference
    Function(Rc<Callable>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // NaN never equals itself
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Creates a new empty object value.
    pub fn object() -> Self {
        Value::Object(ObjectRef::new())
    }

    /// Creates a named function value.
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        Value::Function(Rc::new(Callable::new(name, func)))
    }

    /// Creates an array value.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    /// Returns the runtime kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
            Value::Function(_) => ValueKind::Function,
        }
    }

    /// Returns true if this value is undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true if this value is a function.
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Returns the object reference if this value is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the callable if this value is a function.
    pub fn as_function(&self) -> Option<&Callable> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Returns the string contents if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this value is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Identity comparison: reference types compare by instance, the rest by value.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    /// Calls this value as a function.
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        match self {
            Value::Function(func) => func.call(args),
            other => Err(format!("{} is not a function", other.kind())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => write!(f, "[array({})]", items.len()),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(callable) => match &callable.name {
                Some(name) => write!(f, "[Function: {}]", name),
                None => write!(f, "[Function (anonymous)]"),
            },
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}

impl From<Callable> for Value {
    fn from(func: Callable) -> Self {
        Value::Function(Rc::new(func))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of_each_variant() {
        assert_eq!(Value::Undefined.kind(), ValueKind::Undefined);
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::from(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Number);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
        assert_eq!(Value::array(vec![]).kind(), ValueKind::Array);
        assert_eq!(Value::object().kind(), ValueKind::Object);
        assert_eq!(
            Value::function("f", |_| Ok(Value::Undefined)).kind(),
            ValueKind::Function
        );
    }

    #[test]
    fn test_reference_identity() {
        let a = Value::object();
        let b = Value::object();
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));

        let f = Value::function("f", |_| Ok(Value::Null));
        assert_eq!(f, f.clone());
    }

    #[test]
    fn test_nan_is_same_but_not_equal() {
        let nan = Value::Number(f64::NAN);
        assert_ne!(nan, nan.clone());
        assert!(nan.same(&nan.clone()));
    }

    #[test]
    fn test_callable_arity_is_enforced() {
        let add = Callable::new("add", |args| {
            let sum = args.iter().filter_map(Value::as_number).sum::<f64>();
            Ok(Value::Number(sum))
        })
        .with_arity(2);

        assert_eq!(
            add.call(&[Value::from(1.0), Value::from(2.0)]),
            Ok(Value::Number(3.0))
        );
        let err = add.call(&[Value::from(1.0)]).unwrap_err();
        assert!(err.contains("expected 2 argument(s)"));
    }

    #[test]
    fn test_call_non_function() {
        let err = Value::from("nope").call(&[]).unwrap_err();
        assert_eq!(err, "string is not a function");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::object().to_string(), "[object Object]");
        assert_eq!(
            Value::function("Foo", |_| Ok(Value::Null)).to_string(),
            "[Function: Foo]"
        );
    }
}
