// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Terminal output for module instances and errors.

use owo_colors::OwoColorize;
use requisite_core::{ModuleError, ObjectRef, ResolutionPlan, Value};
use requisite_script::{RequireOutcome, ScriptError};

/// Nesting shown before objects collapse to `[Object]`
const DEFAULT_DEPTH: usize = 2;

#[derive(Clone, Copy)]
enum Style {
    Undefined,
    Null,
    Number,
    String,
    Function,
    Special,
}

/// Renders values the way the REPL prints them
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter {
    colored: bool,
    max_depth: usize,
}

impl ValueFormatter {
    /// Formatter without ANSI colors
    pub fn plain() -> Self {
        Self {
            colored: false,
            max_depth: DEFAULT_DEPTH,
        }
    }

    /// Formatter with ANSI colors
    pub fn colored() -> Self {
        Self {
            colored: true,
            ..Self::plain()
        }
    }

    /// Change how deep nested objects are expanded
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Format a value
    pub fn format(&self, value: &Value) -> String {
        let mut path = Vec::new();
        self.write(value, 0, &mut path)
    }

    fn write(&self, value: &Value, depth: usize, path: &mut Vec<ObjectRef>) -> String {
        match value {
            Value::Undefined => self.paint("undefined".into(), Style::Undefined),
            Value::Null => self.paint("null".into(), Style::Null),
            Value::Boolean(b) => self.paint(b.to_string(), Style::Number),
            Value::Number(n) => self.paint(format_number(*n), Style::Number),
            Value::String(s) if depth == 0 => self.paint(format!("'{}'", s), Style::String),
            Value::String(s) => self.paint(format!("{:?}", s), Style::String),
            Value::Function(callable) => {
                let label = match &callable.name {
                    Some(name) => format!("[Function: {}]", name),
                    None => "[Function (anonymous)]".to_string(),
                };
                self.paint(label, Style::Function)
            }
            Value::Array(items) => {
                if items.is_empty() {
                    return "[]".to_string();
                }
                if depth >= self.max_depth {
                    return self.paint("[Array]".into(), Style::Special);
                }
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| self.write(item, depth + 1, path))
                    .collect();
                format!("[ {} ]", parts.join(", "))
            }
            Value::Object(object) => {
                if path.iter().any(|seen| seen.ptr_eq(object)) {
                    return self.paint("[Circular]".into(), Style::Special);
                }
                let entries = object.entries();
                if entries.is_empty() {
                    return "{}".to_string();
                }
                if depth >= self.max_depth {
                    return self.paint("[Object]".into(), Style::Special);
                }

                path.push(object.clone());
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, self.write(value, depth + 1, path)))
                    .collect();
                path.pop();

                format!("{{ {} }}", parts.join(", "))
            }
        }
    }

    fn paint(&self, text: String, style: Style) -> String {
        if !self.colored {
            return text;
        }
        match style {
            Style::Undefined => text.blue().dimmed().to_string(),
            Style::Null => text.blue().to_string(),
            Style::Number => text.yellow().to_string(),
            Style::String => text.green().to_string(),
            Style::Function => text.magenta().to_string(),
            Style::Special => text.cyan().to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else {
        n.to_string()
    }
}

/// Print the instances produced by `require` lists
pub fn print_outcomes(outcomes: &[RequireOutcome]) {
    let formatter = ValueFormatter::colored();
    for outcome in outcomes {
        for (name, value) in outcome.modules.iter().zip(&outcome.values) {
            println!("{} = {}", name.bright_cyan().bold(), formatter.format(value));
        }
    }
}

/// Print a resolution plan
pub fn print_plan(plan: &ResolutionPlan) {
    if plan.order.is_empty() {
        println!("{}", "Nothing to instantiate".dimmed());
    } else {
        for (i, name) in plan.order.iter().enumerate() {
            println!("  {:>3}. {}", (i + 1).dimmed(), name.cyan());
        }
    }
    if !plan.missing.is_empty() {
        println!("{}: {}", "missing".red().bold(), plan.missing.join(", "));
    }
    if !plan.blocked.is_empty() {
        println!("{}: {}", "blocked".yellow().bold(), plan.blocked.join(", "));
    }
}

/// Print an error with any per-location details it carries
pub fn print_error(error: &ScriptError) {
    let message = error.to_string();
    if let Some(colon) = message.find(':') {
        let (kind, rest) = message.split_at(colon);
        eprintln!("{}{}", kind.red().bold(), rest);
    } else {
        eprintln!("{}", message.red());
    }

    for detail in error_details(error) {
        eprintln!("  {} {}", "-".dimmed(), detail.dimmed());
    }
}

/// Secondary lines attached to an error
pub fn error_details(error: &ScriptError) -> &[String] {
    match error {
        ScriptError::Module(ModuleError::LoadFailure { causes, .. }) => causes,
        ScriptError::Module(ModuleError::IncludeFailed { details, .. }) => details,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        let f = ValueFormatter::plain();
        assert_eq!(f.format(&Value::Undefined), "undefined");
        assert_eq!(f.format(&Value::from(3.0)), "3");
        assert_eq!(f.format(&Value::from(f64::NAN)), "NaN");
        assert_eq!(f.format(&Value::from(f64::NEG_INFINITY)), "-Infinity");
        assert_eq!(f.format(&Value::from("hi")), "'hi'");
        assert_eq!(
            f.format(&Value::function("doFoo", |_| Ok(Value::Undefined))),
            "[Function: doFoo]"
        );
    }

    #[test]
    fn test_nested_objects() {
        let inner = ObjectRef::new();
        inner.set("n", Value::from(3.0));
        let outer = ObjectRef::new();
        outer.set("label", Value::from("foo"));
        outer.set("Foo3", Value::Object(inner));
        outer.set("tags", Value::array(vec![Value::from(1.0), Value::from(2.0)]));

        assert_eq!(
            ValueFormatter::plain().format(&Value::Object(outer)),
            r#"{ Foo3: { n: 3 }, label: "foo", tags: [ 1, 2 ] }"#
        );
    }

    #[test]
    fn test_depth_limit() {
        let leaf = ObjectRef::new();
        leaf.set("x", Value::Null);
        let mid = ObjectRef::new();
        mid.set("leaf", Value::Object(leaf));
        let top = ObjectRef::new();
        top.set("mid", Value::Object(mid));

        let value = Value::Object(top);
        assert_eq!(
            ValueFormatter::plain().format(&value),
            "{ mid: { leaf: [Object] } }"
        );
        assert_eq!(
            ValueFormatter::plain().with_max_depth(3).format(&value),
            "{ mid: { leaf: { x: null } } }"
        );
    }

    #[test]
    fn test_cycles() {
        let obj = ObjectRef::new();
        obj.set("me", Value::Object(obj.clone()));
        assert_eq!(
            ValueFormatter::plain().format(&Value::Object(obj)),
            "{ me: [Circular] }"
        );
    }

    #[test]
    fn test_error_details() {
        let err = ScriptError::Module(ModuleError::LoadFailure {
            location: "bad2".into(),
            missing: vec!["M".into()],
            causes: vec!["Error loading 'bad2': not found".into()],
        });
        assert_eq!(error_details(&err), ["Error loading 'bad2': not found".to_string()]);
        assert!(error_details(&ScriptError::config("x")).is_empty());
    }
}
