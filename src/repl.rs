// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL for defining and requiring modules.
//!
//! Anything that is not a dot command is executed as an inline module
//! script, e.g. `{ "define": [{ "name": "A" }], "require": [["A"]] }`.

use crate::display::{ValueFormatter, print_error, print_outcomes, print_plan};
use owo_colors::OwoColorize;
use requisite_core::{DependencyGraph, ModuleRegistry};
use requisite_script::{Config as RuntimeConfig, ScriptRuntime};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;

const HISTORY_FILE: &str = "history.txt";

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Version,
    Load,
    Require,
    Plan,
    Modules,
    Reset,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let input = input.trim();
        let rest = input.strip_prefix('.')?;

        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        let command = match cmd.as_str() {
            "help" | "h" | "?" => ReplCommand::Help,
            "exit" | "quit" | "q" => ReplCommand::Exit,
            "clear" | "cls" => ReplCommand::Clear,
            "version" | "v" => ReplCommand::Version,
            "load" | "l" => ReplCommand::Load,
            "require" | "r" => ReplCommand::Require,
            "plan" | "p" => ReplCommand::Plan,
            "modules" | "m" => ReplCommand::Modules,
            "reset" => ReplCommand::Reset,
            _ => return None,
        };
        Some((command, arg))
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".version", "Show version information"),
            (".load <location>", "Execute a module script"),
            (".require <names>", "Resolve modules and print them"),
            (".plan <names>", "Show instantiation order without running factories"),
            (".modules", "List declared modules"),
            (".reset", "Forget every module and included script"),
        ]
    }
}

/// Split a command argument into module names
fn module_names(arg: &str) -> Vec<String> {
    arg.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Declared dependencies and direct dependents of a module, for `.modules`
fn describe_edges(registry: &ModuleRegistry, name: &str) -> String {
    let deps = registry
        .definition(name)
        .map(|def| def.dependencies().join(", "))
        .unwrap_or_default();
    let dependents = DependencyGraph::new(registry).dependents(name);

    let mut parts = Vec::new();
    if !deps.is_empty() {
        parts.push(format!("needs {}", deps));
    }
    if !dependents.is_empty() {
        parts.push(format!("used by {}", dependents.join(", ")));
    }
    parts.join("; ")
}

/// Byte offset where the word ending at `pos` begins
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .find(|&(_, c)| !c.is_alphanumeric() && c != '_' && c != '.')
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// Completion, hints, validation and highlighting for script input
struct RequisiteHelper {
    words: Vec<String>,
}

impl RequisiteHelper {
    fn new() -> Self {
        let sections = [
            "include",
            "externals",
            "try_include",
            "define",
            "require",
            "modules",
            "module",
            "urls",
            "url",
            "files",
            "paths",
            "src",
            "defines",
            "name",
            "deps",
            "exports",
            "extends",
        ];
        let words = ReplCommand::all_commands()
            .iter()
            .filter_map(|(cmd, _)| cmd.split_whitespace().next())
            .chain(sections)
            .map(String::from)
            .collect();

        Self { words }
    }
}

impl Completer for RequisiteHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches: Vec<Pair> = self
            .words
            .iter()
            .filter(|w| w.starts_with(word))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for RequisiteHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() || !line.starts_with('.') || line.contains(char::is_whitespace) {
            return None;
        }

        self.words
            .iter()
            .find(|w| w.starts_with(line) && w.len() > line.len())
            .map(|w| (&w[line.len()..]).dimmed().to_string())
    }
}

impl Highlighter for RequisiteHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('.') {
            return Cow::Owned(line.magenta().to_string());
        }

        let mut result = String::with_capacity(line.len() * 2);
        let mut in_string = false;
        let mut escaped = false;
        let mut literal = String::new();

        for c in line.chars() {
            if in_string {
                literal.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    result.push_str(&literal.green().to_string());
                    literal.clear();
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => {
                    in_string = true;
                    literal.push(c);
                }
                '[' | ']' | '{' | '}' => result.push_str(&c.yellow().to_string()),
                '0'..='9' | '-' => result.push_str(&c.yellow().to_string()),
                _ => result.push(c),
            }
        }
        result.push_str(&literal);

        Cow::Owned(result)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for RequisiteHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();

        if input.trim_start().starts_with('.') {
            return Ok(ValidationResult::Valid(None));
        }
        if !is_balanced(input) || input.trim_end().ends_with(',') {
            return Ok(ValidationResult::Incomplete);
        }

        Ok(ValidationResult::Valid(None))
    }
}

/// Check if brackets and braces are balanced outside of JSON strings
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for c in input.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if in_string {
            match c {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(c) {
                    // Let the parser report it
                    return true;
                }
            }
            _ => {}
        }
    }

    stack.is_empty() && !in_string
}

impl Helper for RequisiteHelper {}

/// The interactive REPL
pub struct Repl {
    runtime: ScriptRuntime,
    editor: Editor<RequisiteHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: &RuntimeConfig) -> rustyline::Result<Self> {
        let editor_config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(config.history_size)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(editor_config)?;
        editor.set_helper(Some(RequisiteHelper::new()));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("requisite")
            .join(HISTORY_FILE);

        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let _ = editor.load_history(&history_path);

        Ok(Self {
            runtime: ScriptRuntime::new(config),
            editor,
            history_path,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = format!("{} ", "requisite>".bright_green().bold());

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();

                    if trimmed.is_empty() {
                        continue;
                    }

                    if let Some((cmd, arg)) = ReplCommand::parse(trimmed) {
                        match self.execute_command(cmd, arg) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        }
                    }

                    if trimmed.starts_with('.') {
                        eprintln!(
                            "{}: unknown command '{}'. Type {} for help",
                            "Error".red().bold(),
                            trimmed.cyan(),
                            ".help".cyan()
                        );
                        continue;
                    }

                    self.run_and_print(trimmed);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {:?}", "Error".red().bold(), err);
                    break;
                }
            }
        }

        let _ = self.editor.save_history(&self.history_path);
        Ok(())
    }

    fn print_banner(&self) {
        println!(
            "{} {}",
            "requisite".bright_cyan().bold(),
            requisite_core::VERSION.yellow()
        );
        println!(
            "Type {} for help, {} to exit",
            ".help".green(),
            ".exit".green()
        );
        println!();
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Version => {
                println!(
                    "{}: {}",
                    "requisite".bright_cyan().bold(),
                    requisite_core::VERSION.yellow()
                );
            }
            ReplCommand::Load => match arg {
                Some(location) => self.load(location),
                None => missing_argument(".load", "requires a location"),
            },
            ReplCommand::Require => match arg {
                Some(names) => self.require(&module_names(names)),
                None => missing_argument(".require", "requires module names"),
            },
            ReplCommand::Plan => match arg {
                Some(names) => match self.runtime.plan(&module_names(names)) {
                    Ok(plan) => print_plan(&plan),
                    Err(err) => print_error(&err),
                },
                None => missing_argument(".plan", "requires module names"),
            },
            ReplCommand::Modules => self.list_modules(),
            ReplCommand::Reset => {
                self.runtime.reset();
                println!("{}", "All modules forgotten".dimmed());
            }
        }
        CommandResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();

        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:20} {}", cmd.cyan(), desc.dimmed());
        }

        println!();
        println!("{}", "Inline scripts:".white().bold());
        println!();
        println!(
            "  {}",
            r#"{ "define": [{ "name": "A", "exports": { "x": 1 } }], "require": [["A"]] }"#.dimmed()
        );
        println!();
    }

    fn load(&mut self, location: &str) {
        match self.runtime.include(location) {
            Ok(()) => print_outcomes(&self.runtime.take_outcomes()),
            Err(err) => {
                self.runtime.take_outcomes();
                print_error(&err);
            }
        }
    }

    fn require(&mut self, names: &[String]) {
        match self.runtime.require(names) {
            Ok(values) => {
                let formatter = ValueFormatter::colored();
                for (name, value) in names.iter().zip(&values) {
                    println!("{} = {}", name.bright_cyan().bold(), formatter.format(value));
                }
            }
            Err(err) => print_error(&err),
        }
    }

    fn list_modules(&self) {
        let registry = self.runtime.loader().registry();
        let mut names = registry.defined_names();
        for name in registry.resolved_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.sort();

        if names.is_empty() {
            println!("{}", "No modules declared".dimmed());
            return;
        }

        for name in names {
            let state = if registry.is_resolved(&name) {
                "resolved".green().to_string()
            } else if let Some(reason) = registry.failure(&name) {
                format!("failed: {}", reason).red().to_string()
            } else {
                "pending".yellow().to_string()
            };
            println!(
                "  {:24} {:10} {}",
                name.cyan(),
                state,
                describe_edges(registry, &name).dimmed()
            );
        }
    }

    fn run_and_print(&mut self, source: &str) {
        let result = self.runtime.run_source(source);
        print_outcomes(&self.runtime.take_outcomes());
        if let Err(err) = result {
            print_error(&err);
        }
    }
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

fn missing_argument(command: &str, what: &str) {
    eprintln!("{}: {} {}", "Error".red().bold(), command.cyan(), what.dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_command_parse() {
        assert!(matches!(
            ReplCommand::parse(".help"),
            Some((ReplCommand::Help, None))
        ));
        assert!(matches!(
            ReplCommand::parse(".exit"),
            Some((ReplCommand::Exit, None))
        ));
        assert!(matches!(
            ReplCommand::parse(".load lib/vec3.json"),
            Some((ReplCommand::Load, Some("lib/vec3.json")))
        ));
        assert!(matches!(
            ReplCommand::parse(".require  FooService "),
            Some((ReplCommand::Require, Some("FooService")))
        ));
        assert!(matches!(
            ReplCommand::parse(".plan"),
            Some((ReplCommand::Plan, None))
        ));
        assert!(ReplCommand::parse(".unknown").is_none());
        assert!(ReplCommand::parse(r#"{ "define": [] }"#).is_none());
    }

    #[test]
    fn test_module_names() {
        assert_eq!(module_names("Foo1, Foo2  Foo3"), vec!["Foo1", "Foo2", "Foo3"]);
        assert!(module_names(" , ").is_empty());
    }

    #[test]
    fn test_describe_edges() {
        let mut runtime = ScriptRuntime::default();
        runtime
            .run_source(
                r#"{ "define": [
                    { "name": "Boid", "deps": ["vec3", "quat"] },
                    { "name": "Flock", "deps": ["Boid"] },
                    { "name": "vec3" }
                ] }"#,
            )
            .unwrap();
        let registry = runtime.loader().registry();

        assert_eq!(describe_edges(registry, "Boid"), "needs vec3, quat; used by Flock");
        assert_eq!(describe_edges(registry, "vec3"), "used by Boid");
        assert_eq!(describe_edges(registry, "Flock"), "needs Boid");
        assert_eq!(describe_edges(registry, "quat"), "used by Boid");
    }

    #[test]
    fn test_word_start() {
        assert_eq!(word_start("Foo", 3), 0);
        assert_eq!(word_start(".require Foo", 12), 9);
        let line = "\"\u{2013}Foo";
        let start = word_start(line, line.len());
        assert_eq!(&line[start..], "Foo");
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced(r#"{ "define": [] }"#));
        assert!(!is_balanced(r#"{ "define": ["#));
        assert!(is_balanced(r#"{ "name": "brace { in string" }"#));
        assert!(is_balanced(r#"{ "name": "escaped \" quote {" }"#));
        assert!(!is_balanced(r#"{ "name": "unterminated"#));
    }
}
