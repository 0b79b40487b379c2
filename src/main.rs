// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! requisite - lazy module loader and dependency resolver
//!
//! This is the main entry point for the requisite CLI/REPL.
//!
//! ## Features
//!
//! - Execute module scripts with fallback source locations
//! - Require modules and print their instances
//! - Inspect instantiation order without running factories
//! - Interactive REPL with history

mod display;
mod repl;

use anyhow::Context;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use requisite_core::VERSION;
use requisite_script::{Config, ScriptError, ScriptRuntime};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "requisite",
    about = "Lazy module loader and dependency resolver",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Configuration file layered over the defaults
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Extra directory searched for script locations (repeatable)
    #[arg(short = 'I', long = "search-path", global = true)]
    search_paths: Vec<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Execute a module script
    Run {
        /// Script to execute
        script: PathBuf,
    },

    /// Execute a script, then require modules and print them
    Require {
        /// Script to execute first
        script: PathBuf,
        /// Modules to require
        #[arg(required = true)]
        modules: Vec<String>,
    },

    /// Execute a script, then print the instantiation order of modules
    Plan {
        /// Script to execute first
        script: PathBuf,
        /// Modules to plan
        #[arg(required = true)]
        modules: Vec<String>,
    },

    /// Start the interactive REPL
    Repl,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            print_failure(&err);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config, cli.verbose);

    match run(cli.command.unwrap_or(Command::Repl), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    for path in &cli.search_paths {
        if !config.search_paths.contains(path) {
            config.search_paths.push(path.clone());
        }
    }
    Ok(config)
}

/// Install the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_directives(level: &str) -> String {
    ["requisite", "requisite_core", "requisite_script"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

fn run(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Run { script } => {
            let mut runtime = ScriptRuntime::new(config);
            runtime.run_file(&script)?;
            display::print_outcomes(runtime.outcomes());
        }
        Command::Require { script, modules } => {
            let mut runtime = ScriptRuntime::new(config);
            runtime.run_file(&script)?;
            let values = runtime.require(&modules)?;

            let formatter = display::ValueFormatter::colored().with_max_depth(3);
            for (name, value) in modules.iter().zip(&values) {
                println!("{} = {}", name.bright_cyan().bold(), formatter.format(value));
            }
        }
        Command::Plan { script, modules } => {
            let mut runtime = ScriptRuntime::new(config);
            runtime.run_file(&script)?;
            display::print_plan(&runtime.plan(&modules)?);
        }
        Command::Repl => {
            let mut repl = repl::Repl::new(config).context("Failed to initialize REPL")?;
            repl.run().context("REPL error")?;
        }
    }
    Ok(())
}

fn print_failure(err: &anyhow::Error) {
    match err.downcast_ref::<ScriptError>() {
        Some(script_err) => {
            for context in err.chain().take_while(|cause| !cause.is::<ScriptError>()) {
                eprintln!("{}: {}", "Error".red().bold(), context);
            }
            display::print_error(script_err);
        }
        None => {
            let causes: Vec<String> = err.chain().map(|cause| cause.to_string()).collect();
            eprintln!("{}: {}", "Error".red().bold(), causes.join(": "));
        }
    }
}
