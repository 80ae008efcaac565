//! Viro's command-line front end: run a script file, or fall into an
//! interactive REPL when no file is given.
//!
//! A thin binary over the library crate: this file owns argument
//! parsing, source-file reading, and error reporting; all language
//! semantics live in the `viro` library crate.

use std::{fs, path::Path, process::ExitCode};

use clap::Parser;
use rustyline::{DefaultEditor, error::ReadlineError};
use thiserror::Error as ThisError;
use tracing_subscriber::EnvFilter;
use viro::{BoundedLimits, HostIo, Limits, NoLimits, ReplError, ReplSession, Runner};

/// Viro: a small Rebol-style dynamic language.
#[derive(Parser, Debug)]
#[command(name = "viro", version, about)]
struct Cli {
    /// Script file to run. Omit to start an interactive REPL.
    file: Option<String>,

    /// Cap recursion depth, total steps, and live frame count instead of
    /// running unbounded (useful for untrusted scripts).
    #[arg(long)]
    bounded: bool,

    /// Recursion depth ceiling, only meaningful with `--bounded`.
    #[arg(long, default_value_t = 2048)]
    max_recursion: usize,

    /// Evaluation step ceiling, only meaningful with `--bounded`.
    #[arg(long, default_value_t = 10_000_000)]
    max_steps: u64,
}

/// Everything that can go wrong at the CLI boundary, distinct from the
/// plain [`viro::Error`]/[`ReplError`] the interpreter itself raises —
/// reading a script file or starting the line editor fails before any
/// Viro evaluation has a chance to.
#[derive(Debug, ThisError)]
enum CliError {
    #[error("error reading {path}: {source}")]
    ReadScript { path: String, #[source] source: std::io::Error },
    #[error("error starting line editor: {0}")]
    Editor(#[from] ReadlineError),
    #[error("error initializing interpreter: {0}")]
    Startup(#[from] viro::Error),
    #[error("{0}")]
    Repl(#[from] ReplError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let result = match &cli.file {
        Some(path) => run_file(path, &cli),
        None => run_repl(&cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn limits_for(cli: &Cli) -> Box<dyn Limits> {
    if cli.bounded {
        Box::new(BoundedLimits::new(cli.max_recursion, cli.max_steps, 1_000_000))
    } else {
        Box::new(NoLimits)
    }
}

fn run_file(path: &str, cli: &Cli) -> Result<(), CliError> {
    let source = read_script(path)?;
    let mut runner = Runner::new(HostIo::stdio(), limits_for(cli))?;
    runner.run(&source)?;
    Ok(())
}

fn read_script(path: &str) -> Result<String, CliError> {
    fs::read_to_string(Path::new(path)).map_err(|source| CliError::ReadScript { path: path.to_owned(), source })
}

fn run_repl(cli: &Cli) -> Result<(), CliError> {
    let mut session = ReplSession::new(HostIo::stdio(), limits_for(cli))?;
    let mut editor = DefaultEditor::new()?;

    println!("Viro {}", env!("CARGO_PKG_VERSION"));
    loop {
        match editor.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                match session.execute(&line) {
                    Ok(value) => println!("{}", value.mold()),
                    Err(err) => eprintln!("{err}"),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
