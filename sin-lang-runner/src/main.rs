mod repl;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sin_lang_interpreter::{Interpreter, InterpreterConfig};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Program to run. Starts a REPL when omitted.
    path: Option<PathBuf>,
    /// Do not bind the default host functions (`add`, `print`, ...) by name.
    #[arg(long)]
    no_prelude: bool,
    /// Nested function calls allowed before the program is aborted.
    #[arg(long, default_value_t = InterpreterConfig::DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

/// Logs go to stderr, and only when `RUST_LOG` is set
/// (e.g. `RUST_LOG=sin_lang_interpreter=debug`).
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let interpreter = Interpreter::new(InterpreterConfig {
        max_call_depth: cli.max_call_depth,
    });
    let prelude = !cli.no_prelude;

    let result = match cli.path {
        None => repl::start(&interpreter, prelude),
        Some(path) => runner::execute(&interpreter, &path, prelude),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}
