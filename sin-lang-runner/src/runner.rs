use std::path::{Path, PathBuf};

use sin_lang_interpreter::{Environment, Interpreter, Value};
use thiserror::Error;

/// Why a program could not be run to completion.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Error: {0}")]
    Program(#[from] sin_lang_interpreter::Error),
    #[error("Line editor failed: {0}")]
    Editor(#[from] rustyline::error::ReadlineError),
}

/// The environment a program starts in.
pub fn top_level(interpreter: &Interpreter, prelude: bool) -> Result<Environment, RunError> {
    if prelude {
        Ok(interpreter.prelude_environment()?)
    } else {
        Ok(Environment::new())
    }
}

/// Runs the file at `path` and prints its final value unless it is `nil`.
pub fn execute(interpreter: &Interpreter, path: &Path, prelude: bool) -> Result<(), RunError> {
    let source =
        std::fs::read_to_string(path).map_err(|source| RunError::Read {
            path: path.to_owned(),
            source,
        })?;
    let environment = top_level(interpreter, prelude)?;

    let value = interpreter.run_in(&source, &environment)?;
    if value != Value::Nil {
        println!("{}", value);
    }
    Ok(())
}
