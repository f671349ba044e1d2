mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod value;

use sin_lang_core::ast::Block;
use tracing::debug;

pub use environment::Environment;
pub use error::{AccessError, Error, EvalError};
use evaluator::Evaluator;
pub use host::HostRegistry;
pub use value::Value;

/// Binds the default host functions under their own names.
const PRELUDE: &str = include_str!("prelude.sin");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Nested closure calls allowed before [`EvalError::StackOverflow`].
    pub max_call_depth: usize,
}

impl InterpreterConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Parses and evaluates programs against a fixed host registry.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    host: HostRegistry,
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self::with_host(HostRegistry::default(), config)
    }

    pub fn with_host(host: HostRegistry, config: InterpreterConfig) -> Self {
        Interpreter { host, config }
    }

    pub fn host(&self) -> &HostRegistry {
        &self.host
    }

    pub fn config(&self) -> InterpreterConfig {
        self.config
    }

    pub fn evaluate(&self, program: &Block, environment: &Environment) -> Result<Value, EvalError> {
        Evaluator::new(&self.host, self.config.max_call_depth).eval_block(program, environment)
    }

    /// Runs `source` in an existing environment, keeping whatever it binds.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run_in(&self, source: &str, environment: &Environment) -> Result<Value, Error> {
        let program = sin_lang_core::parse(source)?;
        debug!(expressions = program.expressions.len(), "parsed program");
        Ok(self.evaluate(&program, environment)?)
    }

    /// Runs `source` in a fresh top-level environment.
    pub fn run(&self, source: &str) -> Result<Value, Error> {
        self.run_in(source, &Environment::new())
    }

    /// A top-level environment with the prelude already evaluated.
    pub fn prelude_environment(&self) -> Result<Environment, Error> {
        let environment = Environment::new();
        self.run_in(PRELUDE, &environment)?;
        Ok(environment)
    }
}

/// Runs `source` with the default configuration and host registry.
pub fn run(source: &str) -> Result<Value, Error> {
    Interpreter::default().run(source)
}
