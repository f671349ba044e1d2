use sin_lang_core::ast::Block;
use sin_lang_interpreter::{Environment, EvalError, Interpreter, Value};

pub trait Evaluator {
    type Object;

    fn evaluate(&mut self, program: Block) -> Self::Object;
}

pub struct InterpreterEvaluator<'a> {
    interpreter: &'a Interpreter,
    environment: Environment,
}

impl<'a> InterpreterEvaluator<'a> {
    pub fn new(interpreter: &'a Interpreter, environment: Environment) -> Self {
        Self {
            interpreter,
            environment,
        }
    }
}

impl Evaluator for InterpreterEvaluator<'_> {
    type Object = Result<Value, EvalError>;

    fn evaluate(&mut self, program: Block) -> Self::Object {
        self.interpreter.evaluate(&program, &self.environment)
    }
}
