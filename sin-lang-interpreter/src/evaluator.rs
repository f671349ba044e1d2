use gc::Gc;
use tracing::{debug, trace};

use crate::environment::Environment;
use crate::error::{AccessError, EvalError};
use crate::host::HostRegistry;
use crate::value::{Closure, NativeFunction, Record, Value};
use sin_lang_core::ast::{self, Expression, Literal};
use sin_lang_core::stack::ensure_sufficient_stack;

/// Tree-walking evaluator for one run of a program.
pub struct Evaluator<'a> {
    host: &'a HostRegistry,
    max_call_depth: usize,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(host: &'a HostRegistry, max_call_depth: usize) -> Self {
        Evaluator {
            host,
            max_call_depth,
            depth: 0,
        }
    }

    /// Evaluates every expression in order in `environment` itself. The
    /// result is the last value, or `nil` for an empty block.
    pub fn eval_block(
        &mut self,
        block: &ast::Block,
        environment: &Environment,
    ) -> Result<Value, EvalError> {
        let mut result = Value::Nil;
        for expression in &block.expressions {
            result = self.eval_expression(expression, environment)?;
        }
        Ok(result)
    }

    pub fn eval_expression(
        &mut self,
        expression: &Expression,
        environment: &Environment,
    ) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| self.eval_expression_inner(expression, environment))
    }

    fn eval_expression_inner(
        &mut self,
        expression: &Expression,
        environment: &Environment,
    ) -> Result<Value, EvalError> {
        match expression {
            Expression::Variable(identifier) => Ok(environment.lookup(&identifier.name)),
            Expression::Literal(Literal::Number(value)) => Ok(Value::Number(*value)),
            Expression::Literal(Literal::String(value)) => Ok(Value::String(value.clone())),
            Expression::Literal(Literal::List(elements)) => {
                let elements = self.eval_expressions(elements, environment)?;
                Ok(Value::list(elements))
            }
            Expression::EmbeddedHostCode(code) => self.resolve_host(code),
            Expression::PropertyAccess { target, key } => {
                let target = self.eval_expression(target, environment)?;
                read_field(&target, &key.name)
            }
            Expression::ListIndex { target, index } => {
                let target = self.eval_expression(target, environment)?;
                let index = self.eval_expression(index, environment)?;
                read_index(&target, &index)
            }
            Expression::Call { callee, arguments } => {
                let frame = Environment::new_enclosed(environment);
                let function = self.eval_expression(callee, &frame)?;
                let arguments = self.eval_expressions(arguments, &frame)?;
                self.apply(callee, function, arguments, &frame)
            }
            Expression::HostCall { code, arguments } => {
                let frame = Environment::new_enclosed(environment);
                let arguments = self.eval_expressions(arguments, &frame)?;
                match &self.resolve_host(code)? {
                    Value::Native(native) => call_native(native, arguments),
                    value => Err(EvalError::NotCallable {
                        callee: format!("{{{}}}", code),
                        value: value.clone(),
                    }),
                }
            }
            Expression::Assign { target, value } => {
                let value = self.eval_expression(value, environment)?;
                self.assign(target, value.clone(), environment)?;
                Ok(value)
            }
            Expression::Block(block) => self.eval_block(block, environment),
            Expression::Condition {
                condition,
                consequence,
                alternative,
            } => {
                let frame = Environment::new_enclosed(environment);
                if self.eval_expression(condition, &frame)?.is_truthy() {
                    self.eval_block(consequence, &frame)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, &frame)
                } else {
                    Ok(Value::Nil)
                }
            }
            Expression::Loop { condition, body } => {
                // One frame for every iteration, so the condition sees what the
                // previous pass of the body bound.
                let frame = Environment::new_enclosed(environment);
                let mut result = Value::Nil;
                while self.eval_expression(condition, &frame)?.is_truthy() {
                    result = self.eval_block(body, &frame)?;
                }
                Ok(result)
            }
            Expression::Function { parameters, body } => Ok(Value::Function(Gc::new(Closure {
                parameters: parameters
                    .iter()
                    .map(|parameter| parameter.name.clone())
                    .collect(),
                body: body.clone(),
                captured: environment.snapshot(),
            }))),
            Expression::Record(fields) => {
                let mut record = Record::default();
                for field in fields {
                    let value = self.eval_expression(&field.value, environment)?;
                    record.set(field.name.name.clone(), value);
                }
                Ok(Value::record(record))
            }
        }
    }

    fn eval_expressions(
        &mut self,
        expressions: &[Expression],
        environment: &Environment,
    ) -> Result<Vec<Value>, EvalError> {
        expressions
            .iter()
            .map(|expression| self.eval_expression(expression, environment))
            .collect()
    }

    fn resolve_host(&self, code: &str) -> Result<Value, EvalError> {
        self.host
            .resolve(code)
            .ok_or_else(|| EvalError::UnknownHostCode(code.into()))
    }

    fn apply(
        &mut self,
        callee: &Expression,
        function: Value,
        arguments: Vec<Value>,
        call_site: &Environment,
    ) -> Result<Value, EvalError> {
        match &function {
            Value::Function(closure) => self.call_closure(closure, arguments, call_site),
            Value::Native(native) => call_native(native, arguments),
            other => Err(EvalError::NotCallable {
                callee: callee.to_string(),
                value: other.clone(),
            }),
        }
    }

    /// The call frame's parent is the call site, not the definition site. The
    /// captured bindings go in first so parameters override them.
    fn call_closure(
        &mut self,
        closure: &Closure,
        arguments: Vec<Value>,
        call_site: &Environment,
    ) -> Result<Value, EvalError> {
        if self.depth >= self.max_call_depth {
            return Err(EvalError::StackOverflow(self.max_call_depth));
        }

        let frame = Environment::new_enclosed(call_site);
        for (name, value) in &closure.captured {
            frame.define(name.clone(), value.clone());
        }
        for (parameter, argument) in closure.parameters.iter().zip(arguments) {
            frame.define(parameter.clone(), argument);
        }
        debug!(
            parameters = ?closure.parameters,
            depth = self.depth + 1,
            "calling closure"
        );

        self.depth += 1;
        let result = self.eval_block(&closure.body, &frame);
        self.depth -= 1;
        result
    }

    fn assign(
        &mut self,
        target: &Expression,
        value: Value,
        environment: &Environment,
    ) -> Result<(), EvalError> {
        match target {
            Expression::Variable(identifier) => {
                environment.set(identifier.name.clone(), value);
                Ok(())
            }
            Expression::ListIndex {
                target: list,
                index,
            } => {
                let list = self.eval_expression(list, environment)?;
                let index = self.eval_expression(index, environment)?;
                write_index(&list, &index, value)
            }
            Expression::PropertyAccess { target: record, key } => {
                match &self.eval_expression(record, environment)? {
                    Value::Record(record) => {
                        record.borrow_mut().set(key.name.clone(), value);
                        Ok(())
                    }
                    other => Err(AccessError::NotARecord {
                        field: key.name.clone(),
                        value: other.clone(),
                    }
                    .into()),
                }
            }
            other => Err(EvalError::InvalidAssignTarget(other.to_string())),
        }
    }
}

fn call_native(native: &NativeFunction, arguments: Vec<Value>) -> Result<Value, EvalError> {
    trace!(name = %native.name, arguments = arguments.len(), "calling host function");
    (native.func)(arguments).map_err(|message| EvalError::Host {
        name: native.name.clone(),
        message,
    })
}

fn read_field(target: &Value, field: &str) -> Result<Value, EvalError> {
    match target {
        Value::Record(record) => record
            .borrow()
            .get(field)
            .cloned()
            .ok_or_else(|| AccessError::MissingField(field.into()).into()),
        other => Err(AccessError::NotARecord {
            field: field.into(),
            value: other.clone(),
        }
        .into()),
    }
}

/// Checks that `index` is a number addressing one of `length` slots.
fn slot(index: &Value, length: usize) -> Result<usize, AccessError> {
    let Value::Number(number) = index else {
        return Err(AccessError::NonIntegerIndex(index.clone()));
    };
    usize::try_from(*number)
        .ok()
        .filter(|slot| *slot < length)
        .ok_or(AccessError::IndexOutOfRange {
            index: *number,
            length,
        })
}

fn read_index(target: &Value, index: &Value) -> Result<Value, EvalError> {
    match target {
        Value::List(list) => {
            let list = list.borrow();
            let slot = slot(index, list.len())?;
            Ok(list[slot].clone())
        }
        Value::String(text) => {
            let slot = slot(index, text.chars().count())?;
            let character = text.chars().nth(slot).map(String::from).unwrap_or_default();
            Ok(Value::string(&character))
        }
        other => Err(AccessError::NotIndexable(other.clone()).into()),
    }
}

fn write_index(target: &Value, index: &Value, value: Value) -> Result<(), EvalError> {
    match target {
        Value::List(list) => {
            let mut list = list.borrow_mut();
            let slot = slot(index, list.len())?;
            list[slot] = value;
            Ok(())
        }
        other => Err(AccessError::NotIndexable(other.clone()).into()),
    }
}
