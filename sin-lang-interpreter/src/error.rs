use std::rc::Rc;

use sin_lang_core::parser::ParseError;
use thiserror::Error;

use crate::value::Value;

/// Failure of the whole pipeline, from source text to value.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

#[derive(Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("{callee} is not a function: {value}")]
    NotCallable { callee: String, value: Value },
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("No host value registered for {{{0}}}")]
    UnknownHostCode(Rc<str>),
    #[error("Cannot assign to {0}")]
    InvalidAssignTarget(String),
    #[error("{name}: {message}")]
    Host { name: Rc<str>, message: String },
    #[error("Maximum call depth of {0} exceeded")]
    StackOverflow(usize),
}

#[derive(Debug, PartialEq, Error)]
pub enum AccessError {
    #[error("Record has no field {0:?}")]
    MissingField(Rc<str>),
    #[error("Index {index} out of range for length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("Cannot index into {} {0}", .0.type_name())]
    NotIndexable(Value),
    #[error("Cannot use {} {0} as an index", .0.type_name())]
    NonIntegerIndex(Value),
    #[error("Cannot read field {field:?} of {} {value}", .value.type_name())]
    NotARecord { field: Rc<str>, value: Value },
}
