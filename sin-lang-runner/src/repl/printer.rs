use sin_lang_interpreter::{EvalError, Value};

pub trait Printer {
    type Object;

    fn print(&mut self, object: Self::Object);
}

/// Echoes each result. Failures go to stderr so piped output stays values only.
pub struct ValuePrinter {}

impl Printer for ValuePrinter {
    type Object = Result<Value, EvalError>;

    fn print(&mut self, object: Self::Object) {
        match object {
            Ok(value) => println!("{}", value),
            Err(error) => eprintln!("Error evaluating:\n{}", error),
        }
    }
}
