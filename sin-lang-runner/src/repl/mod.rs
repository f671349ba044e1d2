mod evaluator;
mod printer;
mod reader;

use rustyline::DefaultEditor;
use sin_lang_interpreter::Interpreter;

use crate::runner::{top_level, RunError};
use evaluator::{Evaluator, InterpreterEvaluator};
use printer::{Printer, ValuePrinter};
use reader::{ReadOutput, Reader};

struct Repl<E: Evaluator, P: Printer> {
    reader: Reader,
    evaluator: E,
    printer: P,
}

impl<O, E: Evaluator<Object = O>, P: Printer<Object = O>> Repl<E, P> {
    fn run(mut self) {
        loop {
            match self.reader.read() {
                ReadOutput::Exit => break,
                ReadOutput::Clear => continue,
                ReadOutput::Value(program) => {
                    let result = self.evaluator.evaluate(program);
                    self.printer.print(result)
                }
            }
        }
    }
}

/// Reads lines until end of input. Bindings persist from one line to the next.
pub fn start(interpreter: &Interpreter, prelude: bool) -> Result<(), RunError> {
    let rl = DefaultEditor::new()?;
    let environment = top_level(interpreter, prelude)?;

    Repl {
        reader: Reader::new(rl),
        evaluator: InterpreterEvaluator::new(interpreter, environment),
        printer: ValuePrinter {},
    }
    .run();
    Ok(())
}
