use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sin_lang_core::ast::Block;
use sin_lang_core::parser::ParseError;
use tracing::warn;

const PROMPT: &str = ">> ";
const CONTINUATION_PROMPT: &str = ".. ";

pub enum ReadOutput {
    Exit,
    Clear,
    Value(Block),
}

pub struct Reader {
    rl: DefaultEditor,
}

impl Reader {
    pub fn new(rl: DefaultEditor) -> Self {
        Self { rl }
    }

    /// Reads one complete program. Input that ends in the middle of an
    /// expression keeps reading on the next line.
    pub fn read(&mut self) -> ReadOutput {
        let mut source = String::new();

        loop {
            let prompt = if source.is_empty() {
                PROMPT
            } else {
                CONTINUATION_PROMPT
            };
            let line = match self.rl.readline(prompt) {
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    return ReadOutput::Clear;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    return ReadOutput::Exit;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    return ReadOutput::Exit;
                }
                Ok(line) => line,
            };
            if let Err(error) = self.rl.add_history_entry(&line) {
                warn!(%error, "could not add line to history");
            }
            source.push_str(&line);
            source.push('\n');

            match sin_lang_core::parse(&source) {
                Ok(program) => return ReadOutput::Value(program),
                Err(ParseError::PrematureEndOfInput { .. }) => continue,
                Err(error) => {
                    println!("Parsing error: {}", error);
                    return ReadOutput::Clear;
                }
            }
        }
    }
}
