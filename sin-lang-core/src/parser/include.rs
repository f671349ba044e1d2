use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ast::Expression;
use crate::lexer::Tokenizer;
use crate::parser::{ParseError, Parser};

/// Reads and parses `path`, relative to the working directory, with a parser
/// of its own. The parsed file becomes a single block expression.
pub(super) fn parse_include(parser: &Parser, path: &str) -> Result<Expression, ParseError> {
    let path = PathBuf::from(path);
    let canonical = fs::canonicalize(&path).map_err(|source| include_error(&path, source))?;
    if parser.includes.contains(&canonical) {
        return Err(ParseError::IncludeCycle { path });
    }

    let source = fs::read_to_string(&canonical).map_err(|source| include_error(&path, source))?;
    debug!(path = %canonical.display(), bytes = source.len(), "including");

    let mut includes = parser.includes.clone();
    includes.push(canonical);
    let block = Parser::with_includes(Tokenizer::new(&source), includes).parse_program()?;

    Ok(Expression::Block(block))
}

fn include_error(path: &Path, source: std::io::Error) -> ParseError {
    ParseError::Include {
        path: path.to_path_buf(),
        source,
    }
}
