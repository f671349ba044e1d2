use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

use crate::lexer::{LexError, Token, TokenKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("{got}: expected {expected}")]
    UnexpectedToken { expected: Expected, got: Token },
    #[error("end of input: expected {expected}")]
    PrematureEndOfInput { expected: Expected },
    #[error("Invalid number literal {0}")]
    InvalidLiteral(Token),
    #[error("Cannot include {path:?}: {source}")]
    Include {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path:?} includes itself")]
    IncludeCycle { path: PathBuf },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Expected {
    Token(TokenKind),
    Expression,
    EndOfInput,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Token(kind) => write!(f, "{}", kind),
            Expected::Expression => write!(f, "an expression"),
            Expected::EndOfInput => write!(f, "end of input"),
        }
    }
}

impl ParseError {
    pub fn unexpected_token(expected: TokenKind, got: Option<Token>) -> ParseError {
        Self::unexpected_other(Expected::Token(expected), got)
    }

    pub fn unexpected_other(expected: Expected, got: Option<Token>) -> ParseError {
        match got {
            Some(got) => ParseError::UnexpectedToken { expected, got },
            None => ParseError::PrematureEndOfInput { expected },
        }
    }

    /// The kind of token the parser was looking for, if this is a grammar error.
    pub fn expected(&self) -> Option<Expected> {
        match self {
            ParseError::UnexpectedToken { expected, .. }
            | ParseError::PrematureEndOfInput { expected } => Some(*expected),
            _ => None,
        }
    }
}
