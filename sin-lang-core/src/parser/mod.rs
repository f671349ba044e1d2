pub mod block;
pub mod error;
pub mod expressions;
mod include;

use std::path::PathBuf;

use tracing::trace;

use crate::ast::{Block, Expression};
use crate::lexer::{Token, TokenKind, Tokenizer};
pub use error::{Expected, ParseError};

/// Recursive-descent parser with a single token of lookahead.
pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    peeked: Option<Token>,
    /// Canonical paths of the files currently being included, outermost first.
    includes: Vec<PathBuf>,
}

impl<'a> Parser<'a> {
    pub fn new(tokenizer: Tokenizer<'a>) -> Self {
        Self::with_includes(tokenizer, Vec::new())
    }

    pub(crate) fn with_includes(tokenizer: Tokenizer<'a>, includes: Vec<PathBuf>) -> Self {
        Self {
            tokens: tokenizer,
            peeked: None,
            includes,
        }
    }

    /// Parses the whole input as one block. Tokens the block could not use are
    /// an error.
    pub fn parse_program(&mut self) -> Result<Block, ParseError> {
        let block = block::parse_block(self)?;
        match self.next_token()? {
            None => Ok(block),
            Some(token) => Err(ParseError::UnexpectedToken {
                expected: Expected::EndOfInput,
                got: token,
            }),
        }
    }

    pub(crate) fn peek(&mut self) -> Result<Option<&Token>, ParseError> {
        if self.peeked.is_none() {
            self.peeked = self.tokens.next().transpose()?;
        }
        Ok(self.peeked.as_ref())
    }

    pub(crate) fn peek_kind(&mut self) -> Result<Option<TokenKind>, ParseError> {
        Ok(self.peek()?.map(|token| token.kind))
    }

    pub(crate) fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.peek()?;
        let token = self.peeked.take();
        if let Some(token) = &token {
            trace!(%token, "consumed");
        }
        Ok(token)
    }

    /// Consumes the next token only if it has the given kind.
    pub(crate) fn accept(&mut self, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        if self.peek_kind()? == Some(kind) {
            self.next_token()
        } else {
            Ok(None)
        }
    }

    pub(crate) fn expect_token(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.accept(kind)? {
            Some(token) => Ok(token),
            None => Err(ParseError::unexpected_token(kind, self.peeked.clone())),
        }
    }

    pub(crate) fn expect_expression(&mut self) -> Result<Expression, ParseError> {
        match expressions::parse_expression(self)? {
            Some(expression) => Ok(expression),
            None => Err(ParseError::unexpected_other(
                Expected::Expression,
                self.peeked.clone(),
            )),
        }
    }
}

/// Parses a complete program.
pub fn parse(source: &str) -> Result<Block, ParseError> {
    Parser::new(Tokenizer::new(source)).parse_program()
}
