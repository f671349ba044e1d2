use crate::ast::Block;
use crate::parser::expressions::parse_expression;
use crate::parser::{ParseError, Parser};

/// Parses expressions until one fails to start. The token that stopped the
/// block (`end`, `else`, ...) is left for the caller.
pub fn parse_block(parser: &mut Parser) -> Result<Block, ParseError> {
    let mut expressions = Vec::new();
    while let Some(expression) = parse_expression(parser)? {
        expressions.push(expression);
    }
    Ok(Block { expressions })
}
