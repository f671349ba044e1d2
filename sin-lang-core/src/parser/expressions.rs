use std::rc::Rc;

use super::block::parse_block;
use super::error::{Expected, ParseError};
use super::include::parse_include;
use crate::ast::{Expression, Field, Identifier, Literal};
use crate::lexer::{Token, TokenKind};
use crate::parser::Parser;
use crate::stack::ensure_sufficient_stack;

/// Parses `primary` followed by at most one infix call or assignment.
///
/// Returns `Ok(None)` without consuming anything when the next token cannot
/// start an expression; blocks use that to find their end.
pub fn parse_expression(parser: &mut Parser) -> Result<Option<Expression>, ParseError> {
    ensure_sufficient_stack(|| {
        let Some(left) = parse_primary(parser)? else {
            return Ok(None);
        };

        if let Some(token) = parser.accept(TokenKind::InfixCall)? {
            let right = parser.expect_expression()?;
            return Ok(Some(Expression::Call {
                callee: Box::new(Expression::Variable(Identifier {
                    name: strip_delimiters(&token).into(),
                })),
                arguments: vec![left, right],
            }));
        }

        if parser.accept(TokenKind::Assign)?.is_some() {
            let value = parser.expect_expression()?;
            return Ok(Some(Expression::Assign {
                target: Box::new(left),
                value: Box::new(value),
            }));
        }

        Ok(Some(left))
    })
}

fn parse_primary(parser: &mut Parser) -> Result<Option<Expression>, ParseError> {
    let Some(atom) = parse_atom(parser)? else {
        return Ok(None);
    };

    let expression = match parser.peek_kind()? {
        Some(TokenKind::LParen) if is_callable(&atom) => {
            parser.next_token()?;
            let arguments = parse_arguments(parser)?;
            match atom {
                Expression::EmbeddedHostCode(code) => Expression::HostCall { code, arguments },
                callee => Expression::Call {
                    callee: Box::new(callee),
                    arguments,
                },
            }
        }
        Some(TokenKind::LBracket) => {
            parser.next_token()?;
            let index = parser.expect_expression()?;
            parser.expect_token(TokenKind::RBracket)?;
            Expression::ListIndex {
                target: Box::new(atom),
                index: Box::new(index),
            }
        }
        Some(TokenKind::Dot) => {
            parser.next_token()?;
            let key = parse_identifier(parser)?;
            Expression::PropertyAccess {
                target: Box::new(atom),
                key,
            }
        }
        _ => atom,
    };

    Ok(Some(expression))
}

fn is_callable(atom: &Expression) -> bool {
    matches!(
        atom,
        Expression::Variable(_)
            | Expression::Function { .. }
            | Expression::Condition { .. }
            | Expression::Call { .. }
            | Expression::EmbeddedHostCode(_)
    )
}

fn parse_atom(parser: &mut Parser) -> Result<Option<Expression>, ParseError> {
    let starts_atom = matches!(
        parser.peek_kind()?,
        Some(
            TokenKind::Identifier
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::HostCode
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Function
                | TokenKind::Data
                | TokenKind::Include
        )
    );
    if !starts_atom {
        return Ok(None);
    }
    let Some(token) = parser.next_token()? else {
        return Ok(None);
    };

    let atom = match token.kind {
        TokenKind::Identifier => Expression::Variable(Identifier {
            name: token.text.clone(),
        }),
        TokenKind::Number => {
            let value = token
                .text
                .parse::<i64>()
                .map_err(|_| ParseError::InvalidLiteral(token.clone()))?;
            Expression::Literal(Literal::Number(value))
        }
        TokenKind::String => Expression::Literal(Literal::String(strip_delimiters(&token).into())),
        TokenKind::HostCode => Expression::EmbeddedHostCode(strip_delimiters(&token).trim().into()),
        TokenKind::LParen => {
            let expression = parser.expect_expression()?;
            parser.expect_token(TokenKind::RParen)?;
            expression
        }
        TokenKind::LBracket => parse_list_literal(parser)?,
        TokenKind::If => parse_condition(parser)?,
        TokenKind::While => parse_loop(parser)?,
        TokenKind::Function => parse_function_literal(parser)?,
        TokenKind::Data => parse_record_literal(parser)?,
        TokenKind::Include => {
            let path = parser.expect_token(TokenKind::String)?;
            parse_include(parser, strip_delimiters(&path))?
        }
        _ => return Err(ParseError::unexpected_other(Expected::Expression, Some(token))),
    };

    Ok(Some(atom))
}

/// The token text without its first and last character (quotes, backticks or
/// braces).
fn strip_delimiters(token: &Token) -> &str {
    let text: &str = &token.text;
    text.get(1..text.len().saturating_sub(1)).unwrap_or_default()
}

fn parse_identifier(parser: &mut Parser) -> Result<Identifier, ParseError> {
    let token = parser.expect_token(TokenKind::Identifier)?;
    Ok(Identifier { name: token.text })
}

/// Arguments after an opening `(`. Commas between arguments are optional.
fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    let mut arguments = Vec::new();
    while parser.accept(TokenKind::RParen)?.is_none() {
        let Some(argument) = parse_expression(parser)? else {
            let got = parser.peek()?.cloned();
            return Err(ParseError::unexpected_token(TokenKind::RParen, got));
        };
        arguments.push(argument);
        parser.accept(TokenKind::Comma)?;
    }
    Ok(arguments)
}

fn parse_list_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut elements = Vec::new();
    if parser.accept(TokenKind::RBracket)?.is_none() {
        elements.push(parser.expect_expression()?);
        while parser.accept(TokenKind::Comma)?.is_some() {
            elements.push(parser.expect_expression()?);
        }
        parser.expect_token(TokenKind::RBracket)?;
    }
    Ok(Expression::Literal(Literal::List(elements)))
}

fn parse_condition(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parser.expect_expression()?);
    parser.expect_token(TokenKind::Then)?;
    let consequence = parse_block(parser)?;

    let alternative = if parser.accept(TokenKind::Else)?.is_some() {
        Some(parse_block(parser)?)
    } else {
        None
    };
    parser.expect_token(TokenKind::End)?;

    Ok(Expression::Condition {
        condition,
        consequence,
        alternative,
    })
}

fn parse_loop(parser: &mut Parser) -> Result<Expression, ParseError> {
    let condition = Box::new(parser.expect_expression()?);
    parser.expect_token(TokenKind::Do)?;
    let body = parse_block(parser)?;
    parser.expect_token(TokenKind::End)?;

    Ok(Expression::Loop { condition, body })
}

fn parse_function_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect_token(TokenKind::LParen)?;
    let parameters = parse_parameters(parser)?;
    let body = parse_block(parser)?;
    parser.expect_token(TokenKind::End)?;

    Ok(Expression::Function {
        parameters,
        body: Rc::new(body),
    })
}

fn parse_parameters(parser: &mut Parser) -> Result<Vec<Identifier>, ParseError> {
    let mut parameters = Vec::new();
    if parser.accept(TokenKind::RParen)?.is_some() {
        return Ok(parameters);
    }

    parameters.push(parse_identifier(parser)?);
    while parser.accept(TokenKind::Comma)?.is_some() {
        parameters.push(parse_identifier(parser)?);
    }
    parser.expect_token(TokenKind::RParen)?;

    Ok(parameters)
}

fn parse_record_literal(parser: &mut Parser) -> Result<Expression, ParseError> {
    let mut fields = Vec::new();
    while let Some(token) = parser.accept(TokenKind::Identifier)? {
        parser.expect_token(TokenKind::Arrow)?;
        let value = parser.expect_expression()?;
        fields.push(Field {
            name: Identifier { name: token.text },
            value,
        });
    }
    parser.expect_token(TokenKind::End)?;

    Ok(Expression::Record(fields))
}
