use std::iter::Peekable;

use crate::{
    ast::{Expr, LiteralValue, Pos, UnaryOperator},
    engine::{
        lexer::{Token, TokenKind},
        parser::core::{expect, next_is, parse_expression, parse_if, parse_quantifier, ParseResult},
    },
    error::ParseError,
};

/// Parses a unary expression.
///
/// Supports the prefix operators `!` (logical not) and `-` (numeric
/// negation). Unary operators are right-associative, so `!-x` parses as
/// `!(-x)`.
///
/// Grammar:
/// ```text
///     unary := ("!" | "-") unary
///            | primary
/// ```
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
/// - `depth`: Current nesting depth.
///
/// # Returns
/// An [`Expr::UnaryOp`] or a primary expression.
pub fn parse_unary<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    match tokens.peek() {
        Some(token) if token.kind == TokenKind::Bang => {
            let pos = token.position();
            tokens.next();
            let expr = parse_unary(tokens, depth + 1)?;
            Ok(Expr::UnaryOp { op:   UnaryOperator::Not,
                               expr: Box::new(expr),
                               pos })
        },
        Some(token) if token.kind == TokenKind::Minus => {
            let pos = token.position();
            tokens.next();
            let expr = parse_unary(tokens, depth + 1)?;
            Ok(Expr::UnaryOp { op:   UnaryOperator::Negate,
                               expr: Box::new(expr),
                               pos })
        },
        _ => parse_primary(tokens, depth),
    }
}

/// Parses a primary (atomic) expression.
///
/// Primary expressions form the base of the grammar:
/// - boolean, integer, float and string literals
/// - `$var` and bare-identifier variables
/// - dotted function calls, e.g. `filesystem.read_file($f)`
/// - parenthesized expressions
/// - collection literals `[ ... ]`
/// - object literals `{ key: value, ... }`
/// - `if`/`then`/`else` expressions
/// - quantifiers used as operands
///
/// Lexing defects surface here: an `Unknown` token becomes
/// `UnknownCharacter` and an `UnterminatedStr` token becomes
/// `UnterminatedString`, both carrying the exact source position.
pub fn parse_primary<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let Some(&token) = tokens.peek() else {
        return Err(ParseError::UnexpectedEndOfInput { expected: "an expression".to_string(),
                                                      pos:      Pos::NONE, });
    };
    let pos = token.position();

    match &token.kind {
        TokenKind::Bool(b) => {
            tokens.next();
            Ok(Expr::Literal { value: LiteralValue::Bool(*b),
                               pos })
        },
        TokenKind::Int(n) => {
            tokens.next();
            Ok(Expr::Literal { value: LiteralValue::Int(*n),
                               pos })
        },
        TokenKind::Float(r) => {
            tokens.next();
            Ok(Expr::Literal { value: LiteralValue::Float(*r),
                               pos })
        },
        TokenKind::Str(s) => {
            tokens.next();
            Ok(Expr::Literal { value: LiteralValue::Str(s.clone()),
                               pos })
        },
        TokenKind::Var(name) => {
            tokens.next();
            Ok(Expr::Variable { name: name.clone(),
                                pos })
        },
        TokenKind::Ident(_) => parse_identifier_or_call(tokens, depth),
        TokenKind::LParen => parse_grouping(tokens, depth),
        TokenKind::LBracket => parse_collection_literal(tokens, depth),
        TokenKind::LBrace => parse_object_literal(tokens, depth),
        TokenKind::If => parse_if(tokens, depth),
        TokenKind::Forall | TokenKind::Exists => parse_quantifier(tokens, depth),
        TokenKind::UnterminatedStr => Err(ParseError::UnterminatedString { pos }),
        TokenKind::Unknown => Err(ParseError::UnknownCharacter { lexeme: token.lexeme.clone(),
                                                                 pos }),
        _ => Err(ParseError::UnexpectedToken { found:    token.lexeme.clone(),
                                               expected: "an expression".to_string(),
                                               pos }),
    }
}

/// Parses an identifier: either a variable reference or a function call.
///
/// A dotted path (`ns.name` or deeper) always denotes a registered
/// function, with or without an argument list; the original rule format
/// allows `filesystem.current_directory` as a zero-argument call. A bare
/// identifier followed by `(` is also a call; any other bare identifier is
/// a variable reference, equivalent to its `$`-prefixed form.
fn parse_identifier_or_call<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let first = tokens.next()
                      .ok_or(ParseError::UnexpectedEndOfInput { expected: "an identifier".to_string(),
                                                                pos:      Pos::NONE, })?;
    let pos = first.position();
    let mut name = match &first.kind {
        TokenKind::Ident(segment) => segment.clone(),
        _ => {
            return Err(ParseError::UnexpectedToken { found:    first.lexeme.clone(),
                                                     expected: "an identifier".to_string(),
                                                     pos });
        },
    };
    let mut dotted = false;

    while next_is(tokens, &TokenKind::Dot) {
        tokens.next();
        match tokens.next() {
            Some(token) => match &token.kind {
                TokenKind::Ident(segment) => {
                    name.push('.');
                    name.push_str(segment);
                    dotted = true;
                },
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        found: token.lexeme.clone(),
                        expected: "a function name after '.'".to_string(),
                        pos: token.position(),
                    });
                },
            },
            None => {
                return Err(ParseError::UnexpectedEndOfInput {
                    expected: "a function name after '.'".to_string(),
                    pos,
                });
            },
        }
    }

    if next_is(tokens, &TokenKind::LParen) {
        let arguments = parse_arguments(tokens, depth, pos)?;
        return Ok(Expr::FunctionCall { name, arguments, pos });
    }

    if dotted {
        return Ok(Expr::FunctionCall { name,
                                       arguments: Vec::new(),
                                       pos });
    }

    Ok(Expr::Variable { name, pos })
}

/// Parses a parenthesized argument list; the opening `(` has not been
/// consumed yet.
fn parse_arguments<'a, I>(tokens: &mut Peekable<I>,
                          depth: usize,
                          call_pos: Pos)
                          -> ParseResult<Vec<Expr>>
    where I: Iterator<Item = &'a Token> + Clone
{
    tokens.next(); // consume '('
    let mut arguments = Vec::new();

    if next_is(tokens, &TokenKind::RParen) {
        tokens.next();
        return Ok(arguments);
    }

    loop {
        arguments.push(parse_expression(tokens, depth + 1)?);

        match tokens.next() {
            Some(token) if token.kind == TokenKind::Comma => {},
            Some(token) if token.kind == TokenKind::RParen => break,
            Some(token) => {
                return Err(ParseError::UnexpectedToken {
                    found: token.lexeme.clone(),
                    expected: "',' or ')' in the argument list".to_string(),
                    pos: token.position(),
                });
            },
            None => {
                return Err(ParseError::UnexpectedEndOfInput {
                    expected: "')' after function arguments".to_string(),
                    pos: call_pos,
                });
            },
        }
    }

    Ok(arguments)
}

/// Parses a parenthesized expression; the opening `(` has not been
/// consumed yet.
fn parse_grouping<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let open = tokens.next()
                     .ok_or(ParseError::UnexpectedEndOfInput { expected: "'('".to_string(),
                                                               pos:      Pos::NONE, })?;
    let expr = parse_expression(tokens, depth + 1)?;

    match tokens.next() {
        Some(token) if token.kind == TokenKind::RParen => Ok(expr),
        Some(token) => Err(ParseError::UnexpectedToken { found:    token.lexeme.clone(),
                                                         expected: "')' after the expression".to_string(),
                                                         pos:      token.position(), }),
        None => Err(ParseError::UnexpectedEndOfInput { expected: "')' after the expression".to_string(),
                                                       pos:      open.position(), }),
    }
}

/// Parses a collection literal; the opening `[` has not been consumed yet.
///
/// Elements are evaluated in source order at runtime, and that order is
/// what quantifiers iterate.
fn parse_collection_literal<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let open = tokens.next()
                     .ok_or(ParseError::UnexpectedEndOfInput { expected: "'['".to_string(),
                                                               pos:      Pos::NONE, })?;
    let pos = open.position();
    let mut elements = Vec::new();

    if next_is(tokens, &TokenKind::RBracket) {
        tokens.next();
        return Ok(Expr::Collection { elements, pos });
    }

    loop {
        elements.push(parse_expression(tokens, depth + 1)?);

        match tokens.next() {
            Some(token) if token.kind == TokenKind::Comma => {},
            Some(token) if token.kind == TokenKind::RBracket => break,
            Some(token) => {
                return Err(ParseError::UnexpectedToken {
                    found: token.lexeme.clone(),
                    expected: "',' or ']' in the collection".to_string(),
                    pos: token.position(),
                });
            },
            None => {
                return Err(ParseError::UnexpectedEndOfInput {
                    expected: "']' after collection elements".to_string(),
                    pos,
                });
            },
        }
    }

    Ok(Expr::Collection { elements, pos })
}

/// Parses an object literal; the opening `{` has not been consumed yet.
///
/// Keys are identifiers or string literals. Duplicate keys are legal and
/// take the last-written value at evaluation time.
fn parse_object_literal<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let open = tokens.next()
                     .ok_or(ParseError::UnexpectedEndOfInput { expected: "'{'".to_string(),
                                                               pos:      Pos::NONE, })?;
    let pos = open.position();
    let mut entries = Vec::new();

    if next_is(tokens, &TokenKind::RBrace) {
        tokens.next();
        return Ok(Expr::Object { entries, pos });
    }

    loop {
        let key = match tokens.next() {
            Some(token) => match &token.kind {
                TokenKind::Ident(name) | TokenKind::Str(name) => name.clone(),
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        found: token.lexeme.clone(),
                        expected: "an identifier or string as the object key".to_string(),
                        pos: token.position(),
                    });
                },
            },
            None => {
                return Err(ParseError::UnexpectedEndOfInput {
                    expected: "an object key".to_string(),
                    pos,
                });
            },
        };

        expect(tokens, &TokenKind::Colon, "':' after the object key", pos)?;

        let value = parse_expression(tokens, depth + 1)?;
        entries.push((key, value));

        match tokens.next() {
            Some(token) if token.kind == TokenKind::Comma => {},
            Some(token) if token.kind == TokenKind::RBrace => break,
            Some(token) => {
                return Err(ParseError::UnexpectedToken {
                    found: token.lexeme.clone(),
                    expected: "',' or '}' in the object".to_string(),
                    pos: token.position(),
                });
            },
            None => {
                return Err(ParseError::UnexpectedEndOfInput {
                    expected: "'}' after object entries".to_string(),
                    pos,
                });
            },
        }
    }

    Ok(Expr::Object { entries, pos })
}
