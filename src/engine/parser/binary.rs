use std::iter::Peekable;

use crate::{
    ast::{BinaryOperator, Expr},
    engine::{
        lexer::{Token, TokenKind},
        parser::{core::ParseResult, primary::parse_unary},
    },
};

/// Parses implication expressions.
///
/// Implication is the loosest-binding binary operator. It is
/// left-associative and, unlike `&&`/`||`, evaluates both operands.
///
/// Grammar: `implication := biconditional ("->" biconditional)*`
///
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
/// - `depth`: Current nesting depth.
///
/// # Returns
/// A binary expression tree using `BinaryOperator::Implies`.
pub fn parse_implication<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_biconditional(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        if token.kind != TokenKind::Arrow {
            break;
        }
        let pos = token.position();
        tokens.next();

        let right = parse_biconditional(tokens, depth)?;
        left = Expr::BinaryOp { op:    BinaryOperator::Implies,
                                left:  Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses biconditional expressions.
///
/// Grammar: `biconditional := logical_or ("<->" logical_or)*`
pub fn parse_biconditional<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_logical_or(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        if token.kind != TokenKind::Iff {
            break;
        }
        let pos = token.position();
        tokens.next();

        let right = parse_logical_or(tokens, depth)?;
        left = Expr::BinaryOp { op:    BinaryOperator::Iff,
                                left:  Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses logical OR expressions.
///
/// Left-associative; binds looser than `&&`, so
/// `true || false && false` is `true || (false && false)`.
///
/// Grammar: `logical_or := logical_and ("||" logical_and)*`
pub fn parse_logical_or<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_logical_and(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        if token.kind != TokenKind::OrOr {
            break;
        }
        let pos = token.position();
        tokens.next();

        let right = parse_logical_and(tokens, depth)?;
        left = Expr::BinaryOp { op:    BinaryOperator::Or,
                                left:  Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses logical AND expressions.
///
/// Grammar: `logical_and := equality ("&&" equality)*`
pub fn parse_logical_and<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_equality(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        if token.kind != TokenKind::AndAnd {
            break;
        }
        let pos = token.position();
        tokens.next();

        let right = parse_equality(tokens, depth)?;
        left = Expr::BinaryOp { op:    BinaryOperator::And,
                                left:  Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses equality expressions.
///
/// Grammar: `equality := relational (("==" | "!=") relational)*`
pub fn parse_equality<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_relational(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        let op = match token.kind {
            TokenKind::EqEq => BinaryOperator::Equal,
            TokenKind::NotEq => BinaryOperator::NotEqual,
            _ => break,
        };
        let pos = token.position();
        tokens.next();

        let right = parse_relational(tokens, depth)?;
        left = Expr::BinaryOp { op,
                                left: Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses relational expressions.
///
/// Grammar: `relational := additive (("<" | "<=" | ">" | ">=") additive)*`
pub fn parse_relational<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_additive(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        let op = match token.kind {
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::LessEq => BinaryOperator::LessEqual,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::GreaterEq => BinaryOperator::GreaterEqual,
            _ => break,
        };
        let pos = token.position();
        tokens.next();

        let right = parse_additive(tokens, depth)?;
        left = Expr::BinaryOp { op,
                                left: Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses addition and subtraction expressions.
///
/// Grammar: `additive := multiplicative (("+" | "-") multiplicative)*`
pub fn parse_additive<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_multiplicative(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        let op = match token.kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            _ => break,
        };
        let pos = token.position();
        tokens.next();

        let right = parse_multiplicative(tokens, depth)?;
        left = Expr::BinaryOp { op,
                                left: Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses multiplication-level expressions.
///
/// Grammar: `multiplicative := power (("*" | "/" | "%") power)*`
pub fn parse_multiplicative<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let mut left = parse_power(tokens, depth)?;

    while let Some(token) = tokens.peek() {
        let op = match token.kind {
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Percent => BinaryOperator::Mod,
            _ => break,
        };
        let pos = token.position();
        tokens.next();

        let right = parse_power(tokens, depth)?;
        left = Expr::BinaryOp { op,
                                left: Box::new(left),
                                right: Box::new(right),
                                pos };
    }

    Ok(left)
}

/// Parses exponentiation expressions.
///
/// Power is the single right-associative binary operator:
/// `2 ** 3 ** 2` parses as `2 ** (3 ** 2)` and evaluates to `512`.
///
/// Grammar: `power := unary ("**" power)?`
pub fn parse_power<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let left = parse_unary(tokens, depth)?;

    match tokens.peek() {
        Some(token) if token.kind == TokenKind::StarStar => {
            let pos = token.position();
            tokens.next();

            let right = parse_power(tokens, depth + 1)?;
            Ok(Expr::BinaryOp { op:    BinaryOperator::Pow,
                                left:  Box::new(left),
                                right: Box::new(right),
                                pos })
        },
        _ => Ok(left),
    }
}
