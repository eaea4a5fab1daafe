use std::iter::Peekable;

use crate::{
    ast::{Expr, Pos, QuantifierKind},
    engine::{
        lexer::{Token, TokenKind},
        parser::binary::parse_implication,
    },
    error::ParseError,
};

/// Result type used by every parsing function.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum expression nesting depth before parsing is refused.
///
/// Bounds recursion so a pathological rule cannot exhaust the stack.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parses a complete token sequence into a program.
///
/// This is the entry point for rule parsing. A program is one or more
/// statements separated by semicolons; the value of a program is the value
/// of its last statement.
///
/// Grammar: `program := statement (";" statement)* ";"?`
///
/// # Parameters
/// - `tokens`: The full token sequence produced by the lexer.
///
/// # Returns
/// An `Expr::Program` node, or the first `ParseError` encountered.
///
/// # Errors
/// Any lexing defect surfaces here as a diagnosed error: `Unknown` tokens
/// become `UnknownCharacter` and `UnterminatedStr` tokens become
/// `UnterminatedString`. The parser does not attempt error recovery; the
/// first structural violation aborts parsing of the whole input.
pub fn parse(tokens: &[Token]) -> ParseResult<Expr> {
    let mut iter = tokens.iter().peekable();
    let pos = tokens.first().map_or(Pos::new(1, 1), Token::position);
    let mut statements = Vec::new();

    loop {
        while next_is(&mut iter, &TokenKind::Semicolon) {
            iter.next();
        }
        if iter.peek().is_none() {
            break;
        }

        statements.push(parse_statement(&mut iter)?);
    }

    Ok(Expr::Program { statements, pos })
}

/// Parses one statement and checks its terminator.
///
/// A statement is a single expression followed by `;` or the end of input.
/// Anything else after the expression is reported rather than ignored, so a
/// malformed rule can never be half-read and silently "pass".
fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let pos = tokens.peek().map_or(Pos::NONE, |t| t.position());
    let expr = parse_expression(tokens, 0)?;

    match tokens.peek() {
        None => {},
        Some(token) if token.kind == TokenKind::Semicolon => {},
        Some(token) if token.kind == TokenKind::Unknown => {
            return Err(ParseError::UnknownCharacter { lexeme: token.lexeme.clone(),
                                                      pos:    token.position(), });
        },
        Some(token) if token.kind == TokenKind::UnterminatedStr => {
            return Err(ParseError::UnterminatedString { pos: token.position() });
        },
        Some(token) => {
            return Err(ParseError::UnexpectedTrailingTokens { found: token.lexeme.clone(),
                                                              pos:   token.position(), });
        },
    }

    Ok(Expr::Block { expressions: vec![expr],
                     pos })
}

/// Parses a full expression.
///
/// An expression is either a quantifier or a conditional chain; quantifiers
/// sit at the top of the precedence cascade so that
/// `forall x in d: p && q` binds the whole conjunction as its condition.
///
/// Grammar: `expression := quantifier | ternary`
///
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
/// - `depth`: Current nesting depth, incremented by every construct that
///   re-enters the cascade; exceeds [`MAX_NESTING_DEPTH`] only in
///   pathological inputs, which are refused.
///
/// # Returns
/// The parsed expression node.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    if depth > MAX_NESTING_DEPTH {
        let pos = tokens.peek().map_or(Pos::NONE, |t| t.position());
        return Err(ParseError::NestingTooDeep { pos });
    }

    match tokens.peek() {
        Some(token) if matches!(token.kind, TokenKind::Forall | TokenKind::Exists) => {
            parse_quantifier(tokens, depth)
        },
        _ => parse_ternary(tokens, depth),
    }
}

/// Parses a quantifier expression.
///
/// Syntax:
/// ```text
///     forall <ident> in <domain> : <condition>
///     exists <ident> in <domain> : <condition>
/// ```
/// The symbolic forms `∀`/`∃` lex to the same tokens. The iteration
/// variable is stored in the quantifier node itself and is bound afresh for
/// every element of the domain during evaluation; it never joins the
/// enclosing scope.
///
/// # Errors
/// - `UnexpectedToken` if the variable, `in`, or `:` is missing.
/// - Propagates any errors from the domain and condition sub-expressions.
pub fn parse_quantifier<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let quantifier = tokens.next()
                           .ok_or(ParseError::UnexpectedEndOfInput { expected: "a quantifier".to_string(),
                                                                     pos:      Pos::NONE, })?;
    let pos = quantifier.position();
    let kind = match quantifier.kind {
        TokenKind::Forall => QuantifierKind::Forall,
        _ => QuantifierKind::Exists,
    };

    let variable = match tokens.next() {
        Some(token) => match &token.kind {
            TokenKind::Ident(name) | TokenKind::Var(name) => name.clone(),
            _ => {
                return Err(ParseError::UnexpectedToken {
                    found: token.lexeme.clone(),
                    expected: "a variable name after the quantifier".to_string(),
                    pos: token.position(),
                });
            },
        },
        None => {
            return Err(ParseError::UnexpectedEndOfInput {
                expected: "a variable name after the quantifier".to_string(),
                pos,
            });
        },
    };

    expect(tokens, &TokenKind::In, "'in' after the quantifier variable", pos)?;

    let domain = parse_ternary(tokens, depth + 1)?;

    expect(tokens, &TokenKind::Colon, "':' after the quantifier domain", pos)?;

    let condition = parse_expression(tokens, depth + 1)?;

    Ok(Expr::Quantifier { kind,
                          variable,
                          domain: Box::new(domain),
                          condition: Box::new(condition),
                          pos })
}

/// Parses a ternary conditional.
///
/// Grammar: `ternary := implication ("?" implication ":" implication)?`
///
/// The branches sit at implication level; a nested ternary or quantifier in
/// a branch needs parentheses, which keeps the branch `:` unambiguous with
/// the quantifier `:`. Exactly one branch is evaluated at runtime.
pub fn parse_ternary<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let expr = parse_implication(tokens, depth)?;

    match tokens.peek() {
        Some(token) if token.kind == TokenKind::Question => {
            let pos = token.position();
            tokens.next();

            let then_branch = parse_implication(tokens, depth + 1)?;
            expect(tokens, &TokenKind::Colon, "':' between conditional branches", pos)?;
            let else_branch = parse_implication(tokens, depth + 1)?;

            Ok(Expr::Conditional { condition: Box::new(expr),
                                   then_branch: Box::new(then_branch),
                                   else_branch: Box::new(else_branch),
                                   pos })
        },
        _ => Ok(expr),
    }
}

/// Parses an `if`/`then`/`else` expression; the leading `if` token has not
/// been consumed yet. The `else` branch is mandatory, since the construct
/// must produce a value either way.
pub fn parse_if<'a, I>(tokens: &mut Peekable<I>, depth: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a Token> + Clone
{
    let if_token = tokens.next()
                         .ok_or(ParseError::UnexpectedEndOfInput { expected: "'if'".to_string(),
                                                                   pos:      Pos::NONE, })?;
    let pos = if_token.position();

    let condition = parse_expression(tokens, depth + 1)?;
    expect(tokens, &TokenKind::Then, "'then' after the condition", pos)?;
    let then_branch = parse_expression(tokens, depth + 1)?;
    expect(tokens, &TokenKind::Else, "'else' after the then-branch", pos)?;
    let else_branch = parse_expression(tokens, depth + 1)?;

    Ok(Expr::Conditional { condition: Box::new(condition),
                           then_branch: Box::new(then_branch),
                           else_branch: Box::new(else_branch),
                           pos })
}

/// Returns `true` if the next token has the given kind, without consuming.
pub(crate) fn next_is<'a, I>(tokens: &mut Peekable<I>, kind: &TokenKind) -> bool
    where I: Iterator<Item = &'a Token> + Clone
{
    tokens.peek().is_some_and(|token| token.kind == *kind)
}

/// Consumes the next token, requiring it to have the given kind.
///
/// `context_pos` anchors the diagnostic when the input ends instead.
pub(crate) fn expect<'a, I>(tokens: &mut Peekable<I>,
                            kind: &TokenKind,
                            expected: &str,
                            context_pos: Pos)
                            -> ParseResult<()>
    where I: Iterator<Item = &'a Token> + Clone
{
    match tokens.next() {
        Some(token) if token.kind == *kind => Ok(()),
        Some(token) => Err(ParseError::UnexpectedToken { found:    token.lexeme.clone(),
                                                         expected: expected.to_string(),
                                                         pos:      token.position(), }),
        None => Err(ParseError::UnexpectedEndOfInput { expected: expected.to_string(),
                                                       pos:      context_pos, }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::BinaryOperator,
        engine::lexer::tokenize,
    };

    /// Unwraps a single-statement program down to its expression.
    fn expression(source: &str) -> Expr {
        let program = parse(&tokenize(source)).expect("source should parse");
        match program {
            Expr::Program { mut statements, .. } => match statements.pop() {
                Some(Expr::Block { mut expressions, .. }) => {
                    expressions.pop().expect("statement should hold an expression")
                },
                other => panic!("expected a block, got {other:?}"),
            },
            other => panic!("expected a program, got {other:?}"),
        }
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = expression("10 - 3 - 2");
        let Expr::BinaryOp { op, left, .. } = expr else {
            panic!("expected a binary op");
        };
        assert_eq!(op, BinaryOperator::Sub);
        assert!(matches!(*left, Expr::BinaryOp { op: BinaryOperator::Sub, .. }));
    }

    #[test]
    fn power_is_right_associative() {
        let expr = expression("2 ** 3 ** 2");
        let Expr::BinaryOp { op, right, .. } = expr else {
            panic!("expected a binary op");
        };
        assert_eq!(op, BinaryOperator::Pow);
        assert!(matches!(*right, Expr::BinaryOp { op: BinaryOperator::Pow, .. }));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = expression("true || false && false");
        let Expr::BinaryOp { op, right, .. } = expr else {
            panic!("expected a binary op");
        };
        assert_eq!(op, BinaryOperator::Or);
        assert!(matches!(*right, Expr::BinaryOp { op: BinaryOperator::And, .. }));
    }

    #[test]
    fn biconditional_binds_tighter_than_implication() {
        let expr = expression("a -> b <-> c");
        let Expr::BinaryOp { op, right, .. } = expr else {
            panic!("expected a binary op");
        };
        assert_eq!(op, BinaryOperator::Implies);
        assert!(matches!(*right, Expr::BinaryOp { op: BinaryOperator::Iff, .. }));
    }

    #[test]
    fn quantifiers_own_their_variable_domain_and_condition() {
        let expr = expression("forall f in filesystem.get_files(\"src\"): string.length(f) > 0");
        let Expr::Quantifier { kind,
                               variable,
                               domain,
                               condition,
                               .. } = expr
        else {
            panic!("expected a quantifier");
        };
        assert_eq!(kind, QuantifierKind::Forall);
        assert_eq!(variable, "f");
        assert!(matches!(*domain, Expr::FunctionCall { ref name, .. } if name == "filesystem.get_files"));
        assert!(matches!(*condition, Expr::BinaryOp { op: BinaryOperator::Greater, .. }));
    }

    #[test]
    fn dotted_names_without_parentheses_are_zero_argument_calls() {
        let expr = expression("filesystem.current_directory");
        assert!(matches!(expr,
                         Expr::FunctionCall { ref name, ref arguments, .. }
                             if name == "filesystem.current_directory" && arguments.is_empty()));
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let mut source = String::new();
        for _ in 0..(MAX_NESTING_DEPTH + 8) {
            source.push('(');
        }
        source.push('1');
        for _ in 0..(MAX_NESTING_DEPTH + 8) {
            source.push(')');
        }

        let result = parse(&tokenize(&source));
        assert!(matches!(result, Err(ParseError::NestingTooDeep { .. })));
    }
}
