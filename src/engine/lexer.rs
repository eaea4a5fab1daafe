use logos::Logos;

use crate::ast::Pos;

/// Classifies a lexical token.
///
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the rule language. Multi
/// character operators are disambiguated by greedy longest-match, so `<->`
/// is one token and never `<` followed by `->`.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    /// Floating-point literal tokens, such as `3.14`, `.5` or `2.1e-10`.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", parse_float)]
    Float(f64),
    /// Integer literal tokens, such as `42`.
    #[regex(r"[0-9]+", parse_int)]
    Int(i64),
    /// Boolean literal tokens; case-sensitive `true` and `false` only.
    #[token("true", parse_bool)]
    #[token("false", parse_bool)]
    Bool(bool),
    /// String literal tokens, single- or double-quoted, escapes resolved.
    #[regex(r#""([^"\\]|\\.)*""#, parse_string, priority = 6)]
    #[regex(r"'([^'\\]|\\.)*'", parse_string, priority = 6)]
    Str(String),
    /// An opening quote whose string literal never closes.
    #[regex(r#""([^"\\]|\\.)*"#, priority = 3)]
    #[regex(r"'([^'\\]|\\.)*", priority = 3)]
    UnterminatedStr,
    /// Variable reference tokens carrying the name without the `$` sigil.
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Var(String),
    /// `forall`
    #[token("forall")]
    #[token("∀")]
    Forall,
    /// `exists`
    #[token("exists")]
    #[token("∃")]
    Exists,
    /// `in`
    #[token("in")]
    In,
    /// `if`
    #[token("if")]
    If,
    /// `then`
    #[token("then")]
    Then,
    /// `else`
    #[token("else")]
    Else,
    /// Identifier tokens; variable or function-segment names such as `file`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    /// `# Line comments.`
    #[regex(r"#[^\n]*", logos::skip)]
    LineComment,
    /// `/* Block comments. */`
    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `!`
    #[token("!")]
    Bang,
    /// `==`
    #[token("==")]
    EqEq,
    /// `!=`
    #[token("!=")]
    NotEq,
    /// `<->`
    #[token("<->")]
    Iff,
    /// `<=`
    #[token("<=")]
    LessEq,
    /// `<`
    #[token("<")]
    Less,
    /// `>=`
    #[token(">=")]
    GreaterEq,
    /// `>`
    #[token(">")]
    Greater,
    /// `->`
    #[token("->")]
    Arrow,
    /// `=`
    #[token("=")]
    Assign,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `**`
    #[token("**")]
    StarStar,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `.`
    #[token(".")]
    Dot,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `?`
    #[token("?")]
    Question,
    /// Any character no other rule recognizes. Emitted instead of failing;
    /// the parser turns it into a diagnosed `ParseError`.
    #[regex(r".", priority = 0)]
    Unknown,
}

/// A lexical token: its kind, the raw source text it covers, and where it
/// starts. Tokens are immutable; `tokenize` can be called any number of
/// times over the same input and yields the same sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is, with any literal payload.
    pub kind:   TokenKind,
    /// The raw source text of the token.
    pub lexeme: String,
    /// 1-based source line of the first character.
    pub line:   usize,
    /// 1-based source column of the first character.
    pub column: usize,
}

impl Token {
    /// Gets the source position of the token.
    #[must_use]
    pub const fn position(&self) -> Pos {
        Pos::new(self.line, self.column)
    }
}

/// Converts source text into a finite token sequence.
///
/// The sequence is complete: unrecognized characters appear as
/// `TokenKind::Unknown` tokens and unclosed quotes as
/// `TokenKind::UnterminatedStr`, each carrying the offending lexeme and
/// position, so callers never lose sight of where lexing went wrong. No
/// state persists between calls.
///
/// # Parameters
/// - `source`: The rule expression text.
///
/// # Returns
/// All tokens of `source` in order, comments and whitespace skipped.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    let line_starts = line_starts(source);
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = position_of(source, &line_starts, span.start);
        // Callback failures (e.g. an integer literal that overflows i64)
        // degrade to Unknown rather than aborting the scan.
        let kind = result.unwrap_or(TokenKind::Unknown);
        tokens.push(Token { kind,
                            lexeme: source[span].to_string(),
                            line,
                            column });
    }

    tokens
}

/// Byte offsets at which each source line begins.
fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0).chain(source.match_indices('\n').map(|(i, _)| i + 1))
                      .collect()
}

/// Maps a byte offset to a 1-based (line, column) pair, counting columns in
/// characters.
fn position_of(source: &str, line_starts: &[usize], offset: usize) -> (usize, usize) {
    let line_index = line_starts.partition_point(|&start| start <= offset) - 1;
    let column = source[line_starts[line_index]..offset].chars().count() + 1;
    (line_index + 1, column)
}

/// Parses a floating-point literal from the current token slice.
fn parse_float(lex: &logos::Lexer<TokenKind>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Parses an integer literal from the current token slice.
fn parse_int(lex: &logos::Lexer<TokenKind>) -> Option<i64> {
    lex.slice().parse().ok()
}

/// Parses a boolean literal from the current token slice.
fn parse_bool(lex: &logos::Lexer<TokenKind>) -> Option<bool> {
    match lex.slice() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Resolves quotes and escape sequences in a string literal slice.
fn parse_string(lex: &logos::Lexer<TokenKind>) -> String {
    let raw = lex.slice();
    let inner = &raw[1..raw.len() - 1];
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some(other) => value.push(other),
            None => {},
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn three_character_operators_win_over_shorter_prefixes() {
        // `<->` must lex as one token, never `<` `-` `>` or `<` `->`.
        assert_eq!(kinds("a <-> b"),
                   vec![TokenKind::Ident("a".to_string()),
                        TokenKind::Iff,
                        TokenKind::Ident("b".to_string())]);
        // With no `>` to complete the arrow, `<` and `-` are separate.
        assert_eq!(kinds("a <- b"),
                   vec![TokenKind::Ident("a".to_string()),
                        TokenKind::Less,
                        TokenKind::Minus,
                        TokenKind::Ident("b".to_string())]);
        assert_eq!(kinds("a <= b"),
                   vec![TokenKind::Ident("a".to_string()),
                        TokenKind::LessEq,
                        TokenKind::Ident("b".to_string())]);
    }

    #[test]
    fn power_wins_over_multiply() {
        assert_eq!(kinds("2 ** 3"),
                   vec![TokenKind::Int(2), TokenKind::StarStar, TokenKind::Int(3)]);
        assert_eq!(kinds("2 * 3"),
                   vec![TokenKind::Int(2), TokenKind::Star, TokenKind::Int(3)]);
        assert_eq!(kinds("2**3"),
                   vec![TokenKind::Int(2), TokenKind::StarStar, TokenKind::Int(3)]);
    }

    #[test]
    fn arrow_wins_over_minus() {
        assert_eq!(kinds("a -> b"),
                   vec![TokenKind::Ident("a".to_string()),
                        TokenKind::Arrow,
                        TokenKind::Ident("b".to_string())]);
        assert_eq!(kinds("a - > b"),
                   vec![TokenKind::Ident("a".to_string()),
                        TokenKind::Minus,
                        TokenKind::Greater,
                        TokenKind::Ident("b".to_string())]);
    }

    #[test]
    fn symbolic_quantifiers_lex_like_keywords() {
        assert_eq!(kinds("∀ x in [1]: true")[0], TokenKind::Forall);
        assert_eq!(kinds("∃ x in [1]: true")[0], TokenKind::Exists);
    }

    #[test]
    fn string_escapes_are_resolved() {
        assert_eq!(kinds(r#""a\"b""#), vec![TokenKind::Str("a\"b".to_string())]);
        assert_eq!(kinds(r"'it\'s'"), vec![TokenKind::Str("it's".to_string())]);
        assert_eq!(kinds(r#""line\nbreak""#),
                   vec![TokenKind::Str("line\nbreak".to_string())]);
    }

    #[test]
    fn unterminated_string_is_its_own_token() {
        assert_eq!(kinds("\"abc"), vec![TokenKind::UnterminatedStr]);
    }

    #[test]
    fn unknown_characters_are_tokens_not_errors() {
        let tokens = tokenize("1 @ 2");
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].lexeme, "@");
        assert_eq!(tokens[1].column, 3);
    }

    #[test]
    fn comments_are_never_emitted() {
        assert_eq!(kinds("1 # trailing comment"), vec![TokenKind::Int(1)]);
        assert_eq!(kinds("1 /* block */ + 2"),
                   vec![TokenKind::Int(1), TokenKind::Plus, TokenKind::Int(2)]);
    }

    #[test]
    fn numeric_literals_cover_decimals_and_scientific_notation() {
        assert_eq!(kinds("1.5"), vec![TokenKind::Float(1.5)]);
        assert_eq!(kinds("2e3"), vec![TokenKind::Float(2000.0)]);
        assert_eq!(kinds("2.5e-1"), vec![TokenKind::Float(0.25)]);
        assert_eq!(kinds("42"), vec![TokenKind::Int(42)]);
    }

    #[test]
    fn variables_drop_the_sigil() {
        assert_eq!(kinds("$file"), vec![TokenKind::Var("file".to_string())]);
    }

    #[test]
    fn positions_are_line_and_column_accurate() {
        let tokens = tokenize("1 +\n  22");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn relexing_is_restartable_and_identical() {
        let source = "forall f in filesystem.get_files(\"src\"): string.length($f) > 0";
        assert_eq!(tokenize(source), tokenize(source));
    }
}
