use crate::ast::Pos;

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// The lexer produced an `Unknown` token for an unrecognized character.
    UnknownCharacter {
        /// The offending text, exactly as it appeared in the source.
        lexeme: String,
        /// The source position where the character occurred.
        pos:    Pos,
    },
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The token encountered.
        found:    String,
        /// What the parser was prepared to accept instead.
        expected: String,
        /// The source position of the token.
        pos:      Pos,
    },
    /// Reached the end of input while more tokens were required.
    UnexpectedEndOfInput {
        /// What the parser was prepared to accept.
        expected: String,
        /// The position of the last consumed token.
        pos:      Pos,
    },
    /// A string literal was opened but never closed.
    UnterminatedString {
        /// The source position of the opening quote.
        pos: Pos,
    },
    /// A numeric literal could not be represented in 64 bits.
    LiteralTooLarge {
        /// The literal text.
        lexeme: String,
        /// The source position of the literal.
        pos:    Pos,
    },
    /// Expressions were nested more deeply than the parser allows.
    NestingTooDeep {
        /// The source position where the limit was exceeded.
        pos: Pos,
    },
    /// Found extra tokens after a complete expression.
    UnexpectedTrailingTokens {
        /// The first extra token.
        found: String,
        /// The source position of the extra token.
        pos:   Pos,
    },
}

impl ParseError {
    /// Gets the source position carried by this error.
    #[must_use]
    pub const fn position(&self) -> Pos {
        match self {
            Self::UnknownCharacter { pos, .. }
            | Self::UnexpectedToken { pos, .. }
            | Self::UnexpectedEndOfInput { pos, .. }
            | Self::UnterminatedString { pos }
            | Self::LiteralTooLarge { pos, .. }
            | Self::NestingTooDeep { pos }
            | Self::UnexpectedTrailingTokens { pos, .. } => *pos,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCharacter { lexeme, pos } => {
                write!(f, "Parse error at {pos}: unrecognized character '{lexeme}'.")
            },

            Self::UnexpectedToken { found, expected, pos } => write!(f,
                "Parse error at {pos}: unexpected token '{found}', expected {expected}."),

            Self::UnexpectedEndOfInput { expected, pos } => write!(f,
                "Parse error at {pos}: unexpected end of input, expected {expected}."),

            Self::UnterminatedString { pos } => {
                write!(f, "Parse error at {pos}: unterminated string literal.")
            },

            Self::LiteralTooLarge { lexeme, pos } => write!(f,
                "Parse error at {pos}: numeric literal '{lexeme}' is too large."),

            Self::NestingTooDeep { pos } => {
                write!(f, "Parse error at {pos}: expression is nested too deeply.")
            },

            Self::UnexpectedTrailingTokens { found, pos } => write!(f,
                "Parse error at {pos}: extra tokens after expression, starting with '{found}'."),
        }
    }
}

impl std::error::Error for ParseError {}
