/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of rule
/// expressions, with positions attached for diagnostics.
pub mod parse_error;
/// Evaluation errors.
///
/// Defines all error types that can occur while an expression is evaluated
/// against a context: name resolution, type, arithmetic and arity failures.
pub mod eval_error;

pub use eval_error::EvalError;
pub use parse_error::ParseError;

/// Either of the two failure modes of a full parse-and-evaluate run.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The expression could not be lexed or parsed.
    Parse(ParseError),
    /// The expression parsed but failed during evaluation.
    Eval(EvalError),
}

impl From<ParseError> for EngineError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<EvalError> for EngineError {
    fn from(e: EvalError) -> Self {
        Self::Eval(e)
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Eval(e) => Some(e),
        }
    }
}
