use crate::{ast::Pos, engine::value::ValueKind};

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur while evaluating an expression.
///
/// Every variant is a recoverable, typed result: a failing rule surfaces one
/// of these to the caller and never unwinds the host process. Errors created
/// inside native function bodies carry `Pos::NONE`; the evaluator stamps the
/// call-site position onto them before returning.
pub enum EvalError {
    /// A variable name could not be resolved in any enclosing scope.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source position of the reference.
        pos:  Pos,
    },
    /// A function name is not present in the function registry.
    UndefinedFunction {
        /// The fully-qualified name of the function.
        name: String,
        /// The source position of the call.
        pos:  Pos,
    },
    /// A binary operator was applied to operands of incompatible kinds.
    TypeMismatch {
        /// The operator or function that failed.
        operation: String,
        /// Kind of the left operand.
        left:      ValueKind,
        /// Kind of the right operand.
        right:     ValueKind,
        /// The source position of the operation.
        pos:       Pos,
    },
    /// An operation received a value of a kind it cannot accept.
    ExpectedType {
        /// The operator or function that failed.
        operation: String,
        /// Description of the accepted kind(s), e.g. "Boolean".
        expected:  String,
        /// Kind of the value actually supplied.
        found:     ValueKind,
        /// The source position of the operation.
        pos:       Pos,
    },
    /// Division or modulo by zero, or an overflowing numeric operation.
    ArithmeticError {
        /// The operator or function that failed.
        operation: String,
        /// What went wrong, e.g. "division by zero".
        detail:    String,
        /// The source position of the operation.
        pos:       Pos,
    },
    /// The wrong number of arguments was supplied to a function call.
    ArityError {
        /// The fully-qualified name of the function.
        function: String,
        /// Number of parameters the function declares.
        expected: usize,
        /// Number of arguments actually supplied.
        found:    usize,
        /// The source position of the call.
        pos:      Pos,
    },
    /// An argument had the right kind but an unusable value.
    InvalidArgument {
        /// The fully-qualified name of the function.
        function: String,
        /// Why the argument was rejected.
        detail:   String,
        /// The source position of the call.
        pos:      Pos,
    },
    /// Quantifier scopes were nested more deeply than the evaluator allows.
    RecursionLimit {
        /// The depth that was reached.
        depth: usize,
        /// The source position where the limit was exceeded.
        pos:   Pos,
    },
}

impl EvalError {
    /// Stamps `pos` onto this error if it does not already carry a position.
    ///
    /// Native function bodies have no access to source positions; the
    /// evaluator calls this at the call site so diagnostics stay actionable.
    #[must_use]
    pub fn with_pos(mut self, at: Pos) -> Self {
        let pos = match &mut self {
            Self::UndefinedVariable { pos, .. }
            | Self::UndefinedFunction { pos, .. }
            | Self::TypeMismatch { pos, .. }
            | Self::ExpectedType { pos, .. }
            | Self::ArithmeticError { pos, .. }
            | Self::ArityError { pos, .. }
            | Self::InvalidArgument { pos, .. }
            | Self::RecursionLimit { pos, .. } => pos,
        };
        if pos.is_none() {
            *pos = at;
        }
        self
    }

    /// Gets the source position carried by this error.
    #[must_use]
    pub const fn position(&self) -> Pos {
        match self {
            Self::UndefinedVariable { pos, .. }
            | Self::UndefinedFunction { pos, .. }
            | Self::TypeMismatch { pos, .. }
            | Self::ExpectedType { pos, .. }
            | Self::ArithmeticError { pos, .. }
            | Self::ArityError { pos, .. }
            | Self::InvalidArgument { pos, .. }
            | Self::RecursionLimit { pos, .. } => *pos,
        }
    }
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { name, pos } => {
                write!(f, "Evaluation error at {pos}: undefined variable '{name}'.")
            },

            Self::UndefinedFunction { name, pos } => {
                write!(f, "Evaluation error at {pos}: undefined function '{name}'.")
            },

            Self::TypeMismatch { operation,
                                 left,
                                 right,
                                 pos, } => write!(f,
                "Evaluation error at {pos}: cannot apply '{operation}' to {left} and {right}."),

            Self::ExpectedType { operation,
                                 expected,
                                 found,
                                 pos, } => write!(f,
                "Evaluation error at {pos}: '{operation}' expects {expected}, found {found}."),

            Self::ArithmeticError { operation, detail, pos } => {
                write!(f, "Evaluation error at {pos}: '{operation}' failed: {detail}.")
            },

            Self::ArityError { function,
                               expected,
                               found,
                               pos, } => write!(f,
                "Evaluation error at {pos}: '{function}' expects {expected} argument(s), found {found}."),

            Self::InvalidArgument { function, detail, pos } => write!(f,
                "Evaluation error at {pos}: invalid argument to '{function}': {detail}."),

            Self::RecursionLimit { depth, pos } => write!(f,
                "Evaluation error at {pos}: quantifier nesting exceeded the limit of {depth} scopes."),
        }
    }
}

impl std::error::Error for EvalError {}
