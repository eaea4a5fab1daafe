/// Entry points and statement/quantifier/conditional parsing.
pub mod core;
/// The binary-operator precedence cascade.
pub mod binary;
/// Unary operators and primary (atomic) expressions.
pub mod primary;

pub use self::core::{parse, parse_expression, ParseResult};
