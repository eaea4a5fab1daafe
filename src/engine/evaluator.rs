/// Dispatch over expression forms plus the simple node evaluations.
pub mod core;
/// Binary operator semantics: logic, comparison and arithmetic.
pub mod binary;
/// Unary operator semantics.
pub mod unary;
/// `forall`/`exists` evaluation over collection domains.
pub mod quantifier;
/// Function-call resolution and dispatch through the registry.
pub mod function;

pub use self::core::EvalResult;
