//! Error types for the evalexpr-solve crate.
//!
//! This module defines the various error types that can occur while turning a free-text
//! equation into a result. The main error types are:
//!
//! - `ConvertError`: Errors during parsing and conversion of canonical text into an `Expr`
//! - `EvalError`: Errors during numeric evaluation of an expression
//! - `SolveError`: Errors raised by the solver while searching for roots
//! - `EquationError`: The request-level taxonomy surfaced to callers
//!
//! Each error type implements the standard Error trait and provides detailed error messages.

use std::time::Duration;

use evalexpr::{DefaultNumericTypes, EvalexprError};
use thiserror::Error;

/// Errors that can occur during conversion from canonical text to our internal AST representation.
///
/// This enum represents the failure modes of the engine's parser: evalexpr rejecting the
/// text outright, or evalexpr accepting a construct that has no meaning in an equation.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Error when evalexpr cannot build an operator tree from the text
    #[error("invalid syntax: {0}")]
    Syntax(#[from] EvalexprError<DefaultNumericTypes>),
    /// Error when encountering an operator that is not supported by our implementation
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),
    /// Error when encountering a function that is not supported by our implementation
    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),
    /// Error when an identifier does not start with a letter, e.g. `2x`
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// Error when a constant is not numeric (booleans, strings, tuples)
    #[error("expected numeric constant: {0}")]
    ConstOperator(String),
    /// Error when a node has an unexpected number of children, e.g. an empty side of an equation
    #[error("malformed expression: {0}")]
    RootNode(String),
}

/// Errors that can occur when evaluating an expression to a floating point number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A symbol without a value was encountered
    #[error("cannot evaluate '{0}' numerically: it has no value")]
    UnboundSymbol(String),
    /// The evaluation produced NaN or an infinity
    #[error("{0} does not evaluate to a finite number")]
    NonFinite(String),
}

/// Errors that can occur while solving for the unknowns of an expression.
#[derive(Error, Debug)]
pub enum SolveError {
    /// Solve was called without any unknowns
    #[error("nothing to solve for: the expression has no unknowns")]
    NoUnknowns,
    /// The expression has a shape the solver has no method for
    #[error("no method to solve {0}")]
    Unsupported(String),
    /// The configured deadline passed before the search finished
    #[error("solving did not finish within {0:?}")]
    Timeout(Duration),
    /// Evaluating a candidate solution failed
    #[error("could not evaluate solution: {0}")]
    Evaluation(#[from] EvalError),
}

/// High-level errors that can occur when solving a free-text equation.
///
/// This enum is the taxonomy a caller sees. It wraps lower-level errors from the
/// engine by message, so every variant can be shown to a user as-is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EquationError {
    /// Error when the input is empty or consists only of whitespace
    #[error("Missing 'equation' query parameter")]
    EmptyEquation,
    /// Error when the input contains a character outside the allow-list
    #[error("Invalid character in equation: only letters, digits, whitespace and + - * / ^ ( ) = . are allowed")]
    InvalidCharacter,
    /// Error when either side of the canonical equation fails to parse
    #[error("{0}")]
    ParseError(String),
    /// Error when the engine fails to solve for the free variables
    #[error("{0}")]
    SolveError(String),
    /// Error when a variable-free expression or a solution fails to evaluate numerically
    #[error("{0}")]
    EvaluationError(String),
    /// Error when solving exceeds the configured deadline
    #[error("Timed out after {0:?} while solving")]
    Timeout(Duration),
}

impl From<ConvertError> for EquationError {
    fn from(err: ConvertError) -> Self {
        EquationError::ParseError(err.to_string())
    }
}

impl From<EvalError> for EquationError {
    fn from(err: EvalError) -> Self {
        EquationError::EvaluationError(err.to_string())
    }
}

impl From<SolveError> for EquationError {
    fn from(err: SolveError) -> Self {
        match err {
            SolveError::Timeout(limit) => EquationError::Timeout(limit),
            other => EquationError::SolveError(other.to_string()),
        }
    }
}

/// Errors raised when a `SolverConfig` is inconsistent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("search window is empty: min {min} must be below max {max}")]
    EmptyWindow { min: f64, max: f64 },
    #[error("sample count must be at least 2, got {0}")]
    TooFewSamples(usize),
    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_keeps_its_variant() {
        let err: EquationError = SolveError::Timeout(Duration::from_millis(20)).into();
        assert_eq!(err, EquationError::Timeout(Duration::from_millis(20)));
    }

    #[test]
    fn test_solve_error_wraps_message() {
        let err: EquationError = SolveError::Unsupported("sin(x*y)".to_string()).into();
        assert_eq!(err.to_string(), "no method to solve sin(x*y)");
    }

    #[test]
    fn test_eval_error_becomes_evaluation_error() {
        let err: EquationError = EvalError::NonFinite("1/0".to_string()).into();
        assert!(matches!(err, EquationError::EvaluationError(_)));
        assert!(err.to_string().contains("finite"));
    }
}
