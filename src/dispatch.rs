//! Classification of a built expression and routing to the matching engine call.
//!
//! There are exactly three routes, checked in this order:
//!
//! 1. `Branch::Constant`: a plain expression that simplified to a literal number.
//!    Its exact text is the answer (`1/3`, not `0.3333`).
//! 2. `Branch::VariableFree`: no unknowns, but not a literal (`sin(1)`, `sqrt(2)`, `2 = 2`).
//!    It is evaluated numerically.
//! 3. `Branch::FreeVariables`: at least one unknown. The expression is solved for all of them.

use std::fmt;

use crate::builder::Expression;
use crate::config::SolverConfig;
use crate::errors::EquationError;
use crate::solve::solve;
use crate::types::SolutionSet;

/// Relative tolerance used to decide equalities that only have numeric values.
const TRUTH_TOLERANCE: f64 = 1e-12;

/// The route an expression takes through the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Constant,
    VariableFree,
    FreeVariables,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Constant => write!(f, "constant"),
            Branch::VariableFree => write!(f, "variable-free"),
            Branch::FreeVariables => write!(f, "free-variable"),
        }
    }
}

/// The numeric value of a variable-free expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Number(f64),
    /// The truth value of a variable-free equality
    Truth(bool),
}

/// What the dispatcher produced, one variant per branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Exact text of a literal number
    Constant(String),
    /// Numeric value of a variable-free expression
    Scalar(Scalar),
    /// Solution mappings, possibly empty
    Solutions(SolutionSet),
}

/// Picks the branch for an expression.
pub fn classify(expression: &Expression) -> Branch {
    if expression.is_number_literal() {
        Branch::Constant
    } else if expression.free_variables().is_empty() {
        Branch::VariableFree
    } else {
        Branch::FreeVariables
    }
}

/// Classifies `expression` and runs the engine call of its branch.
///
/// # Arguments
/// * `expression` - The built expression
/// * `config` - Solver settings, used by the free-variable branch only
///
/// # Errors
/// - `EquationError::EvaluationError` if a variable-free expression has no finite value
/// - `EquationError::SolveError` or `EquationError::Timeout` from the solver
///
/// # Example
/// ```
/// use evalexpr_solve::builder::build_expression;
/// use evalexpr_solve::dispatch::{dispatch, Outcome};
/// use evalexpr_solve::normalize::normalize;
/// use evalexpr_solve::SolverConfig;
///
/// let expression = build_expression(&normalize("1/3 + 1/6")).unwrap();
/// let outcome = dispatch(&expression, &SolverConfig::default()).unwrap();
/// assert_eq!(outcome, Outcome::Constant("1/2".to_string()));
/// ```
pub fn dispatch(expression: &Expression, config: &SolverConfig) -> Result<Outcome, EquationError> {
    let branch = classify(expression);
    log::debug!("{expression} takes the {branch} branch");

    match (branch, expression) {
        (Branch::Constant, Expression::Plain(expr)) => Ok(Outcome::Constant(expr.to_string())),
        (Branch::VariableFree, Expression::Plain(expr)) => {
            Ok(Outcome::Scalar(Scalar::Number(expr.evaluate()?)))
        }
        (Branch::VariableFree, Expression::Equality(..)) => {
            Ok(Outcome::Scalar(Scalar::Truth(decide_equality(expression)?)))
        }
        _ => {
            let unknowns = expression.free_variables();
            let solutions = solve(expression, &unknowns, config)?;
            Ok(Outcome::Solutions(solutions))
        }
    }
}

/// Decides a variable-free equality, exactly when both sides fold to rationals.
fn decide_equality(expression: &Expression) -> Result<bool, EquationError> {
    let residual = expression.residual();
    if let Some(difference) = residual.as_rational() {
        return Ok(num_traits::Zero::is_zero(difference));
    }
    let Expression::Equality(lhs, rhs) = expression else {
        return Ok(residual.is_zero());
    };
    let (lhs, rhs) = (lhs.evaluate()?, rhs.evaluate()?);
    let scale = lhs.abs().max(rhs.abs()).max(1.0);
    Ok((lhs - rhs).abs() <= TRUTH_TOLERANCE * scale)
}
