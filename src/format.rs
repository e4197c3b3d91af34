//! Rendering of dispatcher outcomes as the final result text.
//!
//! One rule per outcome:
//! - a constant keeps its exact text
//! - a variable-free value prints unrounded (`True`/`False` for equalities)
//! - each solution pair becomes a line `var = value`, the value rounded to the
//!   configured number of decimals; lines are joined with `\n`

use crate::dispatch::{Outcome, Scalar};
use crate::errors::EquationError;
use crate::expr::format_float;
use crate::types::SolutionSet;

/// Renders an outcome.
///
/// # Arguments
/// * `outcome` - What the dispatcher produced
/// * `decimals` - Decimal places for solution values
///
/// # Errors
/// `EquationError::EvaluationError` if a solution value without unknowns has no finite value
///
/// # Example
/// ```
/// use evalexpr_solve::dispatch::{Outcome, Scalar};
/// use evalexpr_solve::format::format_outcome;
///
/// let text = format_outcome(&Outcome::Scalar(Scalar::Truth(true)), 4).unwrap();
/// assert_eq!(text, "True");
/// ```
pub fn format_outcome(outcome: &Outcome, decimals: usize) -> Result<String, EquationError> {
    match outcome {
        Outcome::Constant(text) => Ok(text.clone()),
        Outcome::Scalar(scalar) => Ok(format_scalar(scalar)),
        Outcome::Solutions(solutions) => format_solutions(solutions, decimals),
    }
}

fn format_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Number(value) => format_float(*value),
        Scalar::Truth(true) => "True".to_string(),
        Scalar::Truth(false) => "False".to_string(),
    }
}

fn format_solutions(solutions: &SolutionSet, decimals: usize) -> Result<String, EquationError> {
    let mut lines = Vec::new();
    for solution in solutions {
        for (var, value) in solution {
            // Values in terms of other unknowns have no number to round
            if !value.free_symbols().is_empty() {
                lines.push(format!("{var} = {value}"));
                continue;
            }
            let rounded = round(value.evaluate()?, decimals);
            lines.push(format!("{var} = {rounded}"));
        }
    }
    Ok(lines.join("\n"))
}

/// Formats `value` with exactly `decimals` places, never as negative zero.
pub fn round(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    match text.strip_prefix('-') {
        Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => {
            magnitude.to_string()
        }
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;
    use crate::types::Solution;

    fn mapping(var: &str, value: Expr) -> Solution {
        Solution::from([(var.to_string(), value)])
    }

    #[test]
    fn test_constant_is_verbatim() {
        let outcome = Outcome::Constant("1/3".to_string());
        assert_eq!(format_outcome(&outcome, 4).unwrap(), "1/3");
    }

    #[test]
    fn test_scalar_is_not_rounded() {
        let outcome = Outcome::Scalar(Scalar::Number(0.8414709848078965));
        assert_eq!(format_outcome(&outcome, 4).unwrap(), "0.8414709848078965");
        let outcome = Outcome::Scalar(Scalar::Truth(false));
        assert_eq!(format_outcome(&outcome, 4).unwrap(), "False");
    }

    #[test]
    fn test_solutions_one_line_each() {
        let outcome = Outcome::Solutions(vec![
            mapping("x", Expr::integer(-2)),
            mapping("x", Expr::integer(2)),
        ]);
        assert_eq!(format_outcome(&outcome, 4).unwrap(), "x = -2.0000\nx = 2.0000");
    }

    #[test]
    fn test_exact_values_are_evaluated_then_rounded() {
        let outcome = Outcome::Solutions(vec![mapping("x", Expr::rational(1, 3))]);
        assert_eq!(format_outcome(&outcome, 4).unwrap(), "x = 0.3333");
        assert_eq!(format_outcome(&outcome, 2).unwrap(), "x = 0.33");
    }

    #[test]
    fn test_symbolic_value_is_printed_exactly() {
        let value = Expr::Sub(Box::new(Expr::integer(4)), Box::new(Expr::symbol("y")));
        let outcome = Outcome::Solutions(vec![mapping("x", value)]);
        assert_eq!(format_outcome(&outcome, 4).unwrap(), "x = 4 - y");
    }

    #[test]
    fn test_empty_solutions() {
        assert_eq!(format_outcome(&Outcome::Solutions(Vec::new()), 4).unwrap(), "");
    }

    #[test]
    fn test_round_never_prints_negative_zero() {
        assert_eq!(round(-0.00001, 4), "0.0000");
        assert_eq!(round(-0.0, 4), "0.0000");
        assert_eq!(round(-1.5, 4), "-1.5000");
    }
}
