//! Expression builder: turns a canonical equation into a structured `Expression`.
//!
//! Each side of the canonical equation is parsed on its own, so a parse failure
//! on either side is reported with the message of that side only.

use std::fmt;

use crate::convert::parse;
use crate::errors::EquationError;
use crate::expr::{self, Expr};
use crate::normalize::CanonicalEquation;
use crate::types::FreeVariableSet;

/// A parsed equation: a plain expression, or an equality of two expressions.
///
/// A plain expression `f` is read as the equation `f = 0` when solved.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Plain(Expr),
    Equality(Expr, Expr),
}

impl Expression {
    /// Returns the unknowns occurring on either side.
    pub fn free_variables(&self) -> FreeVariableSet {
        match self {
            Expression::Plain(expr) => expr.free_symbols(),
            Expression::Equality(lhs, rhs) => {
                let mut symbols = lhs.free_symbols();
                symbols.extend(rhs.free_symbols());
                symbols
            }
        }
    }

    /// Returns true for a plain expression that simplified to a literal number.
    ///
    /// An equality is never a number, even when both sides are.
    pub fn is_number_literal(&self) -> bool {
        match self {
            Expression::Plain(expr) => expr.is_number_literal(),
            Expression::Equality(..) => false,
        }
    }

    /// Returns true if the expression is an equality.
    pub fn is_equality(&self) -> bool {
        matches!(self, Expression::Equality(..))
    }

    /// The expression whose zeros are the solutions: `lhs - rhs` for an equality.
    pub fn residual(&self) -> Expr {
        match self {
            Expression::Plain(expr) => expr.clone(),
            Expression::Equality(lhs, rhs) => {
                *expr::sub(Box::new(lhs.clone()), Box::new(rhs.clone()))
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Plain(expr) => write!(f, "{expr}"),
            Expression::Equality(lhs, rhs) => write!(f, "Eq({lhs}, {rhs})"),
        }
    }
}

/// Builds an `Expression` from a canonical equation.
///
/// # Arguments
/// * `canonical` - The output of the normaliser
///
/// # Returns
/// The plain expression, or the equality of both sides if the input contained `=`
///
/// # Errors
/// `EquationError::ParseError` with the parser's message if either side fails to parse
///
/// # Example
/// ```
/// use evalexpr_solve::builder::{build_expression, Expression};
/// use evalexpr_solve::normalize::normalize;
///
/// let expression = build_expression(&normalize("x/2 = 90")).unwrap();
/// assert!(expression.is_equality());
/// assert_eq!(expression.to_string(), "Eq(x/2, 90)");
/// ```
pub fn build_expression(canonical: &CanonicalEquation) -> Result<Expression, EquationError> {
    let left = parse(&canonical.left)?;
    let expression = match &canonical.right {
        Some(right) => Expression::Equality(left, parse(right)?),
        None => Expression::Plain(left),
    };
    log::debug!("built expression {expression}");
    Ok(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn test_plain_expression() {
        let expression = build_expression(&normalize("1+1")).unwrap();
        assert_eq!(expression, Expression::Plain(Expr::integer(2)));
        assert!(expression.is_number_literal());
        assert!(expression.free_variables().is_empty());
    }

    #[test]
    fn test_equality_is_never_a_number() {
        let expression = build_expression(&normalize("2 = 2")).unwrap();
        assert!(expression.is_equality());
        assert!(!expression.is_number_literal());
    }

    #[test]
    fn test_free_variables_cover_both_sides() {
        let expression = build_expression(&normalize("x + 1 = y")).unwrap();
        let variables: Vec<_> = expression.free_variables().into_iter().collect();
        assert_eq!(variables, vec!["x", "y"]);
    }

    #[test]
    fn test_residual() {
        let expression = build_expression(&normalize("x + 1 = 5")).unwrap();
        assert_eq!(expression.residual().to_string(), "x - 4");
    }

    #[test]
    fn test_parse_error_on_either_side() {
        assert!(matches!(
            build_expression(&normalize("x + = 5")),
            Err(EquationError::ParseError(_))
        ));
        assert!(matches!(
            build_expression(&normalize("x = foo(1)")),
            Err(EquationError::ParseError(_))
        ));
        // The double-equals quirk leaves an empty left side
        assert!(matches!(
            build_expression(&normalize("x/2 == 90")),
            Err(EquationError::ParseError(_))
        ));
    }
}
