use std::collections::{BTreeMap, BTreeSet};

use crate::expr::Expr;

/// Type alias for the set of distinct unknowns occurring in an expression.
///
/// Ordered so that iteration, logging and the unknown picked for linear
/// isolation are deterministic. Empty for variable-free expressions.
pub type FreeVariableSet = BTreeSet<String>;

/// Type alias for a single solution mapping.
///
/// This represents one assignment of values to unknowns that satisfies an equation:
/// - Keys are unknown names
/// - Values are exact, numeric or (with several unknowns) symbolic expressions
pub type Solution = BTreeMap<String, Expr>;

/// Type alias for the ordered sequence of mappings returned by the solver.
///
/// An empty set means the equation has no (real) solution, which is not an error.
pub type SolutionSet = Vec<Solution>;
