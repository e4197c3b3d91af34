//! Free-text equations and the end-to-end solving pipeline.
//!
//! This module provides the `Equation` type, which holds an informally written
//! equation together with every intermediate form the pipeline derives from it:
//!
//! raw text → validated → canonical text → built expression → outcome → result text
//!
//! # Example
//!
//! ```
//! use evalexpr_solve::{Equation, SolverConfig};
//!
//! let eq = Equation::new("2x + 1 = 5").unwrap();
//! assert_eq!(eq.canonical().to_string(), "2*x+1 = 5");
//! assert_eq!(eq.result(&SolverConfig::default()).unwrap(), "x = 2.0000");
//! ```
//!
//! For one-off requests `solve_equation` runs the same pipeline in a single call.

use colored::Colorize;
use itertools::Itertools;

use crate::builder::{build_expression, Expression};
use crate::config::SolverConfig;
use crate::dispatch::{classify, dispatch, Branch, Outcome};
use crate::errors::EquationError;
use crate::format::format_outcome;
use crate::normalize::{normalize, CanonicalEquation};
use crate::types::FreeVariableSet;
use crate::validate::validate;

/// A validated, normalised and parsed equation.
///
/// Construction runs the validator, the normaliser and the expression builder, so an
/// `Equation` always holds an expression the dispatcher can work on. Solving is a
/// separate step because it is the only one that can run for long.
#[derive(Clone)]
pub struct Equation {
    raw: String,
    canonical: CanonicalEquation,
    expression: Expression,
}

impl std::fmt::Debug for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{\n")?;
        writeln!(f, "    {}: {}\n", "Equation".cyan(), self.raw)?;
        writeln!(f, "    {}: {}\n", "Canonical".cyan(), self.canonical)?;
        writeln!(f, "    {}: {}\n", "Expression".cyan(), self.expression)?;
        writeln!(
            f,
            "    {}: [{}]\n",
            "Variables".cyan(),
            self.free_variables().iter().join(", ")
        )?;
        writeln!(f, "    {}: {}\n", "Branch".cyan(), self.branch())?;
        writeln!(f, "}}")?;
        Ok(())
    }
}

impl std::fmt::Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical)
    }
}

impl Equation {
    /// Creates a new `Equation` from free text.
    ///
    /// # Arguments
    /// * `raw` - The equation as typed, e.g. `"2x + x^2 = 90"`
    ///
    /// # Returns
    /// * `Result<Self, EquationError>` - The parsed equation or an error
    ///
    /// # Errors
    /// - `EquationError::EmptyEquation` for blank input
    /// - `EquationError::InvalidCharacter` for characters outside the allow-list
    /// - `EquationError::ParseError` if either side fails to parse
    ///
    /// # Example
    /// ```
    /// # use evalexpr_solve::Equation;
    /// let eq = Equation::new("x/2 = 90").unwrap();
    /// assert!(eq.expression().is_equality());
    /// assert!(Equation::new("x; y").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, EquationError> {
        let raw = validate(raw)?;
        let canonical = normalize(raw);
        log::debug!("normalised {raw:?} to {canonical}");
        let expression = build_expression(&canonical)?;
        Ok(Self {
            raw: raw.to_string(),
            canonical,
            expression,
        })
    }

    /// The text the equation was created from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalised text, split at `=`.
    pub fn canonical(&self) -> &CanonicalEquation {
        &self.canonical
    }

    /// The parsed expression.
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The unknowns of the equation, sorted by name.
    pub fn free_variables(&self) -> FreeVariableSet {
        self.expression.free_variables()
    }

    /// The dispatcher branch this equation takes.
    pub fn branch(&self) -> Branch {
        classify(&self.expression)
    }

    /// Runs the dispatcher and returns the unformatted outcome.
    ///
    /// # Errors
    /// `EquationError::EvaluationError`, `EquationError::SolveError` or `EquationError::Timeout`
    pub fn solve(&self, config: &SolverConfig) -> Result<Outcome, EquationError> {
        dispatch(&self.expression, config)
    }

    /// Solves the equation and renders the result text.
    ///
    /// # Example
    /// ```
    /// # use evalexpr_solve::{Equation, SolverConfig};
    /// let eq = Equation::new("x**2 - 4").unwrap();
    /// assert_eq!(eq.result(&SolverConfig::default()).unwrap(), "x = -2.0000\nx = 2.0000");
    /// ```
    pub fn result(&self, config: &SolverConfig) -> Result<String, EquationError> {
        let outcome = self.solve(config)?;
        format_outcome(&outcome, config.decimals)
    }
}

/// Runs the whole pipeline on free text and returns the result text.
///
/// # Arguments
/// * `raw` - The equation as typed
/// * `config` - Solver settings
///
/// # Returns
/// * `Result<String, EquationError>` - The result text or the first error met
///
/// # Example
/// ```
/// use evalexpr_solve::{solve_equation, SolverConfig};
///
/// let config = SolverConfig::default();
/// assert_eq!(solve_equation("1+1", &config).unwrap(), "2");
/// assert_eq!(solve_equation("x + 1 = 5", &config).unwrap(), "x = 4.0000");
/// ```
pub fn solve_equation(raw: &str, config: &SolverConfig) -> Result<String, EquationError> {
    Equation::new(raw)?.result(config)
}
