//! Solver for informally written equations.
//!
//! This crate takes equations the way people type them (`2x + x^2 = 90`, `x/2 = 90`,
//! `sqrt(2)`) and answers with a single value or a list of variable assignments. It
//! builds on top of the [evalexpr](https://github.com/ISibboI/evalexpr) crate for
//! parsing and carries its own exact algebra engine for simplification and solving.
//!
//! # Pipeline
//!
//! - [`validate`]: rejects characters outside a small allow-list
//! - [`normalize`]: inserts implicit multiplication, rewrites `^` as `**`, splits at `=`
//! - [`builder`]: parses each side into an [`Expr`]
//! - [`dispatch`]: picks one of three branches (literal constant, variable-free, free variables)
//! - [`format`]: renders the outcome, rounding solution values to four decimals
//!
//! [`api`] wraps the pipeline in the JSON contract of the HTTP service.
//!
//! # Example
//!
//! ```rust
//! use evalexpr_solve::{solve_equation, SolverConfig};
//!
//! let config = SolverConfig::default();
//!
//! // Literal constants keep their exact form
//! assert_eq!(solve_equation("1/3 + 1/6", &config).unwrap(), "1/2");
//!
//! // Equations are solved for their unknowns, one line per solution
//! assert_eq!(solve_equation("x^2 = 9", &config).unwrap(), "x = -3.0000\nx = 3.0000");
//! ```

pub use config::SolverConfig;
pub use equation::{solve_equation, Equation};
pub use errors::EquationError;

pub mod prelude {
    pub use crate::builder::{build_expression, Expression};
    pub use crate::config::SolverConfig;
    pub use crate::convert::parse;
    pub use crate::dispatch::{dispatch, Outcome, Scalar};
    pub use crate::equation::{solve_equation, Equation};
    pub use crate::expr::Expr;
    pub use crate::normalize::normalize;
}

/// JSON request handling for the HTTP service
pub mod api;
/// Canonical equation to structured expression
pub mod builder;
/// Solver and formatter settings
pub mod config;
/// Conversion from parsed expressions to internal AST
pub mod convert;
/// Three-way classification and engine calls
pub mod dispatch;
/// High-level equation handling
pub mod equation;
/// Error types for the various failure modes
pub mod errors;
/// Expression tree representation, simplification and symbolic differentiation
pub mod expr;
/// Rendering of results
pub mod format;
/// Informal notation to canonical text
pub mod normalize;
/// Univariate polynomials with rational coefficients
pub mod poly;
/// Numeric real-root search
pub mod roots;
/// Solving for unknowns
pub mod solve;
/// Type aliases shared across modules
pub mod types;
/// Input allow-list
pub mod validate;
