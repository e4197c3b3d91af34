//! Expression module for representing mathematical expressions.
//!
//! This module defines the expression tree the solver works on. Integer and
//! fractional literals are kept as exact big rationals, decimal literals as
//! `f64`, so `1/3 + 1/6` stays `1/2` while `0.5 + 1` becomes `1.5`.
//!
//! The expression tree is built recursively using `Box<Expr>` for nested expressions and can be:
//! - Simplified using exact algebraic rules
//! - Symbolically differentiated
//! - Evaluated numerically, with or without a value for one unknown
//! - Modified by inserting replacement expressions
//! - Printed back in the canonical grammar the parser accepts
//!
//! # Expression Tree Structure
//! The expression tree is built recursively with each node being one of:
//! - Leaf nodes: exact constants, float constants, `pi`, `E` and symbols
//! - Unary operations: Neg, Abs, Exp, Ln, Sqrt, Sin, Cos, Tan
//! - Binary operations: Add, Sub, Mul, Div, Pow
//!
//! # Expression Simplification
//! The simplify method performs algebraic simplifications including:
//! - Exact constant folding (e.g. 1/3 + 1/6 → 1/2, 2**-1 → 1/2, sqrt(9/4) → 3/2)
//! - Identity rules (e.g. x + 0 → x, x * 1 → x, x**0 → 1)
//! - Combining like terms (e.g. 2*x + 3*x → 5*x, x*x → x**2)
//! - Exact special values (e.g. sin(0) → 0, ln(1) → 0)
//!
//! Transcendental functions of exact constants are deliberately left unevaluated
//! (`sin(1)` stays `sin(1)`), so a caller can tell an exact number from one that
//! only has a numeric value.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::errors::EvalError;
use crate::types::FreeVariableSet;

/// Largest integer exponent folded exactly.
const MAX_EXACT_EXPONENT: i64 = 1024;

/// Largest root index tried when folding rational exponents.
const MAX_EXACT_ROOT: u32 = 64;

/// Largest size, in bits of numerator or denominator, of an exactly folded power.
const MAX_FOLD_BITS: u64 = 65_536;

/// An expression tree node representing mathematical operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An exact rational constant
    Const(BigRational),
    /// An inexact constant from a decimal literal
    Float(f64),
    /// The circle constant
    Pi,
    /// Euler's number
    E,
    /// An unknown
    Symbol(String),
    /// Addition of two expressions
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction of two expressions
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication of two expressions
    Mul(Box<Expr>, Box<Expr>),
    /// Division of two expressions
    Div(Box<Expr>, Box<Expr>),
    /// Exponentiation of an expression by another expression
    Pow(Box<Expr>, Box<Expr>),
    /// Negation of an expression
    Neg(Box<Expr>),
    /// Absolute value of an expression
    Abs(Box<Expr>),
    /// Exponential function of an expression
    Exp(Box<Expr>),
    /// Natural logarithm of an expression
    Ln(Box<Expr>),
    /// Square root of an expression
    Sqrt(Box<Expr>),
    /// Sine of an expression (argument in radians)
    Sin(Box<Expr>),
    /// Cosine of an expression (argument in radians)
    Cos(Box<Expr>),
    /// Tangent of an expression (argument in radians)
    Tan(Box<Expr>),
}

impl Expr {
    /// Creates an exact integer constant.
    pub fn integer(value: i64) -> Expr {
        Expr::Const(BigRational::from_integer(BigInt::from(value)))
    }

    /// Creates an exact rational constant `numer / denom`.
    ///
    /// # Panics
    /// Panics if `denom` is zero.
    pub fn rational(numer: i64, denom: i64) -> Expr {
        Expr::Const(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    /// Creates a symbol.
    pub fn symbol(name: impl Into<String>) -> Expr {
        Expr::Symbol(name.into())
    }

    /// Returns true if this is the exact or float constant zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Const(c) => c.is_zero(),
            Expr::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    /// Returns true if this is the exact or float constant one.
    pub fn is_one(&self) -> bool {
        match self {
            Expr::Const(c) => c.is_one(),
            Expr::Float(f) => *f == 1.0,
            _ => false,
        }
    }

    /// Returns true if this node is a literal number, exact or float.
    ///
    /// Only meaningful on simplified expressions: `1 + 1` is a literal once folded.
    pub fn is_number_literal(&self) -> bool {
        matches!(self, Expr::Const(_) | Expr::Float(_))
    }

    /// Returns the exact value of a rational constant.
    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Expr::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the distinct unknowns occurring in the expression.
    ///
    /// `pi` and `E` are constants and never reported.
    pub fn free_symbols(&self) -> FreeVariableSet {
        let mut symbols = FreeVariableSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut FreeVariableSet) {
        match self {
            Expr::Symbol(name) => {
                symbols.insert(name.clone());
            }
            Expr::Const(_) | Expr::Float(_) | Expr::Pi | Expr::E => {}
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => {
                left.collect_symbols(symbols);
                right.collect_symbols(symbols);
            }
            Expr::Neg(expr)
            | Expr::Abs(expr)
            | Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::Sqrt(expr)
            | Expr::Sin(expr)
            | Expr::Cos(expr)
            | Expr::Tan(expr) => expr.collect_symbols(symbols),
        }
    }

    /// Returns true if the unknown `name` occurs anywhere in the expression.
    pub fn contains_symbol(&self, name: &str) -> bool {
        match self {
            Expr::Symbol(s) => s == name,
            Expr::Const(_) | Expr::Float(_) | Expr::Pi | Expr::E => false,
            Expr::Add(left, right)
            | Expr::Sub(left, right)
            | Expr::Mul(left, right)
            | Expr::Div(left, right)
            | Expr::Pow(left, right) => left.contains_symbol(name) || right.contains_symbol(name),
            Expr::Neg(expr)
            | Expr::Abs(expr)
            | Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::Sqrt(expr)
            | Expr::Sin(expr)
            | Expr::Cos(expr)
            | Expr::Tan(expr) => expr.contains_symbol(name),
        }
    }

    /// Evaluates a variable-free expression to a finite `f64`.
    ///
    /// # Errors
    /// - `EvalError::UnboundSymbol` if the expression contains an unknown
    /// - `EvalError::NonFinite` if the result is NaN or infinite, e.g. `1/0` or `ln(-1)`
    pub fn evaluate(&self) -> Result<f64, EvalError> {
        let value = self.eval_with(&|_: &str| None)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite(self.to_string()))
        }
    }

    /// Returns false if a variable-free expression has no real value, as `sqrt(-4)`
    /// or `ln(-1)`. An overflow to infinity still counts as real.
    pub fn is_real(&self) -> bool {
        self.eval_with(&|_: &str| None).is_ok_and(|value| !value.is_nan())
    }

    /// Evaluates the expression with `name` bound to `x`.
    ///
    /// Domain errors are not reported: they show up as NaN or an infinity, which the
    /// root search treats as "no root here". Any other unknown also yields NaN.
    pub fn eval_at(&self, name: &str, x: f64) -> f64 {
        self.eval_with(&|symbol: &str| (symbol == name).then_some(x))
            .unwrap_or(f64::NAN)
    }

    fn eval_with<F>(&self, lookup: &F) -> Result<f64, EvalError>
    where
        F: Fn(&str) -> Option<f64>,
    {
        Ok(match self {
            Expr::Const(c) => ratio_to_f64(c),
            Expr::Float(f) => *f,
            Expr::Pi => std::f64::consts::PI,
            Expr::E => std::f64::consts::E,
            Expr::Symbol(name) => {
                lookup(name).ok_or_else(|| EvalError::UnboundSymbol(name.clone()))?
            }
            Expr::Add(left, right) => left.eval_with(lookup)? + right.eval_with(lookup)?,
            Expr::Sub(left, right) => left.eval_with(lookup)? - right.eval_with(lookup)?,
            Expr::Mul(left, right) => left.eval_with(lookup)? * right.eval_with(lookup)?,
            Expr::Div(left, right) => left.eval_with(lookup)? / right.eval_with(lookup)?,
            Expr::Pow(base, exponent) => {
                let base = base.eval_with(lookup)?;
                match &**exponent {
                    // Odd roots of negative numbers, e.g. (-8)**(1/3) = -2
                    Expr::Const(q) if base < 0.0 && !q.is_integer() && is_odd(q.denom()) => {
                        let magnitude = (-base).powf(ratio_to_f64(q));
                        if is_odd(q.numer()) {
                            -magnitude
                        } else {
                            magnitude
                        }
                    }
                    exponent => base.powf(exponent.eval_with(lookup)?),
                }
            }
            Expr::Neg(expr) => -expr.eval_with(lookup)?,
            Expr::Abs(expr) => expr.eval_with(lookup)?.abs(),
            Expr::Exp(expr) => expr.eval_with(lookup)?.exp(),
            Expr::Ln(expr) => expr.eval_with(lookup)?.ln(),
            Expr::Sqrt(expr) => expr.eval_with(lookup)?.sqrt(),
            Expr::Sin(expr) => expr.eval_with(lookup)?.sin(),
            Expr::Cos(expr) => expr.eval_with(lookup)?.cos(),
            Expr::Tan(expr) => expr.eval_with(lookup)?.tan(),
        })
    }

    /// Computes the symbolic derivative of this expression with respect to a variable.
    ///
    /// Recursively applies the rules of differentiation to build a new expression tree
    /// representing the derivative. The rules implemented are:
    /// - d/dx(c) = 0 for constants
    /// - d/dx(x) = 1 for the variable we're differentiating with respect to
    /// - d/dx(y) = 0 for other variables
    /// - Sum rule: d/dx(f + g) = df/dx + dg/dx
    /// - Product rule: d/dx(f * g) = f * dg/dx + g * df/dx
    /// - Quotient rule: d/dx(f/g) = (g * df/dx - f * dg/dx) / g^2
    /// - Power rule: d/dx(f^n) = n * f^(n-1) * df/dx when n does not depend on x
    /// - General power rule: d/dx(f^g) = f^g * (g' * ln(f) + g * f'/f)
    /// - Chain rule for abs, exp, ln, sqrt, sin, cos and tan
    ///
    /// The result is not simplified.
    ///
    /// # Arguments
    /// * `with_respect_to` - The name of the variable to differentiate with respect to
    pub fn derivative(&self, with_respect_to: &str) -> Box<Expr> {
        match self {
            Expr::Const(_) | Expr::Float(_) | Expr::Pi | Expr::E => Box::new(Expr::integer(0)),

            Expr::Symbol(name) => {
                if name == with_respect_to {
                    Box::new(Expr::integer(1))
                } else {
                    Box::new(Expr::integer(0))
                }
            }

            Expr::Add(left, right) => Box::new(Expr::Add(
                left.derivative(with_respect_to),
                right.derivative(with_respect_to),
            )),

            Expr::Sub(left, right) => Box::new(Expr::Sub(
                left.derivative(with_respect_to),
                right.derivative(with_respect_to),
            )),

            Expr::Mul(left, right) => Box::new(Expr::Add(
                Box::new(Expr::Mul(left.clone(), right.derivative(with_respect_to))),
                Box::new(Expr::Mul(right.clone(), left.derivative(with_respect_to))),
            )),

            Expr::Div(left, right) => Box::new(Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(right.clone(), left.derivative(with_respect_to))),
                    Box::new(Expr::Mul(left.clone(), right.derivative(with_respect_to))),
                )),
                Box::new(Expr::Pow(right.clone(), Box::new(Expr::integer(2)))),
            )),

            Expr::Pow(base, exponent) if !exponent.contains_symbol(with_respect_to) => {
                // d/dx(f^n) = n * f^(n-1) * df/dx
                Box::new(Expr::Mul(
                    Box::new(Expr::Mul(
                        exponent.clone(),
                        Box::new(Expr::Pow(
                            base.clone(),
                            Box::new(Expr::Sub(exponent.clone(), Box::new(Expr::integer(1)))),
                        )),
                    )),
                    base.derivative(with_respect_to),
                ))
            }

            Expr::Pow(base, exponent) => Box::new(Expr::Mul(
                Box::new(Expr::Pow(base.clone(), exponent.clone())),
                Box::new(Expr::Add(
                    Box::new(Expr::Mul(
                        exponent.derivative(with_respect_to),
                        Box::new(Expr::Ln(base.clone())),
                    )),
                    Box::new(Expr::Mul(
                        exponent.clone(),
                        Box::new(Expr::Div(base.derivative(with_respect_to), base.clone())),
                    )),
                )),
            )),

            Expr::Neg(expr) => Box::new(Expr::Neg(expr.derivative(with_respect_to))),

            Expr::Abs(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Div(expr.clone(), Box::new(Expr::Abs(expr.clone())))),
                expr.derivative(with_respect_to),
            )),

            Expr::Exp(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Exp(expr.clone())),
                expr.derivative(with_respect_to),
            )),

            Expr::Ln(expr) => Box::new(Expr::Div(expr.derivative(with_respect_to), expr.clone())),

            Expr::Sqrt(expr) => Box::new(Expr::Div(
                expr.derivative(with_respect_to),
                Box::new(Expr::Mul(
                    Box::new(Expr::integer(2)),
                    Box::new(Expr::Sqrt(expr.clone())),
                )),
            )),

            Expr::Sin(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Cos(expr.clone())),
                expr.derivative(with_respect_to),
            )),

            Expr::Cos(expr) => Box::new(Expr::Mul(
                Box::new(Expr::Neg(Box::new(Expr::Sin(expr.clone())))),
                expr.derivative(with_respect_to),
            )),

            // d/dx(tan(f)) = df/dx / cos(f)^2
            Expr::Tan(expr) => Box::new(Expr::Div(
                expr.derivative(with_respect_to),
                Box::new(Expr::Pow(
                    Box::new(Expr::Cos(expr.clone())),
                    Box::new(Expr::integer(2)),
                )),
            )),
        }
    }

    /// Simplifies the expression bottom-up.
    ///
    /// Children are simplified first, then the rules for the node itself are
    /// applied by the matching constructor (`add`, `mul`, `pow`, ...), which
    /// assume already-simplified operands.
    ///
    /// # Returns
    /// A new simplified expression tree
    pub fn simplify(&self) -> Box<Expr> {
        match self {
            Expr::Const(_) | Expr::Float(_) | Expr::Pi | Expr::E | Expr::Symbol(_) => {
                Box::new(self.clone())
            }
            Expr::Add(left, right) => add(left.simplify(), right.simplify()),
            Expr::Sub(left, right) => sub(left.simplify(), right.simplify()),
            Expr::Mul(left, right) => mul(left.simplify(), right.simplify()),
            Expr::Div(left, right) => div(left.simplify(), right.simplify()),
            Expr::Pow(base, exponent) => pow(base.simplify(), exponent.simplify()),
            Expr::Neg(expr) => neg(expr.simplify()),
            Expr::Abs(expr) => simplify_abs(expr.simplify()),
            Expr::Exp(expr) => simplify_exp(expr.simplify()),
            Expr::Ln(expr) => simplify_ln(expr.simplify()),
            Expr::Sqrt(expr) => simplify_sqrt(expr.simplify()),
            Expr::Sin(expr) => {
                let e = expr.simplify();
                match &*e {
                    // sin(0) -> 0
                    e if e.is_zero() => Box::new(Expr::integer(0)),
                    Expr::Float(a) => Box::new(Expr::Float(a.sin())),
                    _ => Box::new(Expr::Sin(e)),
                }
            }
            Expr::Cos(expr) => {
                let e = expr.simplify();
                match &*e {
                    // cos(0) -> 1
                    e if e.is_zero() => Box::new(Expr::integer(1)),
                    Expr::Float(a) => Box::new(Expr::Float(a.cos())),
                    _ => Box::new(Expr::Cos(e)),
                }
            }
            Expr::Tan(expr) => {
                let e = expr.simplify();
                match &*e {
                    // tan(0) -> 0
                    e if e.is_zero() => Box::new(Expr::integer(0)),
                    Expr::Float(a) => Box::new(Expr::Float(a.tan())),
                    _ => Box::new(Expr::Tan(e)),
                }
            }
        }
    }

    /// Inserts an expression by replacing nodes that match a predicate.
    ///
    /// Recursively traverses the expression tree and replaces any nodes that match
    /// the given predicate with the replacement expression. The result is not
    /// simplified.
    ///
    /// # Arguments
    /// * `predicate` - A closure that determines which nodes to replace
    /// * `replacement` - The expression to insert where the predicate matches
    ///
    /// # Returns
    /// A new expression tree with the replacements applied
    pub fn insert<F>(&self, predicate: F, replacement: &Expr) -> Box<Expr>
    where
        F: Fn(&Expr) -> bool + Clone,
    {
        if predicate(self) {
            return Box::new(replacement.clone());
        }
        let recurse = |e: &Expr| e.insert(predicate.clone(), replacement);
        Box::new(match self {
            Expr::Const(_) | Expr::Float(_) | Expr::Pi | Expr::E | Expr::Symbol(_) => self.clone(),
            Expr::Add(left, right) => Expr::Add(recurse(left), recurse(right)),
            Expr::Sub(left, right) => Expr::Sub(recurse(left), recurse(right)),
            Expr::Mul(left, right) => Expr::Mul(recurse(left), recurse(right)),
            Expr::Div(left, right) => Expr::Div(recurse(left), recurse(right)),
            Expr::Pow(base, exponent) => Expr::Pow(recurse(base), recurse(exponent)),
            Expr::Neg(expr) => Expr::Neg(recurse(expr)),
            Expr::Abs(expr) => Expr::Abs(recurse(expr)),
            Expr::Exp(expr) => Expr::Exp(recurse(expr)),
            Expr::Ln(expr) => Expr::Ln(recurse(expr)),
            Expr::Sqrt(expr) => Expr::Sqrt(recurse(expr)),
            Expr::Sin(expr) => Expr::Sin(recurse(expr)),
            Expr::Cos(expr) => Expr::Cos(recurse(expr)),
            Expr::Tan(expr) => Expr::Tan(recurse(expr)),
        })
    }

    /// Replaces every occurrence of the unknown `name` with `value`.
    pub fn substitute(&self, name: &str, value: &Expr) -> Box<Expr> {
        self.insert(|e| matches!(e, Expr::Symbol(s) if s == name), value)
    }

    /// Binding strength used by `Display` to decide on parentheses.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Pow(..) => 4,
            Expr::Const(c) if !c.is_integer() => 2,
            Expr::Const(c) if c.is_negative() => 3,
            Expr::Float(f) if *f < 0.0 => 3,
            _ => 5,
        }
    }

    /// Formats `self`, parenthesised if it binds looser than `min_precedence`.
    fn wrapped(&self, min_precedence: u8) -> String {
        if self.precedence() < min_precedence {
            format!("({self})")
        } else {
            self.to_string()
        }
    }
}

/// Formats a float so that it always reads as one: `2.0`, not `2`.
pub(crate) fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Converts an exact constant to the nearest `f64`.
pub(crate) fn ratio_to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn is_odd(value: &BigInt) -> bool {
    !(value % BigInt::from(2)).is_zero()
}

/// Both operands as floats, if at least one is a float and the other a number.
fn float_pair(left: &Expr, right: &Expr) -> Option<(f64, f64)> {
    match (left, right) {
        (Expr::Float(a), Expr::Float(b)) => Some((*a, *b)),
        (Expr::Float(a), Expr::Const(b)) => Some((*a, ratio_to_f64(b))),
        (Expr::Const(a), Expr::Float(b)) => Some((ratio_to_f64(a), *b)),
        _ => None,
    }
}

/// Splits `c*x` into its exact coefficient and term.
fn split_coefficient(expr: &Expr) -> (BigRational, &Expr) {
    match expr {
        Expr::Mul(c, x) => match &**c {
            Expr::Const(c) => (c.clone(), &**x),
            _ => (BigRational::one(), expr),
        },
        _ => (BigRational::one(), expr),
    }
}

fn scaled(coefficient: BigRational, term: &Expr) -> Box<Expr> {
    mul(Box::new(Expr::Const(coefficient)), Box::new(term.clone()))
}

pub(crate) fn add(l: Box<Expr>, r: Box<Expr>) -> Box<Expr> {
    // Identity: x + 0 -> x
    if r.is_zero() {
        return l;
    }
    if l.is_zero() {
        return r;
    }
    if let Some((a, b)) = float_pair(&l, &r) {
        return Box::new(Expr::Float(a + b));
    }
    match (&*l, &*r) {
        // Fold constants: 1/3 + 1/6 -> 1/2
        (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a + b)),
        // Keep constants on the right: 1 + x -> x + 1
        (Expr::Const(_), _) => add(r, l),
        // x + (-y) -> x - y
        (x, Expr::Neg(y)) => sub(Box::new(x.clone()), y.clone()),
        // (-x) + y -> y - x
        (Expr::Neg(x), y) => sub(Box::new(y.clone()), x.clone()),
        // x + x -> 2*x
        (a, b) if a == b => mul(Box::new(Expr::integer(2)), l),
        // Associativity: (x + c1) + c2 -> x + (c1 + c2)
        (Expr::Add(x, c1), Expr::Const(c2)) => match &**c1 {
            Expr::Const(c1) => add(x.clone(), Box::new(Expr::Const(c1 + c2))),
            _ => Box::new(Expr::Add(l, r)),
        },
        // (x - c1) + c2 -> x + (c2 - c1)
        (Expr::Sub(x, c1), Expr::Const(c2)) => match &**c1 {
            Expr::Const(c1) => add(x.clone(), Box::new(Expr::Const(c2 - c1))),
            _ => Box::new(Expr::Add(l, r)),
        },
        // x + (-c) -> x - c
        (x, Expr::Const(c)) if c.is_negative() => {
            Box::new(Expr::Sub(Box::new(x.clone()), Box::new(Expr::Const(-c))))
        }
        (a, b) => {
            // Combine like terms: c1*x + c2*x -> (c1+c2)*x
            let (c1, x1) = split_coefficient(a);
            let (c2, x2) = split_coefficient(b);
            if x1 == x2 {
                scaled(c1 + c2, x1)
            } else {
                Box::new(Expr::Add(l, r))
            }
        }
    }
}

pub(crate) fn sub(l: Box<Expr>, r: Box<Expr>) -> Box<Expr> {
    // Identity: x - 0 -> x
    if r.is_zero() {
        return l;
    }
    // 0 - x -> -x
    if l.is_zero() {
        return neg(r);
    }
    // Zero: x - x -> 0
    if l == r {
        return Box::new(Expr::integer(0));
    }
    if let Some((a, b)) = float_pair(&l, &r) {
        return Box::new(Expr::Float(a - b));
    }
    match (&*l, &*r) {
        // Fold constants: 3 - 2 -> 1
        (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a - b)),
        // x - (-y) -> x + y
        (x, Expr::Neg(y)) => add(Box::new(x.clone()), y.clone()),
        // x - (-c) -> x + c
        (x, Expr::Const(c)) if c.is_negative() => {
            add(Box::new(x.clone()), Box::new(Expr::Const(-c)))
        }
        // (x + c1) - c2 -> x + (c1 - c2)
        (Expr::Add(x, c1), Expr::Const(c2)) => match &**c1 {
            Expr::Const(c1) => add(x.clone(), Box::new(Expr::Const(c1 - c2))),
            _ => Box::new(Expr::Sub(l, r)),
        },
        // (x - c1) - c2 -> x - (c1 + c2)
        (Expr::Sub(x, c1), Expr::Const(c2)) => match &**c1 {
            Expr::Const(c1) => sub(x.clone(), Box::new(Expr::Const(c1 + c2))),
            _ => Box::new(Expr::Sub(l, r)),
        },
        (a, b) => {
            // Combine like terms: c1*x - c2*x -> (c1-c2)*x
            let (c1, x1) = split_coefficient(a);
            let (c2, x2) = split_coefficient(b);
            if x1 == x2 && !x1.is_number_literal() {
                scaled(c1 - c2, x1)
            } else {
                Box::new(Expr::Sub(l, r))
            }
        }
    }
}

pub(crate) fn mul(l: Box<Expr>, r: Box<Expr>) -> Box<Expr> {
    // Zero property: x * 0 -> 0
    if l.is_zero() || r.is_zero() {
        return Box::new(Expr::integer(0));
    }
    // Identity: x * 1 -> x
    if l.is_one() {
        return r;
    }
    if r.is_one() {
        return l;
    }
    if let Some((a, b)) = float_pair(&l, &r) {
        return Box::new(Expr::Float(a * b));
    }
    match (&*l, &*r) {
        // Fold constants: 2 * 3 -> 6
        (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a * b)),
        // Keep numbers on the left: x * 2 -> 2 * x
        (_, Expr::Const(_) | Expr::Float(_)) => mul(r, l),
        // Negative one: (-1) * x -> -x
        (Expr::Const(c), x) if *c == -BigRational::one() => neg(Box::new(x.clone())),
        // Associativity: c1 * (c2 * x) -> (c1 * c2) * x
        (Expr::Const(c1), Expr::Mul(c2, x)) => match &**c2 {
            Expr::Const(c2) => mul(Box::new(Expr::Const(c1 * c2)), x.clone()),
            _ => Box::new(Expr::Mul(l, r)),
        },
        // c * (-x) -> (-c) * x
        (Expr::Const(c), Expr::Neg(x)) => mul(Box::new(Expr::Const(-c)), x.clone()),
        // Pull negation out: (-x) * y -> -(x * y)
        (Expr::Neg(x), y) | (y, Expr::Neg(x)) => neg(mul(x.clone(), Box::new(y.clone()))),
        // x * x -> x**2
        (a, b) if a == b => pow(l, Box::new(Expr::integer(2))),
        // Combine exponents: x^a * x^b -> x^(a+b)
        (Expr::Pow(b1, e1), Expr::Pow(b2, e2)) if b1 == b2 && keeps_domain(e1, e2, true) => {
            pow(b1.clone(), add(e1.clone(), e2.clone()))
        }
        // x * x^a -> x^(a+1)
        (x, Expr::Pow(b, e)) | (Expr::Pow(b, e), x) if **b == *x => {
            pow(b.clone(), add(e.clone(), Box::new(Expr::integer(1))))
        }
        // x * (1/y) -> x/y
        (x, Expr::Div(n, d)) if n.is_one() => div(Box::new(x.clone()), d.clone()),
        _ => Box::new(Expr::Mul(l, r)),
    }
}

pub(crate) fn div(l: Box<Expr>, r: Box<Expr>) -> Box<Expr> {
    // Division by zero is left for evaluation to report
    if r.is_zero() {
        return Box::new(Expr::Div(l, r));
    }
    // Zero numerator: 0 / x -> 0
    if l.is_zero() {
        return Box::new(Expr::integer(0));
    }
    // Identity: x / 1 -> x
    if r.is_one() {
        return l;
    }
    // Identity: x / x -> 1
    if l == r {
        return Box::new(Expr::integer(1));
    }
    if let Some((a, b)) = float_pair(&l, &r) {
        return Box::new(Expr::Float(a / b));
    }
    match (&*l, &*r) {
        // Fold constants: 6 / 4 -> 3/2
        (Expr::Const(a), Expr::Const(b)) => Box::new(Expr::Const(a / b)),
        // Division by a constant becomes a rational coefficient: x / 2 -> 1/2 * x
        (x, Expr::Const(c)) => mul(Box::new(Expr::Const(c.recip())), Box::new(x.clone())),
        // Simplify nested divisions: (x/y)/z -> x/(y*z)
        (Expr::Div(x, y), z) => div(x.clone(), mul(y.clone(), Box::new(z.clone()))),
        // Simplify exponents: x^a / x^b -> x^(a-b)
        (Expr::Pow(b1, e1), Expr::Pow(b2, e2)) if b1 == b2 && keeps_domain(e1, e2, false) => {
            pow(b1.clone(), sub(e1.clone(), e2.clone()))
        }
        // (c*x) / x -> c
        (Expr::Mul(c, x), y) if **x == *y && c.is_number_literal() => c.clone(),
        _ => Box::new(Expr::Div(l, r)),
    }
}

pub(crate) fn neg(e: Box<Expr>) -> Box<Expr> {
    match &*e {
        Expr::Const(a) => Box::new(Expr::Const(-a)),
        Expr::Float(a) => Box::new(Expr::Float(-a)),
        // Double negation: -(-x) -> x
        Expr::Neg(inner) => inner.clone(),
        // Factor out negation: -(c*x) -> (-c)*x
        Expr::Mul(c, x) if matches!(**c, Expr::Const(_)) => {
            mul(neg(c.clone()), x.clone())
        }
        // -(x - y) -> y - x
        Expr::Sub(x, y) => sub(y.clone(), x.clone()),
        _ => Box::new(Expr::Neg(e)),
    }
}

pub(crate) fn pow(base: Box<Expr>, exponent: Box<Expr>) -> Box<Expr> {
    // x^0 -> 1 (including 0^0 = 1 by convention)
    if exponent.is_zero() {
        return Box::new(Expr::integer(1));
    }
    // Identity: x^1 -> x
    if exponent.is_one() {
        return base;
    }
    // 1^x -> 1
    if base.is_one() {
        return base;
    }
    if let Some((a, b)) = float_pair(&base, &exponent) {
        let value = a.powf(b);
        if value.is_finite() {
            return Box::new(Expr::Float(value));
        }
        return Box::new(Expr::Pow(base, exponent));
    }
    match (&*base, &*exponent) {
        (Expr::Const(a), Expr::Const(q)) => {
            fold_rational_power(a, q).unwrap_or_else(|| Box::new(Expr::Pow(base, exponent)))
        }
        // sqrt(c)^2 -> c, for c >= 0 only
        (Expr::Sqrt(x), Expr::Const(two))
            if *two == BigRational::from_integer(2.into()) && is_non_negative_constant(x) =>
        {
            x.clone()
        }
        // Nested exponents: (x^a)^n -> x^(a*n) for integers a and n
        (Expr::Pow(inner_base, inner_exp), Expr::Const(n))
            if n.is_integer() && inner_exp.as_rational().is_some_and(|a| a.is_integer()) =>
        {
            pow(inner_base.clone(), mul(inner_exp.clone(), exponent.clone()))
        }
        _ => Box::new(Expr::Pow(base, exponent)),
    }
}

/// Returns true for an exact constant that is not negative.
fn is_non_negative_constant(expr: &Expr) -> bool {
    matches!(expr, Expr::Const(c) if !c.is_negative())
}

/// Whether merging `x^a` and `x^b` into one power leaves the domain of `x` unchanged.
///
/// `x^(1/2) * x^(1/2)` is only defined for `x >= 0`, while `x^1` is defined everywhere,
/// so fractional exponents may only merge into another fractional exponent.
fn keeps_domain(a: &Expr, b: &Expr, sum: bool) -> bool {
    match (a.as_rational(), b.as_rational()) {
        (Some(a), Some(b)) => {
            let merged = if sum { a + b } else { a - b };
            (a.is_integer() && b.is_integer()) || !merged.is_integer()
        }
        _ => true,
    }
}

/// Folds `a^q` exactly when the result is rational and of bounded size.
fn fold_rational_power(a: &BigRational, q: &BigRational) -> Option<Box<Expr>> {
    // p/k with k > 0
    let p = q.numer().to_i64()?;
    let k = q.denom().to_u32()?;
    if p.abs() > MAX_EXACT_EXPONENT || k > MAX_EXACT_ROOT {
        return None;
    }
    if a.is_zero() && p < 0 {
        return None;
    }
    let root = if k == 1 { a.clone() } else { exact_root(a, k)? };
    let bits = root.numer().bits().max(root.denom().bits());
    if bits.saturating_mul(p.unsigned_abs()) > MAX_FOLD_BITS {
        return None;
    }
    Some(Box::new(Expr::Const(root.pow(p as i32))))
}

/// The exact non-negative `k`-th root of a rational, if it exists.
pub(crate) fn exact_root(value: &BigRational, k: u32) -> Option<BigRational> {
    if value.is_negative() {
        return None;
    }
    let numer = value.numer().nth_root(k);
    let denom = value.denom().nth_root(k);
    if numer.pow(k) == *value.numer() && denom.pow(k) == *value.denom() {
        Some(BigRational::new(numer, denom))
    } else {
        None
    }
}

fn simplify_abs(e: Box<Expr>) -> Box<Expr> {
    match &*e {
        // Fold constants: abs(-3) -> 3
        Expr::Const(a) => Box::new(Expr::Const(a.abs())),
        Expr::Float(a) => Box::new(Expr::Float(a.abs())),
        // Nested abs: abs(abs(x)) -> abs(x)
        Expr::Abs(_) => e,
        // abs(-x) -> abs(x)
        Expr::Neg(inner) => simplify_abs(inner.clone()),
        _ => Box::new(Expr::Abs(e)),
    }
}

fn simplify_exp(e: Box<Expr>) -> Box<Expr> {
    match &*e {
        // exp(0) -> 1
        e if e.is_zero() => Box::new(Expr::integer(1)),
        Expr::Float(a) => Box::new(Expr::Float(a.exp())),
        // exp(ln(x)) -> x
        Expr::Ln(inner) => inner.clone(),
        _ => Box::new(Expr::Exp(e)),
    }
}

fn simplify_ln(e: Box<Expr>) -> Box<Expr> {
    match &*e {
        // ln(1) -> 0
        e if e.is_one() => Box::new(Expr::integer(0)),
        // ln(E) -> 1
        Expr::E => Box::new(Expr::integer(1)),
        Expr::Float(a) if *a > 0.0 => Box::new(Expr::Float(a.ln())),
        // ln(exp(x)) -> x
        Expr::Exp(inner) => inner.clone(),
        _ => Box::new(Expr::Ln(e)),
    }
}

fn simplify_sqrt(e: Box<Expr>) -> Box<Expr> {
    match &*e {
        // Perfect squares: sqrt(9/4) -> 3/2
        Expr::Const(a) => match exact_root(a, 2) {
            Some(root) => Box::new(Expr::Const(root)),
            None => Box::new(Expr::Sqrt(e)),
        },
        Expr::Float(a) if *a >= 0.0 => Box::new(Expr::Float(a.sqrt())),
        // sqrt(x^2) -> abs(x)
        Expr::Pow(x, two) if two.as_rational() == Some(&BigRational::from_integer(2.into())) => {
            Box::new(Expr::Abs(x.clone()))
        }
        _ => Box::new(Expr::Sqrt(e)),
    }
}

/// Implements string formatting for expressions.
///
/// Expressions are printed in the canonical grammar the parser accepts, with
/// parentheses only where precedence requires them:
/// - Exact constants print as integers or `p/q`
/// - Powers use `**`
/// - A rational coefficient is printed as a division (`1/2 * x` prints as `x/2`)
/// - Functions use call notation, including `abs(x)`
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => write!(f, "{c}"),
            Expr::Float(v) => f.write_str(&format_float(*v)),
            Expr::Pi => write!(f, "pi"),
            Expr::E => write!(f, "E"),
            Expr::Symbol(name) => write!(f, "{name}"),
            Expr::Add(left, right) => write!(f, "{} + {}", left.wrapped(1), right.wrapped(1)),
            Expr::Sub(left, right) => write!(f, "{} - {}", left.wrapped(1), right.wrapped(2)),
            Expr::Mul(left, right) => match &**left {
                Expr::Const(c) if !c.is_integer() => {
                    let numer = c.numer();
                    let term = right.wrapped(2);
                    if numer.is_one() {
                        write!(f, "{term}/{}", c.denom())
                    } else if *numer == -BigInt::one() {
                        write!(f, "-{term}/{}", c.denom())
                    } else {
                        write!(f, "{numer}*{term}/{}", c.denom())
                    }
                }
                _ => write!(f, "{}*{}", left.wrapped(2), right.wrapped(3)),
            },
            Expr::Div(left, right) => write!(f, "{}/{}", left.wrapped(2), right.wrapped(3)),
            Expr::Pow(base, exponent) => {
                write!(f, "{}**{}", base.wrapped(5), exponent.wrapped(4))
            }
            Expr::Neg(expr) => write!(f, "-{}", expr.wrapped(3)),
            Expr::Abs(expr) => write!(f, "abs({expr})"),
            Expr::Exp(expr) => write!(f, "exp({expr})"),
            Expr::Ln(expr) => write!(f, "ln({expr})"),
            Expr::Sqrt(expr) => write!(f, "sqrt({expr})"),
            Expr::Sin(expr) => write!(f, "sin({expr})"),
            Expr::Cos(expr) => write!(f, "cos({expr})"),
            Expr::Tan(expr) => write!(f, "tan({expr})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper function to create a variable
    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::symbol(name))
    }

    fn int(value: i64) -> Box<Expr> {
        Box::new(Expr::integer(value))
    }

    #[test]
    fn test_simplify() {
        // Test constant folding
        // 2 + 3 → 5
        assert_eq!(*Expr::Add(int(2), int(3)).simplify(), Expr::integer(5));

        // Exact fractions: 1/3 + 1/6 → 1/2
        let sum = Expr::Add(
            Box::new(Expr::Div(int(1), int(3))),
            Box::new(Expr::Div(int(1), int(6))),
        );
        assert_eq!(*sum.simplify(), Expr::rational(1, 2));

        // Test additive identity
        // x + 0 → x
        assert_eq!(*Expr::Add(var("x"), int(0)).simplify(), *var("x"));

        // Test multiplicative identity
        // x * 1 → x
        assert_eq!(*Expr::Mul(var("x"), int(1)).simplify(), *var("x"));

        // Test multiplication by zero
        // x * 0 → 0
        assert_eq!(*Expr::Mul(var("x"), int(0)).simplify(), Expr::integer(0));

        // Test division by self
        // x / x → 1
        assert_eq!(*Expr::Div(var("x"), var("x")).simplify(), Expr::integer(1));

        // Test exponent simplification
        // x^0 → 1
        assert_eq!(*Expr::Pow(var("x"), int(0)).simplify(), Expr::integer(1));
        // x^1 → x
        assert_eq!(*Expr::Pow(var("x"), int(1)).simplify(), *var("x"));

        // Test absolute value of constant
        // |-3| → 3
        assert_eq!(*Expr::Abs(int(-3)).simplify(), Expr::integer(3));
    }

    #[test]
    fn test_rational_powers() {
        // 2^-1 → 1/2
        assert_eq!(*Expr::Pow(int(2), int(-1)).simplify(), Expr::rational(1, 2));
        // 8^(2/3) → 4
        let exponent = Box::new(Expr::rational(2, 3));
        assert_eq!(*Expr::Pow(int(8), exponent).simplify(), Expr::integer(4));
        // 2^(1/2) has no rational value
        let exponent = Box::new(Expr::rational(1, 2));
        assert!(!Expr::Pow(int(2), exponent).simplify().is_number_literal());
        // 0^-1 is left alone
        assert!(!Expr::Pow(int(0), int(-1)).simplify().is_number_literal());
    }

    #[test]
    fn test_huge_powers_stay_unfolded() {
        // 9^1024 has 3246 bits and is folded
        assert!(Expr::Pow(int(9), int(1024)).simplify().is_number_literal());
        // (9^1024)^1024 would have over three million bits
        let inner = Box::new(Expr::Pow(int(9), int(1024)));
        let expr = Expr::Pow(Box::new(Expr::Pow(inner, int(1024))), int(1024)).simplify();
        assert!(matches!(*expr, Expr::Pow(..)), "{expr}");
        assert!(expr.evaluate().is_err());
    }

    #[test]
    fn test_power_rules_keep_the_domain() {
        // sqrt(x)^2 is undefined for x < 0, so it does not become x
        let expr = Expr::Pow(Box::new(Expr::Sqrt(var("x"))), int(2)).simplify();
        assert_ne!(*expr, *var("x"));
        assert!(expr.eval_at("x", -4.0).is_nan());
        // sqrt(3)^2 -> 3
        let expr = Expr::Pow(Box::new(Expr::Sqrt(int(3))), int(2)).simplify();
        assert_eq!(*expr, Expr::integer(3));

        // (x^(1/2))^2 stays, (x^2)^3 -> x^6
        let half = Box::new(Expr::rational(1, 2));
        let expr = Expr::Pow(Box::new(Expr::Pow(var("x"), half.clone())), int(2)).simplify();
        assert!(expr.eval_at("x", -1.0).is_nan());
        let expr = Expr::Pow(Box::new(Expr::Pow(var("x"), int(2))), int(3)).simplify();
        assert_eq!(*expr, Expr::Pow(var("x"), int(6)));

        // x^(1/2) * x^(1/2) stays, x^2 * x^3 -> x^5
        let root = Box::new(Expr::Pow(var("x"), half));
        let expr = Expr::Mul(root.clone(), root).simplify();
        assert!(expr.eval_at("x", -1.0).is_nan());
        let expr = Expr::Mul(
            Box::new(Expr::Pow(var("x"), int(2))),
            Box::new(Expr::Pow(var("x"), int(3))),
        )
        .simplify();
        assert_eq!(*expr, Expr::Pow(var("x"), int(5)));
    }

    #[test]
    fn test_like_terms() {
        // 2*x + 3*x → 5*x
        let expr = Expr::Add(
            Box::new(Expr::Mul(int(2), var("x"))),
            Box::new(Expr::Mul(int(3), var("x"))),
        );
        assert_eq!(*expr.simplify(), Expr::Mul(int(5), var("x")));

        // x * x → x**2
        assert_eq!(
            *Expr::Mul(var("x"), var("x")).simplify(),
            Expr::Pow(var("x"), int(2))
        );

        // (x + 1) - 1 → x
        let expr = Expr::Sub(Box::new(Expr::Add(var("x"), int(1))), int(1));
        assert_eq!(*expr.simplify(), *var("x"));
    }

    #[test]
    fn test_transcendental_constants_stay_exact() {
        assert_eq!(*Expr::Sin(int(1)).simplify(), Expr::Sin(int(1)));
        assert_eq!(*Expr::Sqrt(int(2)).simplify(), Expr::Sqrt(int(2)));
        assert_eq!(*Expr::Sqrt(int(9)).simplify(), Expr::integer(3));
        assert_eq!(*Expr::Sin(int(0)).simplify(), Expr::integer(0));
        assert_eq!(*Expr::Ln(int(1)).simplify(), Expr::integer(0));
        assert_eq!(*Expr::Ln(Box::new(Expr::E)).simplify(), Expr::integer(1));
    }

    #[test]
    fn test_float_folding() {
        let expr = Expr::Add(Box::new(Expr::Float(0.5)), int(1));
        assert_eq!(*expr.simplify(), Expr::Float(1.5));
    }

    #[test]
    fn test_insert() {
        // Create expression: x + y
        let expr = Box::new(Expr::Add(var("x"), var("y")));

        // Replace all occurrences of 'x' with '2*z'
        let replacement = Box::new(Expr::Mul(int(2), var("z")));

        let result = expr.insert(|e| matches!(e, Expr::Symbol(v) if v == "x"), &replacement);

        // Expected: (2*z) + y
        assert_eq!(
            *result,
            Expr::Add(Box::new(Expr::Mul(int(2), var("z"))), var("y"))
        );
    }

    #[test]
    fn test_derivative() {
        // Test constant derivative
        assert_eq!(*Expr::integer(5).derivative("x"), Expr::integer(0));

        // Test variable derivatives (x)' = 1, (y)' = 0
        assert_eq!(*var("x").derivative("x"), Expr::integer(1));
        assert_eq!(*var("y").derivative("x"), Expr::integer(0));

        // (x^3)' simplifies to 3*x^2
        let power = Expr::Pow(var("x"), int(3));
        assert_eq!(
            *power.derivative("x").simplify(),
            Expr::Mul(int(3), Box::new(Expr::Pow(var("x"), int(2))))
        );

        // (2*x + y)' with respect to x is 2
        let linear = Expr::Add(Box::new(Expr::Mul(int(2), var("x"))), var("y"));
        assert_eq!(*linear.derivative("x").simplify(), Expr::integer(2));
    }

    #[test]
    fn test_evaluate() {
        let expr = Expr::Add(Box::new(Expr::Sqrt(int(2))), Box::new(Expr::Pi));
        let value = expr.evaluate().unwrap();
        assert!((value - (2f64.sqrt() + std::f64::consts::PI)).abs() < 1e-12);

        assert_eq!(
            Expr::Div(int(1), int(0)).evaluate(),
            Err(EvalError::NonFinite("1/0".to_string()))
        );
        assert_eq!(
            Expr::Add(var("x"), int(1)).evaluate(),
            Err(EvalError::UnboundSymbol("x".to_string()))
        );
    }

    #[test]
    fn test_is_real() {
        assert!(Expr::Sqrt(int(2)).is_real());
        assert!(!Expr::Sqrt(int(-4)).is_real());
        assert!(!Expr::Ln(int(-1)).is_real());
        assert!(Expr::Div(int(1), int(0)).is_real());
        assert!(!Expr::symbol("x").is_real());
    }

    #[test]
    fn test_eval_at() {
        let expr = Expr::Sub(Box::new(Expr::Pow(var("x"), int(2))), int(4));
        assert_eq!(expr.eval_at("x", 3.0), 5.0);
        assert!(Expr::Ln(var("x")).eval_at("x", -1.0).is_nan());
        // Odd roots of negative numbers are real
        let cube_root = Expr::Pow(var("x"), Box::new(Expr::rational(1, 3)));
        assert!((cube_root.eval_at("x", -8.0) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_free_symbols() {
        let expr = Expr::Add(
            Box::new(Expr::Mul(var("y"), Box::new(Expr::Pi))),
            Box::new(Expr::Sin(var("x"))),
        );
        let symbols: Vec<_> = expr.free_symbols().into_iter().collect();
        assert_eq!(symbols, vec!["x".to_string(), "y".to_string()]);
        assert!(Expr::Sqrt(Box::new(Expr::E)).free_symbols().is_empty());
    }

    #[test]
    fn test_display() {
        // Test basic expressions
        assert_eq!(format!("{}", Expr::integer(5)), "5");
        assert_eq!(format!("{}", Expr::rational(-1, 2)), "-1/2");
        assert_eq!(format!("{}", Expr::Float(2.0)), "2.0");
        assert_eq!(format!("{}", *var("x")), "x");

        // Test binary operations
        let sum = Expr::Add(var("x"), var("y"));
        assert_eq!(format!("{sum}"), "x + y");

        let difference = Expr::Sub(var("x"), Box::new(Expr::Add(var("y"), int(1))));
        assert_eq!(format!("{difference}"), "x - (y + 1)");

        let half = Expr::Mul(Box::new(Expr::rational(1, 2)), var("x"));
        assert_eq!(format!("{half}"), "x/2");

        let power = Expr::Pow(Box::new(Expr::Add(var("x"), int(1))), int(2));
        assert_eq!(format!("{power}"), "(x + 1)**2");

        let negated = Expr::Neg(Box::new(Expr::Pow(var("x"), int(2))));
        assert_eq!(format!("{negated}"), "-x**2");

        // Test special functions
        assert_eq!(format!("{}", Expr::Abs(var("x"))), "abs(x)");
        assert_eq!(format!("{}", Expr::Sqrt(int(2))), "sqrt(2)");
    }

    #[test]
    fn test_symbolic_isolation_reads_naturally() {
        // -(y - 5) → 5 - y
        let expr = Expr::Neg(Box::new(Expr::Sub(var("y"), int(5))));
        assert_eq!(expr.simplify().to_string(), "5 - y");
    }
}
