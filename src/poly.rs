//! Dense univariate polynomials with exact rational coefficients.
//!
//! Used by the solver to recognise residuals such as `x**2 - 5*x + 6` and solve
//! them in closed form. For higher degrees it supplies the square-free part and
//! Cauchy's bound to the root isolation in `roots`.

use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::errors::SolveError;
use crate::expr::{ratio_to_f64, Expr};
use crate::roots::Deadline;

/// Largest exponent expanded when recognising a polynomial.
const MAX_DEGREE: usize = 256;

/// A polynomial `c[0] + c[1]*x + ... + c[n]*x^n`.
///
/// Trailing zero coefficients are trimmed, so the zero polynomial has no coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<BigRational>,
}

impl Polynomial {
    /// Creates a polynomial from coefficients in ascending order of power.
    pub fn new(mut coefficients: Vec<BigRational>) -> Self {
        while coefficients.last().is_some_and(|c| c.is_zero()) {
            coefficients.pop();
        }
        Self { coefficients }
    }

    fn constant(value: BigRational) -> Self {
        Self::new(vec![value])
    }

    /// Recognises `expr` as a polynomial in `var` with rational coefficients.
    ///
    /// Returns `None` if the expression contains another unknown, an irrational
    /// constant, a function of `var`, a division by a non-constant or a
    /// non-integer power.
    ///
    /// # Example
    /// ```
    /// use evalexpr_solve::convert::parse;
    /// use evalexpr_solve::poly::Polynomial;
    ///
    /// let poly = Polynomial::from_expr(&parse("(x-1)*(x+2)").unwrap(), "x").unwrap();
    /// assert_eq!(poly.degree(), 2);
    /// assert!(Polynomial::from_expr(&parse("sin(x)").unwrap(), "x").is_none());
    /// ```
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        match expr {
            Expr::Const(c) => Some(Self::constant(c.clone())),
            Expr::Float(f) => BigRational::from_float(*f).map(Self::constant),
            Expr::Symbol(name) if name == var => Some(Self::new(vec![
                BigRational::zero(),
                BigRational::from_integer(1.into()),
            ])),
            Expr::Add(left, right) => {
                Some(Self::from_expr(left, var)?.add(&Self::from_expr(right, var)?))
            }
            Expr::Sub(left, right) => {
                Some(Self::from_expr(left, var)?.sub(&Self::from_expr(right, var)?))
            }
            Expr::Mul(left, right) => {
                let product = Self::from_expr(left, var)?.mul(&Self::from_expr(right, var)?);
                (product.degree() <= MAX_DEGREE).then_some(product)
            }
            Expr::Div(left, right) => {
                let divisor = Self::from_expr(right, var)?;
                match divisor.coefficients.as_slice() {
                    [c] => Some(Self::from_expr(left, var)?.scale(&c.recip())),
                    _ => None,
                }
            }
            Expr::Pow(base, exponent) => {
                let n = exponent.as_rational().filter(|n| n.is_integer() && !n.is_negative())?;
                // Bounds the expansion loop, including for constant bases
                let n = n.to_integer().to_usize().filter(|n| *n <= MAX_DEGREE)?;
                let base = Self::from_expr(base, var)?;
                // Constant powers left by the simplifier are irrational or too large to expand
                if base.degree() == 0 || base.degree().saturating_mul(n) > MAX_DEGREE {
                    return None;
                }
                let mut result = Self::constant(BigRational::from_integer(1.into()));
                for _ in 0..n {
                    result = result.mul(&base);
                }
                Some(result)
            }
            Expr::Neg(inner) => Some(Self::from_expr(inner, var)?.scale(&-BigRational::from_integer(1.into()))),
            _ => None,
        }
    }

    /// Degree of the polynomial; the zero polynomial has degree 0.
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Returns true for the zero polynomial.
    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// The coefficient of `x^power`.
    pub fn coefficient(&self, power: usize) -> BigRational {
        self.coefficients
            .get(power)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    fn add(&self, other: &Self) -> Self {
        let len = self.coefficients.len().max(other.coefficients.len());
        Self::new((0..len).map(|i| self.coefficient(i) + other.coefficient(i)).collect())
    }

    fn sub(&self, other: &Self) -> Self {
        let len = self.coefficients.len().max(other.coefficients.len());
        Self::new((0..len).map(|i| self.coefficient(i) - other.coefficient(i)).collect())
    }

    fn scale(&self, factor: &BigRational) -> Self {
        Self::new(self.coefficients.iter().map(|c| c * factor).collect())
    }

    fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::new(Vec::new());
        }
        let mut product =
            vec![BigRational::zero(); self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                product[i + j] += a * b;
            }
        }
        Self::new(product)
    }

    /// The formal derivative.
    pub fn derivative(&self) -> Self {
        Self::new(
            self.coefficients
                .iter()
                .enumerate()
                .skip(1)
                .map(|(power, c)| c * BigRational::from_integer(power.into()))
                .collect(),
        )
    }

    /// Polynomial long division, `None` when dividing by the zero polynomial.
    ///
    /// # Returns
    /// `(quotient, remainder)` with `self = quotient * divisor + remainder`
    pub fn div_rem(&self, divisor: &Self) -> Option<(Self, Self)> {
        let lead = divisor.coefficients.last()?;
        let d = divisor.degree();
        if self.coefficients.len() <= d {
            return Some((Self::new(Vec::new()), self.clone()));
        }
        let mut remainder = self.coefficients.clone();
        let mut quotient = vec![BigRational::zero(); remainder.len() - d];
        for i in (0..quotient.len()).rev() {
            let factor = &remainder[i + d] / lead;
            if !factor.is_zero() {
                for (j, c) in divisor.coefficients.iter().enumerate() {
                    remainder[i + j] -= &factor * c;
                }
            }
            quotient[i] = factor;
        }
        Some((Self::new(quotient), Self::new(remainder)))
    }

    /// Scales to a leading coefficient of one; the zero polynomial stays zero.
    fn monic(&self) -> Self {
        match self.coefficients.last() {
            Some(lead) => self.scale(&lead.recip()),
            None => self.clone(),
        }
    }

    /// Monic greatest common divisor, by Euclid's algorithm.
    ///
    /// # Errors
    /// `SolveError::Timeout` if the deadline passes between division steps
    pub fn gcd(&self, other: &Self, deadline: &Deadline) -> Result<Self, SolveError> {
        let (mut a, mut b) = (self.monic(), other.monic());
        while let Some((_, remainder)) = a.div_rem(&b) {
            deadline.check()?;
            a = b;
            b = remainder.monic();
        }
        Ok(a)
    }

    /// The square-free part: same real roots, each with multiplicity one.
    ///
    /// # Example
    /// ```
    /// use evalexpr_solve::convert::parse;
    /// use evalexpr_solve::poly::Polynomial;
    /// use evalexpr_solve::roots::Deadline;
    ///
    /// let p = Polynomial::from_expr(&parse("(x-1)**3*(x+2)").unwrap(), "x").unwrap();
    /// let q = p.square_free(&Deadline::new(None)).unwrap();
    /// assert_eq!(q, Polynomial::from_expr(&parse("(x-1)*(x+2)").unwrap(), "x").unwrap());
    /// ```
    pub fn square_free(&self, deadline: &Deadline) -> Result<Self, SolveError> {
        let repeated = self.gcd(&self.derivative(), deadline)?;
        Ok(match self.div_rem(&repeated) {
            Some((quotient, _)) => quotient.monic(),
            None => self.monic(),
        })
    }

    /// Number of zero coefficients below the lowest non-zero one, i.e. the multiplicity of the root 0.
    pub fn trailing_zeros(&self) -> usize {
        self.coefficients
            .iter()
            .take_while(|c| c.is_zero())
            .count()
    }

    /// Divides by `x^k`, assuming the lowest `k` coefficients are zero.
    pub fn deflate(&self, k: usize) -> Self {
        Self::new(self.coefficients.iter().skip(k).cloned().collect())
    }

    /// Coefficients converted to `f64`, ascending.
    pub fn to_f64_coefficients(&self) -> Vec<f64> {
        self.coefficients.iter().map(ratio_to_f64).collect()
    }

    /// Cauchy's bound: every real root lies in `[-bound, bound]`.
    pub fn cauchy_bound(&self) -> f64 {
        let Some(leading) = self.coefficients.last() else {
            return 0.0;
        };
        let max_ratio = self.coefficients[..self.degree()]
            .iter()
            .map(|c| ratio_to_f64(&(c / leading).abs()))
            .fold(0.0, f64::max);
        1.0 + max_ratio
    }
}

/// Evaluates a polynomial given by ascending `f64` coefficients using Horner's scheme.
pub fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::parse;

    fn poly(text: &str) -> Polynomial {
        Polynomial::from_expr(&parse(text).unwrap(), "x").unwrap()
    }

    fn ints(values: &[i64]) -> Vec<BigRational> {
        values
            .iter()
            .map(|v| BigRational::from_integer((*v).into()))
            .collect()
    }

    #[test]
    fn test_expands_products_and_powers() {
        assert_eq!(poly("(x-2)*(x+2)"), Polynomial::new(ints(&[-4, 0, 1])));
        assert_eq!(poly("(x+1)**3"), Polynomial::new(ints(&[1, 3, 3, 1])));
        assert_eq!(poly("x/2").coefficient(1), BigRational::new(1.into(), 2.into()));
    }

    #[test]
    fn test_rejects_non_polynomials() {
        for text in ["sin(x)", "1/x", "x**(1/2)", "x*y", "pi*x", "2**x"] {
            let expr = parse(text).unwrap();
            assert!(Polynomial::from_expr(&expr, "x").is_none(), "{text}");
        }
    }

    #[test]
    fn test_rejects_huge_exponents() {
        // Left unfolded by the simplifier, and far above the expansion limit
        let expr = parse("x + 2**100000000000").unwrap();
        assert!(Polynomial::from_expr(&expr, "x").is_none());
        assert!(Polynomial::from_expr(&parse("x**300").unwrap(), "x").is_none());
        assert_eq!(poly("(x+1)**256").degree(), 256);
    }

    #[test]
    fn test_trims_cancelled_terms() {
        let p = poly("x**2 + x - x**2");
        assert_eq!(p.degree(), 1);
    }

    #[test]
    fn test_derivative_and_deflate() {
        let p = poly("x**3 - 4*x");
        assert_eq!(p.derivative(), Polynomial::new(ints(&[-4, 0, 3])));
        assert_eq!(p.trailing_zeros(), 1);
        assert_eq!(p.deflate(1), Polynomial::new(ints(&[-4, 0, 1])));
    }

    #[test]
    fn test_division() {
        let (quotient, remainder) = poly("x**3 - 1").div_rem(&poly("x - 1")).unwrap();
        assert_eq!(quotient, poly("x**2 + x + 1"));
        assert!(remainder.is_zero());

        let (quotient, remainder) = poly("x**2 + 1").div_rem(&poly("2*x")).unwrap();
        assert_eq!(quotient, poly("x/2"));
        assert_eq!(remainder, poly("1"));

        assert!(poly("x").div_rem(&Polynomial::new(Vec::new())).is_none());
    }

    #[test]
    fn test_gcd_and_square_free() {
        let deadline = Deadline::new(None);
        let g = poly("(x-1)*(x-2)").gcd(&poly("(x-2)*(x+3)"), &deadline).unwrap();
        assert_eq!(g, poly("x - 2"));

        let q = poly("4*(x-1)**2*(x+1)").square_free(&deadline).unwrap();
        assert_eq!(q, poly("(x-1)*(x+1)"));
        assert_eq!(poly("x**2 - 2").square_free(&deadline).unwrap(), poly("x**2 - 2"));
    }

    #[test]
    fn test_horner_and_bound() {
        let p = poly("x**3 - 6*x**2 + 11*x - 6");
        let coefficients = p.to_f64_coefficients();
        assert_eq!(horner(&coefficients, 3.0), 0.0);
        assert_eq!(horner(&coefficients, 0.0), -6.0);
        assert_eq!(p.cauchy_bound(), 12.0);
    }
}
