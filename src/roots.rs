//! Numeric real-root search for functions of one variable.
//!
//! The search lays evenly spaced samples over a window and refines every sign
//! change by bisection. Sign changes caused by a pole (as in `tan(x)` or `1/x`)
//! are rejected because the function grows instead of vanishing at the refined
//! point. Roots where the function only touches zero (as in `x**2`) have no sign
//! change; they are found from sign changes of the derivative instead.
//!
//! Polynomials do not need sampling. `polynomial_roots` reduces the polynomial to
//! its square-free part, finds the critical points recursively from the derivative,
//! and bisects each monotone piece between them, so no real root is missed however
//! close it lies to another.

use std::time::{Duration, Instant};

use crate::config::SolverConfig;
use crate::errors::SolveError;
use crate::expr::ratio_to_f64;
use crate::poly::{horner, Polynomial};

/// How often, in loop iterations, the deadline is checked.
const DEADLINE_STRIDE: usize = 64;

/// Largest `|f(c)|` accepted at a critical point `c` for it to count as a touching root.
const TOUCH_TOLERANCE: f64 = 1e-9;

/// Absolute values below this are reported as exactly zero.
const ZERO_SNAP: f64 = 1e-10;

/// A point in time after which a solve call gives up.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Starts the clock. `None` never expires.
    pub fn new(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    /// Fails with `SolveError::Timeout` once the limit has passed.
    pub fn check(&self) -> Result<(), SolveError> {
        match self.limit {
            Some(limit) if self.start.elapsed() > limit => {
                log::warn!("solve deadline of {limit:?} exceeded");
                Err(SolveError::Timeout(limit))
            }
            _ => Ok(()),
        }
    }
}

/// Finds the real roots of `f` in `[lo, hi]`.
///
/// # Arguments
/// * `f` - The function; NaN and infinities mark points outside its domain
/// * `df` - Its derivative, used to find roots without a sign change
/// * `lo`, `hi` - The search window
/// * `config` - Sample count, bisection tolerance and iteration cap
/// * `deadline` - Checked periodically while sampling
///
/// # Returns
/// Roots in ascending order, with roots closer than the merge distance combined
///
/// # Errors
/// `SolveError::Timeout` if the deadline passes during the search
pub fn find_real_roots<F, D>(
    f: F,
    df: D,
    lo: f64,
    hi: f64,
    config: &SolverConfig,
    deadline: &Deadline,
) -> Result<Vec<f64>, SolveError>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let samples = config.samples.max(2);
    let step = (hi - lo) / (samples - 1) as f64;
    let mut roots = Vec::new();

    let mut prev_x = lo;
    let mut prev_f = f(prev_x);
    let mut prev_df = df(prev_x);
    if prev_f == 0.0 {
        roots.push(prev_x);
    }

    for i in 1..samples {
        if i % DEADLINE_STRIDE == 0 {
            deadline.check()?;
        }
        let x = lo + i as f64 * step;
        let fx = f(x);
        let dfx = df(x);

        if fx == 0.0 {
            roots.push(x);
        } else if prev_f.is_finite() && fx.is_finite() && prev_f * fx < 0.0 {
            let root = bisect(&f, prev_x, prev_f, x, config);
            let at_root = f(root).abs();
            if at_root <= prev_f.abs().min(fx.abs()) {
                log::trace!("sign change between {prev_x} and {x}, root {root}");
                roots.push(root);
            } else {
                log::trace!("rejected pole near {root}");
            }
        } else if prev_df.is_finite() && dfx.is_finite() && prev_df * dfx < 0.0 {
            let critical = bisect(&df, prev_x, prev_df, x, config);
            if f(critical).abs() <= TOUCH_TOLERANCE {
                log::trace!("touching root at {critical}");
                roots.push(critical);
            }
        }

        prev_x = x;
        prev_f = fx;
        prev_df = dfx;
    }

    Ok(merge_roots(roots, config.tolerance.sqrt()))
}

/// Finds every real root of a polynomial.
///
/// # Arguments
/// * `poly` - A non-zero polynomial
/// * `config` - Bisection tolerance and iteration cap
/// * `deadline` - Checked at every level of the recursion
///
/// # Returns
/// The distinct real roots in ascending order; repeated roots are reported once
///
/// # Errors
/// `SolveError::Timeout` if the deadline passes
///
/// # Example
/// ```
/// use evalexpr_solve::convert::parse;
/// use evalexpr_solve::poly::Polynomial;
/// use evalexpr_solve::roots::{polynomial_roots, Deadline};
/// use evalexpr_solve::SolverConfig;
///
/// let p = Polynomial::from_expr(&parse("(x-1)*(x-1.01)*(x-1000)").unwrap(), "x").unwrap();
/// let roots = polynomial_roots(&p, &SolverConfig::default(), &Deadline::new(None)).unwrap();
/// assert_eq!(roots.len(), 3);
/// ```
pub fn polynomial_roots(
    poly: &Polynomial,
    config: &SolverConfig,
    deadline: &Deadline,
) -> Result<Vec<f64>, SolveError> {
    let poly = poly.square_free(deadline)?;
    let roots = isolate(&poly, poly.cauchy_bound(), config, deadline)?;
    Ok(merge_roots(roots, 0.0))
}

/// Roots of a square-free polynomial inside `(-bound, bound)`.
///
/// Between two consecutive critical points the polynomial is monotone, so each such
/// piece holds at most one root, found by a sign change at its ends.
fn isolate(
    poly: &Polynomial,
    bound: f64,
    config: &SolverConfig,
    deadline: &Deadline,
) -> Result<Vec<f64>, SolveError> {
    deadline.check()?;
    match poly.degree() {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![ratio_to_f64(&(-poly.coefficient(0) / poly.coefficient(1)))]),
        _ => {}
    }

    let slope = poly.derivative().square_free(deadline)?;
    let critical = isolate(&slope, bound, config, deadline)?;
    let mut points = vec![-bound];
    points.extend(critical.into_iter().filter(|c| c.abs() < bound));
    points.push(bound);

    let coefficients = poly.to_f64_coefficients();
    let f = |x: f64| horner(&coefficients, x);
    let mut roots = Vec::new();
    for piece in points.windows(2) {
        let (a, b) = (piece[0], piece[1]);
        let (fa, fb) = (f(a), f(b));
        if fa == 0.0 {
            roots.push(a);
        } else if fb != 0.0 && fa.signum() != fb.signum() {
            roots.push(bisect(&f, a, fa, b, config));
        }
    }
    log::trace!("{} root(s) of a degree {} polynomial", roots.len(), poly.degree());
    Ok(roots)
}

/// Refines a sign change of `f` on `[a, b]` by bisection.
fn bisect<F>(f: &F, mut a: f64, mut fa: f64, mut b: f64, config: &SolverConfig) -> f64
where
    F: Fn(f64) -> f64,
{
    for _ in 0..config.max_iterations {
        if (b - a).abs() <= config.tolerance {
            break;
        }
        let mid = 0.5 * (a + b);
        let fm = f(mid);
        if fm == 0.0 {
            return mid;
        }
        if fm.signum() == fa.signum() {
            a = mid;
            fa = fm;
        } else {
            b = mid;
        }
    }
    0.5 * (a + b)
}

/// Sorts roots, snaps near-zero values to zero and merges roots closer than `distance`.
fn merge_roots(mut roots: Vec<f64>, distance: f64) -> Vec<f64> {
    for root in roots.iter_mut() {
        if root.abs() < ZERO_SNAP {
            *root = 0.0;
        }
    }
    roots.sort_by(f64::total_cmp);
    roots.dedup_by(|later, earlier| (*later - *earlier).abs() <= distance);
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<F, D>(f: F, df: D) -> Vec<f64>
    where
        F: Fn(f64) -> f64,
        D: Fn(f64) -> f64,
    {
        let config = SolverConfig::default().with_window(-10.0, 10.0);
        find_real_roots(f, df, -10.0, 10.0, &config, &Deadline::new(None)).unwrap()
    }

    fn assert_roots(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-8, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_simple_roots() {
        let roots = find(|x| x * x - 2.0, |x| 2.0 * x);
        assert_roots(&roots, &[-(2f64.sqrt()), 2f64.sqrt()]);
    }

    #[test]
    fn test_touching_root() {
        let roots = find(|x| (x - 1.5) * (x - 1.5), |x| 2.0 * (x - 1.5));
        assert_roots(&roots, &[1.5]);
    }

    #[test]
    fn test_rejects_poles() {
        let roots = find(|x| 1.0 / (x - 0.3), |x| -1.0 / ((x - 0.3) * (x - 0.3)));
        assert!(roots.is_empty(), "{roots:?}");
    }

    #[test]
    fn test_skips_points_outside_domain() {
        let roots = find(|x| x.ln(), |x| 1.0 / x);
        assert_roots(&roots, &[1.0]);
    }

    #[test]
    fn test_no_roots() {
        assert!(find(|x| x * x + 1.0, |x| 2.0 * x).is_empty());
    }

    #[test]
    fn test_zero_is_snapped() {
        let roots = find(|x| x * x * x, |x| 3.0 * x * x);
        assert_eq!(roots, vec![0.0]);
    }

    fn poly_roots(text: &str) -> Vec<f64> {
        let poly = Polynomial::from_expr(&crate::convert::parse(text).unwrap(), "x").unwrap();
        polynomial_roots(&poly, &SolverConfig::default(), &Deadline::new(None)).unwrap()
    }

    #[test]
    fn test_polynomial_roots_close_together() {
        // 1 and 1.01 lie within one sample step of a window spanning the Cauchy bound
        let roots = poly_roots("(100*x-100)*(100*x-101)*(x-1000)");
        assert_roots(&roots, &[1.0, 1.01, 1000.0]);

        let roots = poly_roots("(x-1)*(x-1.000001)*(x+3)");
        assert_roots(&roots, &[-3.0, 1.0, 1.000001]);
    }

    #[test]
    fn test_polynomial_repeated_roots() {
        assert_roots(&poly_roots("(x-2)**2*(x+1)**3*(x-5)"), &[-1.0, 2.0, 5.0]);
        assert!(poly_roots("x**4 + 1").is_empty());
    }

    #[test]
    fn test_polynomial_roots_of_high_degree() {
        let roots = poly_roots("x**5 - x");
        assert_roots(&roots, &[-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_deadline() {
        let deadline = Deadline::new(Some(Duration::ZERO));
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(deadline.check(), Err(SolveError::Timeout(_))));
        assert!(Deadline::new(None).check().is_ok());
    }
}
