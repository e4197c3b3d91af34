//! Solving equations for their unknowns.
//!
//! The solver reads an `Expression` as `residual = 0` and picks a method by the
//! shape of the residual:
//!
//! - One unknown, polynomial with rational coefficients: closed form up to degree 2,
//!   with the root `0` split off first; above that, every real root is isolated between
//!   the critical points and refined by bisection.
//! - One unknown, linear but with irrational coefficients (`pi*x = 1`): isolated symbolically.
//! - One unknown, anything else: numeric search over the configured window.
//! - Several unknowns: the first unknown the residual is linear in is isolated,
//!   giving a value in terms of the others.
//!
//! Only real roots are reported. Solutions come back sorted ascending by value
//! with near-duplicates merged. Candidates at which the equation has no real value
//! (`x = -4` for `sqrt(x)**2 = -4`) are dropped.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::builder::Expression;
use crate::config::SolverConfig;
use crate::errors::SolveError;
use crate::expr::{self, exact_root, Expr};
use crate::poly::Polynomial;
use crate::roots::{find_real_roots, polynomial_roots, Deadline};
use crate::types::{FreeVariableSet, Solution, SolutionSet};

/// Largest factor tried when pulling squares out of a discriminant.
const SQUARE_FACTOR_LIMIT: u32 = 1000;

/// Solves `expression` for `unknowns`.
///
/// Only real solutions are returned: `x**2 + 1 = 0` has none and yields an empty set,
/// where a complex-capable solver would report `x = -i` and `x = i`.
///
/// # Arguments
/// * `expression` - A plain expression (read as `f = 0`) or an equality
/// * `unknowns` - The symbols to solve for; normally the expression's free variables
/// * `config` - Search window, tolerances, result cap and deadline
///
/// # Returns
/// One mapping per solution. An empty set means there is no real solution.
///
/// # Errors
/// - `SolveError::NoUnknowns` if `unknowns` is empty
/// - `SolveError::Unsupported` if no unknown can be isolated
/// - `SolveError::Timeout` if the deadline passes
/// - `SolveError::Evaluation` if a solution has no finite value
///
/// # Example
/// ```
/// use evalexpr_solve::builder::build_expression;
/// use evalexpr_solve::normalize::normalize;
/// use evalexpr_solve::solve::solve;
/// use evalexpr_solve::SolverConfig;
///
/// let expression = build_expression(&normalize("x^2 = 9")).unwrap();
/// let solutions = solve(&expression, &expression.free_variables(), &SolverConfig::default()).unwrap();
/// assert_eq!(solutions.len(), 2);
/// assert_eq!(solutions[0]["x"].to_string(), "-3");
/// ```
pub fn solve(
    expression: &Expression,
    unknowns: &FreeVariableSet,
    config: &SolverConfig,
) -> Result<SolutionSet, SolveError> {
    let deadline = Deadline::new(config.timeout);
    let residual = *expression.residual().simplify();
    log::debug!("solving {residual} = 0 for {unknowns:?}");

    let mut names = unknowns.iter();
    let (Some(var), None) = (names.next(), names.next()) else {
        if unknowns.is_empty() {
            return Err(SolveError::NoUnknowns);
        }
        return isolate_any(&residual, unknowns).map(|solution| vec![solution]);
    };

    let values = solve_univariate(&residual, var, config, &deadline)?;
    let values = keep_real(&residual, var, values);
    let values = order_and_cap(values, config)?;
    log::debug!("found {} solution(s) for {var}", values.len());
    Ok(values
        .into_iter()
        .map(|value| Solution::from([(var.clone(), value)]))
        .collect())
}

/// Solves `residual = 0` for a single unknown.
fn solve_univariate(
    residual: &Expr,
    var: &str,
    config: &SolverConfig,
    deadline: &Deadline,
) -> Result<Vec<Expr>, SolveError> {
    if let Some(poly) = Polynomial::from_expr(residual, var) {
        log::debug!("{residual} is a polynomial of degree {} in {var}", poly.degree());
        return solve_polynomial(&poly, config, deadline);
    }
    if let Some(value) = isolate_linear(residual, var) {
        log::debug!("{residual} is linear in {var}");
        return Ok(vec![value]);
    }

    log::debug!(
        "searching [{}, {}] numerically for roots of {residual}",
        config.search_min,
        config.search_max
    );
    let derivative = residual.derivative(var).simplify();
    let roots = find_real_roots(
        |x| residual.eval_at(var, x),
        |x| derivative.eval_at(var, x),
        config.search_min,
        config.search_max,
        config,
        deadline,
    )?;
    Ok(roots.into_iter().map(Expr::Float).collect())
}

/// Real roots of a polynomial: exact up to degree 2, numeric above.
fn solve_polynomial(
    poly: &Polynomial,
    config: &SolverConfig,
    deadline: &Deadline,
) -> Result<Vec<Expr>, SolveError> {
    if poly.is_zero() {
        // 0 = 0 holds for every value; no finite list of roots describes that
        return Ok(Vec::new());
    }

    let mut roots = Vec::new();
    let zeros = poly.trailing_zeros();
    if zeros > 0 {
        roots.push(Expr::integer(0));
    }
    let poly = poly.deflate(zeros);

    match poly.degree() {
        0 => {}
        1 => roots.push(linear_root(&poly)),
        2 => roots.extend(quadratic_roots(&poly)),
        _ => {
            let found = polynomial_roots(&poly, config, deadline)?;
            roots.extend(found.into_iter().map(Expr::Float));
        }
    }
    Ok(roots)
}

/// `a*x + b = 0` → `x = -b/a`
fn linear_root(poly: &Polynomial) -> Expr {
    Expr::Const(-poly.coefficient(0) / poly.coefficient(1))
}

/// Real roots of `a*x**2 + b*x + c`, rational when the discriminant is a perfect square.
fn quadratic_roots(poly: &Polynomial) -> Vec<Expr> {
    let (c, b, a) = (poly.coefficient(0), poly.coefficient(1), poly.coefficient(2));
    let two = BigRational::from_integer(2.into());
    let four = BigRational::from_integer(4.into());
    let discriminant = &b * &b - four * &a * &c;
    let two_a = two * &a;

    if discriminant.is_negative() {
        return Vec::new();
    }
    if discriminant.is_zero() {
        return vec![Expr::Const(-b / two_a)];
    }
    if let Some(root) = exact_root(&discriminant, 2) {
        return vec![
            Expr::Const((-&b - &root) / &two_a),
            Expr::Const((-&b + root) / &two_a),
        ];
    }

    // sqrt(n/d) = sqrt(n*d)/d = (outside/d) * sqrt(inside)
    let (outside, inside) = split_square(&(discriminant.numer() * discriminant.denom()));
    let scale = BigRational::new(outside, discriminant.denom().clone()) / &two_a;
    let center = Box::new(Expr::Const(-b / &two_a));
    let offset = expr::mul(
        Box::new(Expr::Const(scale)),
        Box::new(Expr::Sqrt(Box::new(Expr::Const(BigRational::from_integer(inside))))),
    );
    vec![
        *expr::sub(center.clone(), offset.clone()),
        *expr::add(center, offset),
    ]
}

/// Writes a positive integer `m` as `outside**2 * inside`, pulling out the squares
/// of small factors and the case where the rest is itself a square.
fn split_square(m: &BigInt) -> (BigInt, BigInt) {
    let mut outside = BigInt::one();
    let mut inside = m.clone();
    for p in 2..=SQUARE_FACTOR_LIMIT {
        let p = BigInt::from(p);
        let square = &p * &p;
        if square > inside {
            break;
        }
        while (&inside % &square).is_zero() {
            inside /= &square;
            outside *= &p;
        }
    }
    let root = inside.sqrt();
    if &root * &root == inside {
        outside *= root;
        inside = BigInt::one();
    }
    (outside, inside)
}

/// Drops candidates at which the residual has no real value.
///
/// Simplification may lose the domain of a function (`sqrt(x)**2` behaves like `x` for
/// every `x >= 0`), so each value is substituted back exactly and checked.
fn keep_real(residual: &Expr, var: &str, values: Vec<Expr>) -> Vec<Expr> {
    values
        .into_iter()
        .filter(|value| {
            let real = residual.substitute(var, value).simplify().is_real();
            if !real {
                log::debug!("dropped {var} = {value}: outside the domain");
            }
            real
        })
        .collect()
}

/// Isolates `var` if the residual is linear in it.
///
/// The residual is linear in `var` when its derivative no longer contains `var`;
/// then `residual = d*var + rest` with `rest = residual(var = 0)`.
fn isolate_linear(residual: &Expr, var: &str) -> Option<Expr> {
    let slope = residual.derivative(var).simplify();
    if slope.contains_symbol(var) || slope.is_zero() {
        return None;
    }
    let rest = residual.substitute(var, &Expr::integer(0)).simplify();
    Some(*expr::neg(expr::div(rest, slope)))
}

/// Isolates the first unknown, in sorted order, that the residual is linear in.
fn isolate_any(residual: &Expr, unknowns: &FreeVariableSet) -> Result<Solution, SolveError> {
    unknowns
        .iter()
        .find_map(|var| {
            isolate_linear(residual, var).map(|value| {
                log::debug!("isolated {var} = {value}");
                Solution::from([(var.clone(), value)])
            })
        })
        .ok_or_else(|| SolveError::Unsupported(format!("{residual} = 0")))
}

/// Sorts values ascending, merges near-duplicates and keeps at most
/// `config.max_solutions` of them, preferring those closest to zero.
fn order_and_cap(values: Vec<Expr>, config: &SolverConfig) -> Result<Vec<Expr>, SolveError> {
    let mut keyed = values
        .into_iter()
        .map(|value| Ok((value.evaluate()?, value)))
        .collect::<Result<Vec<(f64, Expr)>, SolveError>>()?;
    keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    let merge_distance = config.tolerance.sqrt();
    keyed.dedup_by(|(later, _), (earlier, _)| (*later - *earlier).abs() <= merge_distance);

    if keyed.len() > config.max_solutions {
        log::warn!(
            "keeping {} of {} solutions closest to zero",
            config.max_solutions,
            keyed.len()
        );
        keyed.sort_by(|(a, _), (b, _)| a.abs().total_cmp(&b.abs()));
        keyed.truncate(config.max_solutions);
        keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    }
    Ok(keyed.into_iter().map(|(_, value)| value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_expression;
    use crate::normalize::normalize;
    use std::time::Duration;

    fn solve_text(text: &str) -> Result<SolutionSet, SolveError> {
        solve_with(text, &SolverConfig::default())
    }

    fn solve_with(text: &str, config: &SolverConfig) -> Result<SolutionSet, SolveError> {
        let expression = build_expression(&normalize(text)).unwrap();
        solve(&expression, &expression.free_variables(), config)
    }

    fn values(solutions: &SolutionSet, var: &str) -> Vec<String> {
        solutions.iter().map(|s| s[var].to_string()).collect()
    }

    fn numeric(solutions: &SolutionSet, var: &str) -> Vec<f64> {
        solutions.iter().map(|s| s[var].evaluate().unwrap()).collect()
    }

    #[test]
    fn test_linear() {
        assert_eq!(values(&solve_text("x + 1 = 5").unwrap(), "x"), ["4"]);
        assert_eq!(values(&solve_text("x/2 = 90").unwrap(), "x"), ["180"]);
        assert_eq!(values(&solve_text("3x = 1").unwrap(), "x"), ["1/3"]);
    }

    #[test]
    fn test_quadratic_rational_roots() {
        assert_eq!(values(&solve_text("x**2 - 4").unwrap(), "x"), ["-2", "2"]);
        assert_eq!(values(&solve_text("2x + x^2 = 90").unwrap(), "x").len(), 2);
    }

    #[test]
    fn test_quadratic_irrational_roots() {
        let solutions = solve_text("x^2 = 2").unwrap();
        assert_eq!(values(&solutions, "x"), ["-sqrt(2)", "sqrt(2)"]);
        let roots = numeric(&solutions, "x");
        assert!((roots[1] - 2f64.sqrt()).abs() < 1e-12);

        // Square factors leave the radical: sqrt(32) = 4*sqrt(2), sqrt(364) = 2*sqrt(91)
        assert_eq!(values(&solve_text("x^2 = 8").unwrap(), "x"), ["-2*sqrt(2)", "2*sqrt(2)"]);
        assert_eq!(
            values(&solve_text("2x + x^2 = 90").unwrap(), "x"),
            ["-1 - sqrt(91)", "sqrt(91) - 1"]
        );
        // sqrt(12)/6 = sqrt(3)/3
        assert_eq!(values(&solve_text("3x^2 = 1").unwrap(), "x"), ["-sqrt(3)/3", "sqrt(3)/3"]);
    }

    #[test]
    fn test_split_square() {
        let split = |m: i64| split_square(&BigInt::from(m));
        assert_eq!(split(32), (BigInt::from(4), BigInt::from(2)));
        assert_eq!(split(91), (BigInt::from(1), BigInt::from(91)));
        // 1009 is prime and above the trial limit; its square is found only when nothing else remains
        assert_eq!(split(1009 * 1009 * 3), (BigInt::from(1), BigInt::from(1009 * 1009 * 3)));
        assert_eq!(split(1009 * 1009), (BigInt::from(1009), BigInt::from(1)));
    }

    #[test]
    fn test_double_and_complex_roots() {
        assert_eq!(values(&solve_text("x^2 - 2x + 1").unwrap(), "x"), ["1"]);
        assert!(solve_text("x^2 + 1").unwrap().is_empty());
    }

    #[test]
    fn test_cubic() {
        let roots = numeric(&solve_text("x^3 - 6x^2 + 11x - 6").unwrap(), "x");
        assert_eq!(roots.len(), 3);
        for (root, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((root - expected).abs() < 1e-8, "{roots:?}");
        }
    }

    #[test]
    fn test_close_polynomial_roots() {
        let roots = numeric(&solve_text("(100x-100)*(100x-101)*(x-1000)").unwrap(), "x");
        assert_eq!(roots.len(), 3, "{roots:?}");
        for (root, expected) in roots.iter().zip([1.0, 1.01, 1000.0]) {
            assert!((root - expected).abs() < 1e-8, "{roots:?}");
        }
    }

    #[test]
    fn test_solutions_outside_the_domain_are_dropped() {
        assert!(solve_text("sqrt(x)**2 = -4").unwrap().is_empty());
        assert_eq!(values(&solve_text("sqrt(x)**2 = 4").unwrap(), "x"), ["4"]);
    }

    #[test]
    fn test_zero_root_is_split_off() {
        assert_eq!(values(&solve_text("x^3 = 4x").unwrap(), "x"), ["-2", "0", "2"]);
    }

    #[test]
    fn test_transcendental() {
        let roots = numeric(&solve_text("exp(x) = 2").unwrap(), "x");
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 2f64.ln()).abs() < 1e-8);

        let roots = numeric(&solve_text("sqrt(x) - 3").unwrap(), "x");
        assert_eq!(roots.len(), 1);
        assert!((roots[0] - 9.0).abs() < 1e-8);
    }

    #[test]
    fn test_irrational_linear_coefficient() {
        let roots = numeric(&solve_text("pi*x = 1000").unwrap(), "x");
        assert!((roots[0] - 1000.0 / std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn test_several_unknowns() {
        let solutions = solve_text("x + y = 4").unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0]["x"].to_string(), "4 - y");

        let solutions = solve_text("x**2 + y = 1").unwrap();
        assert_eq!(solutions[0]["y"].to_string(), "1 - x**2");
    }

    #[test]
    fn test_unsupported_system() {
        assert!(matches!(
            solve_text("x**2 + y**2 = 1"),
            Err(SolveError::Unsupported(_))
        ));
    }

    #[test]
    fn test_no_unknowns() {
        let expression = build_expression(&normalize("1 = 1")).unwrap();
        assert!(matches!(
            solve(&expression, &FreeVariableSet::new(), &SolverConfig::default()),
            Err(SolveError::NoUnknowns)
        ));
    }

    #[test]
    fn test_many_roots_are_capped() {
        let config = SolverConfig::default().with_max_solutions(3);
        let roots = numeric(&solve_with("sin(x)", &config).unwrap(), "x");
        assert_eq!(roots.len(), 3);
        let pi = std::f64::consts::PI;
        for (root, expected) in roots.iter().zip([-pi, 0.0, pi]) {
            assert!((root - expected).abs() < 1e-8, "{roots:?}");
        }
    }

    #[test]
    fn test_timeout() {
        let config = SolverConfig::default()
            .with_samples(5_000_000)
            .with_timeout(Some(Duration::from_millis(1)));
        assert!(matches!(
            solve_with("sin(x) = x/50", &config),
            Err(SolveError::Timeout(_))
        ));
    }
}
