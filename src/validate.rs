//! Allow-list check run before any text reaches the normaliser or the engine.
//!
//! evalexpr accepts a much wider grammar than equations need (assignments, strings,
//! chained statements, tuples). Rejecting every character outside a small set keeps
//! those constructs out of the parser entirely.

use crate::errors::EquationError;

/// Operators and punctuation accepted in addition to letters, digits and whitespace.
pub const ALLOWED_SYMBOLS: &[char] = &['+', '-', '*', '/', '^', '(', ')', '=', '.'];

/// Returns whether a single character may appear in an equation.
pub fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || ALLOWED_SYMBOLS.contains(&c)
}

/// Validates raw input and returns it unchanged.
///
/// The check is all-or-nothing: the error does not say which character was
/// rejected.
///
/// # Errors
/// - `EquationError::EmptyEquation` if the input is empty or only whitespace
/// - `EquationError::InvalidCharacter` if any character is outside the allow-list
///
/// # Example
/// ```
/// use evalexpr_solve::validate::validate;
///
/// assert_eq!(validate("2x + 1 = 5").unwrap(), "2x + 1 = 5");
/// assert!(validate("x; y").is_err());
/// ```
pub fn validate(raw: &str) -> Result<&str, EquationError> {
    if raw.trim().is_empty() {
        return Err(EquationError::EmptyEquation);
    }
    if raw.chars().all(is_allowed) {
        Ok(raw)
    } else {
        Err(EquationError::InvalidCharacter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_informal_notation() {
        for input in ["2x + x^2 = 90", "x/2 = 90", "sqrt(x) - 1.5", "222*x + x**2 - sin(x)"] {
            assert_eq!(validate(input), Ok(input));
        }
    }

    #[test]
    fn test_rejects_characters_outside_allow_list() {
        for input in ["x;y", "x @ 2", "a, b", "x = \"1\"", "x % 2", "x_1", "2 < x", "{x}"] {
            assert_eq!(validate(input), Err(EquationError::InvalidCharacter), "{input}");
        }
    }

    #[test]
    fn test_rejects_non_ascii_letters() {
        assert_eq!(validate("2π"), Err(EquationError::InvalidCharacter));
    }

    #[test]
    fn test_rejects_blank_input() {
        assert_eq!(validate(""), Err(EquationError::EmptyEquation));
        assert_eq!(validate("  \t"), Err(EquationError::EmptyEquation));
    }
}
