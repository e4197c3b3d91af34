//! Single-pass repair of informal equation notation.
//!
//! The normaliser rewrites what people type into the grammar the engine parses:
//!
//! - implicit multiplication between a digit and a letter (`2x` → `2*x`, `x2` → `x*2`)
//! - `^` exponentiation (`x^2` → `x**2`)
//! - whitespace removal
//! - the split of an equation into its two sides at `=`
//!
//! It is a small state machine over character classes. The only state carried
//! between characters is the class of the previously emitted character, which
//! is what makes the whitespace and double-`=` behaviour below auditable:
//!
//! - Whitespace emits nothing and resets the class, so `2 x` stays `2x` and is
//!   *not* given a multiplication sign.
//! - Every `=` moves the buffer into the left side, so in `x/2 == 90` the second
//!   `=` replaces the left side with the (empty) text between the two signs,
//!   while the right side is still `90`.
//!
//! No engine calls happen here; `normalize` is a pure function of its input.

use std::fmt;

/// The class of a character, as far as implicit multiplication is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Start of a side, or just after whitespace
    None,
    Letter,
    Digit,
    /// Operators, parentheses and any other symbol
    Other,
}

impl CharClass {
    /// Classifies a non-whitespace character.
    pub fn of(c: char) -> Self {
        if c.is_alphabetic() {
            CharClass::Letter
        } else if c.is_numeric() {
            CharClass::Digit
        } else {
            CharClass::Other
        }
    }

    /// Returns true if a multiplication sign belongs between `self` and `next`.
    fn needs_implicit_mul(self, next: CharClass) -> bool {
        matches!(
            (self, next),
            (CharClass::Letter, CharClass::Digit) | (CharClass::Digit, CharClass::Letter)
        )
    }
}

/// What a single input character contributes to the current side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emission {
    /// Whitespace
    Nothing,
    Char(char),
    /// `*` followed by the character
    ImplicitMul(char),
    /// `**` in place of `^`
    Power,
}

/// Transition function of the scanner for every character except `=`.
fn transition(previous: CharClass, c: char) -> (Emission, CharClass) {
    if c.is_whitespace() {
        return (Emission::Nothing, CharClass::None);
    }
    if c == '^' {
        return (Emission::Power, CharClass::Other);
    }
    let class = CharClass::of(c);
    if previous.needs_implicit_mul(class) {
        (Emission::ImplicitMul(c), class)
    } else {
        (Emission::Char(c), class)
    }
}

/// An equation rewritten into engine grammar, split at `=`.
///
/// `right` is present exactly when the input contained `=`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalEquation {
    /// The whole expression, or the left side of an equation
    pub left: String,
    /// The right side of an equation
    pub right: Option<String>,
}

impl CanonicalEquation {
    /// Returns true if the input contained an `=`.
    pub fn has_equality(&self) -> bool {
        self.right.is_some()
    }
}

impl fmt::Display for CanonicalEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Some(right) => write!(f, "{} = {}", self.left, right),
            None => write!(f, "{}", self.left),
        }
    }
}

/// Normalises informal equation text into a `CanonicalEquation`.
///
/// # Arguments
/// * `raw` - The (already validated) equation text, e.g. `"2x + x^2 = 90"`
///
/// # Returns
/// The canonical left side, and the right side if the text contained `=`
///
/// # Example
/// ```
/// use evalexpr_solve::normalize::normalize;
///
/// let canonical = normalize("2x + x^2 = 90");
/// assert_eq!(canonical.left, "2*x+x**2");
/// assert_eq!(canonical.right.as_deref(), Some("90"));
/// ```
pub fn normalize(raw: &str) -> CanonicalEquation {
    let mut buffer = String::with_capacity(raw.len() + raw.len() / 2);
    let mut previous = CharClass::None;
    let mut left = None;

    for c in raw.chars() {
        if c == '=' {
            left = Some(std::mem::take(&mut buffer));
            previous = CharClass::None;
            continue;
        }

        let (emission, next) = transition(previous, c);
        match emission {
            Emission::Nothing => {}
            Emission::Char(c) => buffer.push(c),
            Emission::ImplicitMul(c) => {
                buffer.push('*');
                buffer.push(c);
            }
            Emission::Power => buffer.push_str("**"),
        }
        previous = next;
    }

    match left {
        Some(left) => CanonicalEquation {
            left,
            right: Some(buffer),
        },
        None => CanonicalEquation {
            left: buffer,
            right: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(normalize("2x").left, "2*x");
        assert_eq!(normalize("x2").left, "x*2");
        assert_eq!(normalize("2pi").left, "2*pi");
    }

    #[test]
    fn test_caret_becomes_double_star() {
        assert_eq!(normalize("x^2").left, "x**2");
        // `^` resets the class, so the exponent digit is not multiplied in
        assert_eq!(normalize("2x^2").left, "2*x**2");
    }

    #[test]
    fn test_numbers_are_left_alone() {
        assert_eq!(normalize("2").left, "2");
        assert_eq!(normalize("222").left, "222");
        assert_eq!(normalize("1.5").left, "1.5");
    }

    #[test]
    fn test_mixed_expressions() {
        assert_eq!(normalize("222x + x").left, "222*x+x");
        assert_eq!(normalize("222*x + x").left, "222*x+x");
        assert_eq!(normalize("222*x + x^2").left, "222*x+x**2");
        assert_eq!(normalize("222*x + x**2").left, "222*x+x**2");
        assert_eq!(normalize("222*x + x**2 - sin(x)").left, "222*x+x**2-sin(x)");
        assert_eq!(normalize("sqrt(x)").left, "sqrt(x)");
        assert_eq!(normalize("x/2").left, "x/2");
    }

    #[test]
    fn test_whitespace_blocks_implicit_multiplication() {
        assert_eq!(normalize("2 x").left, "2x");
        assert_eq!(normalize("x 2").left, "x2");
    }

    #[test]
    fn test_letter_runs_stay_together() {
        assert_eq!(normalize("xy").left, "xy");
        assert_eq!(normalize("sinx").left, "sinx");
    }

    #[test]
    fn test_equality_split() {
        let canonical = normalize("x/2 = 90");
        assert!(canonical.has_equality());
        assert_eq!(canonical.left, "x/2");
        assert_eq!(canonical.right.as_deref(), Some("90"));
    }

    #[test]
    fn test_equality_resets_class() {
        // `x=2` must not become `x=*2`
        let canonical = normalize("x=2");
        assert_eq!(canonical.left, "x");
        assert_eq!(canonical.right.as_deref(), Some("2"));
    }

    #[test]
    fn test_double_equals_overwrites_left_side() {
        let canonical = normalize("x/2 == 90");
        assert_eq!(canonical.right.as_deref(), Some("90"));
        assert_eq!(canonical.left, "");
    }

    #[test]
    fn test_no_equality() {
        let canonical = normalize("x**2 - 4");
        assert!(!canonical.has_equality());
        assert_eq!(canonical.right, None);
    }

    #[test]
    fn test_is_pure() {
        let first = normalize("3y^3 = 2y");
        let _ = normalize("x = 1");
        assert_eq!(normalize("3y^3 = 2y"), first);
    }

    #[test]
    fn test_idempotent_on_canonical_text() {
        for text in ["x+1", "2*x**2-sin(x)", "(x-1)*(x+1)/3", "222*x+x**2"] {
            let once = normalize(text);
            assert_eq!(once.left, text);
            assert_eq!(normalize(&once.left), once);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(normalize("2x = 4").to_string(), "2*x = 4");
        assert_eq!(normalize("2x").to_string(), "2*x");
    }
}
