//! Conversion module for transforming evalexpr AST nodes into our internal expression representation.
//!
//! This module is the parser of the solving engine. evalexpr does the tokenising and
//! precedence climbing; the resulting operator tree is then converted into our own
//! `Expr` tree, which keeps integer literals exact and knows nothing of evalexpr's
//! wider grammar (assignments, strings, booleans, tuples).
//!
//! The main entry point is `parse`, which accepts canonical text (powers spelled `**`)
//! and returns a simplified `Expr`. `build_ast` does the recursive conversion.

use evalexpr::{build_operator_tree, Node, Operator};
use num_bigint::BigInt;
use num_rational::BigRational;

use crate::{errors::ConvertError, expr::Expr};

/// Parses canonical text into a simplified expression.
///
/// The canonical grammar spells exponentiation `**`; evalexpr spells it `^`, so the
/// text is translated before it is handed to `build_operator_tree`.
///
/// # Arguments
/// * `text` - Canonical expression text, e.g. `"2*x+x**2"`
///
/// # Returns
/// * `Result<Expr, ConvertError>` - The simplified expression or the reason it was rejected
///
/// # Example
/// ```
/// use evalexpr_solve::convert::parse;
///
/// let expr = parse("2*x+x**2").unwrap();
/// assert_eq!(expr.to_string(), "2*x + x**2");
/// assert_eq!(parse("1/3+1/6").unwrap().to_string(), "1/2");
/// ```
pub fn parse(text: &str) -> Result<Expr, ConvertError> {
    let node: Node = build_operator_tree(&text.replace("**", "^"))?;
    let expr = build_ast(&node)?;
    log::trace!("parsed {text:?} as {expr}");
    Ok(*expr.simplify())
}

/// Converts an evalexpr AST node into our internal expression representation.
///
/// This function recursively traverses the evalexpr AST and builds up our own AST
/// representation. The result is not simplified.
///
/// # Arguments
/// * `node` - The evalexpr AST node to convert
///
/// # Returns
/// * `Result<Expr, ConvertError>` - The converted expression or an error if conversion fails
///
/// # Examples of supported operations:
/// * Basic arithmetic: +, -, *, /
/// * Exponentiation with any exponent: x^2, 2^x, x^(1/3)
/// * Variables: x, y, etc.
/// * Constants: integers (kept exact), decimals, `pi` and `E`
/// * Functions: abs, exp, ln, log (natural), sqrt, sin, cos, tan
pub fn build_ast(node: &Node) -> Result<Expr, ConvertError> {
    match node.operator() {
        // Addition operator - combines multiple children into a series of binary Add expressions
        Operator::Add => {
            let children = expect_children(node, 2)?;
            children
                .iter()
                .skip(1)
                .try_fold(build_ast(&children[0])?, |acc, child| {
                    Ok(Expr::Add(Box::new(acc), Box::new(build_ast(child)?)))
                })
        }
        // Multiplication operator - combines multiple children into a series of binary Mul expressions
        Operator::Mul => {
            let children = expect_children(node, 2)?;
            children.iter().skip(1).try_fold(
                build_ast(&children[0])?,
                |acc, child| -> Result<Expr, ConvertError> {
                    Ok(Expr::Mul(Box::new(acc), Box::new(build_ast(child)?)))
                },
            )
        }
        // Division operator - creates a binary Div expression
        Operator::Div => {
            let children = expect_children(node, 2)?;
            Ok(Expr::Div(
                Box::new(build_ast(&children[0])?),
                Box::new(build_ast(&children[1])?),
            ))
        }
        // Subtraction operator - creates a binary Sub expression
        Operator::Sub => {
            let children = expect_children(node, 2)?;
            Ok(Expr::Sub(
                Box::new(build_ast(&children[0])?),
                Box::new(build_ast(&children[1])?),
            ))
        }
        // Exponentiation - base and exponent can be any expression
        Operator::Exp => {
            let children = expect_children(node, 2)?;
            Ok(Expr::Pow(
                Box::new(build_ast(&children[0])?),
                Box::new(build_ast(&children[1])?),
            ))
        }
        // Constant value - integers stay exact, floats stay floats
        Operator::Const { value } => match value {
            evalexpr::Value::Int(i) => Ok(Expr::Const(BigRational::from_integer(BigInt::from(*i)))),
            evalexpr::Value::Float(f) => Ok(Expr::Float(*f)),
            _ => Err(ConvertError::ConstOperator(format!("{value:?}"))),
        },
        // Identifiers are symbols, apart from the two named constants. evalexpr also
        // accepts digit-led names such as `2x`, which are not symbols.
        Operator::VariableIdentifierRead { identifier } => match identifier.as_str() {
            "pi" => Ok(Expr::Pi),
            "E" => Ok(Expr::E),
            name if !name.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                Err(ConvertError::InvalidIdentifier(name.to_string()))
            }
            name => Ok(Expr::symbol(name)),
        },
        // Negation operator - creates a Neg expression
        Operator::Neg => {
            let children = expect_children(node, 1)?;
            Ok(Expr::Neg(Box::new(build_ast(&children[0])?)))
        }
        // Function call with a single argument
        Operator::FunctionIdentifier { identifier } => {
            let children = expect_children(node, 1)?;
            let argument = Box::new(build_ast(&children[0])?);
            match identifier.as_str() {
                "abs" => Ok(Expr::Abs(argument)),
                "exp" => Ok(Expr::Exp(argument)),
                "ln" | "log" => Ok(Expr::Ln(argument)),
                "sqrt" => Ok(Expr::Sqrt(argument)),
                "sin" => Ok(Expr::Sin(argument)),
                "cos" => Ok(Expr::Cos(argument)),
                "tan" => Ok(Expr::Tan(argument)),
                _ => Err(ConvertError::UnsupportedFunction(identifier.to_string())),
            }
        }
        // Root node (the whole text, or a parenthesised group) - should have exactly one child
        Operator::RootNode => {
            let children = node.children();
            if children.len() == 1 {
                build_ast(&children[0])
            } else {
                Err(ConvertError::RootNode(format!(
                    "expected a single expression, found {}",
                    children.len()
                )))
            }
        }
        // Any other operator is unsupported
        other => Err(ConvertError::UnsupportedOperator(format!("{other:?}"))),
    }
}

/// Returns the node's children, checking there are at least `min` of them.
fn expect_children(node: &Node, min: usize) -> Result<&[Node], ConvertError> {
    let children = node.children();
    if children.len() < min {
        return Err(ConvertError::RootNode(format!(
            "{:?} expects {min} operand(s), found {}",
            node.operator(),
            children.len()
        )));
    }
    Ok(children)
}
