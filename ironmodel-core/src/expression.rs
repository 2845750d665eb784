//! Parsed constraint expressions.
//!
//! Constraint bodies are stored as raw text while the model is built and are
//! turned into [`Expression`] trees by a constraint parser once every type and
//! service is resolved.

use crate::name::Name;
use std::fmt;

/// Operators of unary and binary expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Logical negation.
    Not,
    /// Logical conjunction.
    And,
    /// Logical disjunction.
    Or,
    /// Equality.
    Equal,
    /// Inequality.
    NotEqual,
    /// Less than.
    LessThan,
    /// Less than or equal.
    LessOrEqual,
    /// Greater than.
    GreaterThan,
    /// Greater than or equal.
    GreaterOrEqual,
}

impl Operator {
    /// Returns the textual symbol of the operator.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::And => "&&",
            Self::Or => "||",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
        }
    }
}

/// Expression tree of a constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value, kept as written.
    Literal(String),
    /// Reference to a method parameter.
    Parameter(Name),
    /// Access to a struct attribute, optionally on a target expression.
    Attribute {
        /// Expression the attribute is read from.
        target: Option<Box<Expression>>,
        /// Accessed attribute.
        attribute: Name,
    },
    /// Unary operation.
    Unary {
        /// Operator.
        operator: Operator,
        /// Operand.
        operand: Box<Expression>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        operator: Operator,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
}

impl Expression {
    /// Renders the expression. Compound sub-expressions are wrapped in
    /// parentheses when `protect` is set.
    #[must_use]
    pub fn render(&self, protect: bool) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Parameter(name) => name.to_string(),
            Self::Attribute { target, attribute } => match target {
                Some(target) => wrap(
                    format!("{}.{}", target.render(true), attribute),
                    protect,
                ),
                None => attribute.to_string(),
            },
            Self::Unary { operator, operand } => {
                wrap(format!("{}{}", operator.symbol(), operand.render(true)), protect)
            }
            Self::Binary {
                operator,
                left,
                right,
            } => wrap(
                format!(
                    "{} {} {}",
                    left.render(true),
                    operator.symbol(),
                    right.render(true)
                ),
                protect,
            ),
        }
    }
}

fn wrap(text: String, protect: bool) -> String {
    if protect { format!("({text})") } else { text }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(target: Option<Expression>, name: &str) -> Expression {
        Expression::Attribute {
            target: target.map(Box::new),
            attribute: Name::from_case(name),
        }
    }

    #[test]
    fn test_render_attribute_without_target() {
        assert_eq!(attribute(None, "name").to_string(), "name");
    }

    #[test]
    fn test_render_nested_attribute_is_protected() {
        let vm = Expression::Parameter(Name::from_case("vm"));
        let expr = attribute(Some(attribute(Some(vm), "cpu")), "cores");
        assert_eq!(expr.to_string(), "(vm.cpu).cores");
        assert_eq!(expr.render(true), "((vm.cpu).cores)");
    }

    #[test]
    fn test_render_binary() {
        let expr = Expression::Binary {
            operator: Operator::Or,
            left: Box::new(Expression::Parameter(Name::from_case("force"))),
            right: Box::new(Expression::Unary {
                operator: Operator::Not,
                operand: Box::new(Expression::Literal("true".to_string())),
            }),
        };
        assert_eq!(expr.to_string(), "force || (!true)");
    }
}
