//! Rendering expressions as text.

use crate::expr::Expression;
use std::fmt::{self, Display, Formatter};

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "{}", value),
            Expression::Fraction(numerator, denominator) => {
                write!(f, "{}/{}", numerator, denominator)
            },
            Expression::Symbol(symbol) => write!(f, "{}", symbol),
            Expression::Sum(terms) => write_sum(terms, f),
            Expression::Product(factors) => write_product(factors, f),
            Expression::Power { base, exponent } => {
                write_power(base, exponent, f)
            },
            Expression::Function { function, operand } => {
                write!(f, "{}({})", function, operand)
            },
        }
    }
}

fn write_sum(terms: &[Expression], f: &mut Formatter<'_>) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        match (i, negated(term)) {
            (0, _) => write!(f, "{}", term)?,
            (_, Some(positive @ Expression::Sum(_))) => {
                write!(f, " - ({})", positive)?
            },
            (_, Some(positive)) => write!(f, " - {}", positive)?,
            (_, None) => write!(f, " + {}", term)?,
        }
    }

    Ok(())
}

fn write_product(
    factors: &[Expression],
    f: &mut Formatter<'_>,
) -> fmt::Result {
    let (numerator, denominator): (Vec<_>, Vec<_>) =
        factors.iter().map(split_divisor).partition(|(_, inverted)| !inverted);

    let numerator: Vec<_> = numerator.into_iter().map(|(e, _)| e).collect();
    let denominator: Vec<_> =
        denominator.into_iter().map(|(e, _)| e).collect();

    match numerator.as_slice() {
        [] => write!(f, "1")?,
        // a prefix minus binds tighter than "^", so "-x^2" would be (-x)^2
        [Expression::Number(-1), rest @ ..]
            if !rest.is_empty()
                && !matches!(rest[0], Expression::Power { .. }) =>
        {
            write!(f, "-")?;
            write_factors(rest, f)?;
        },
        all => write_factors(all, f)?,
    }

    match denominator.as_slice() {
        [] => Ok(()),
        [single] if !single.is_compound() => write!(f, " / {}", single),
        several => {
            write!(f, " / (")?;
            write_factors(several, f)?;
            write!(f, ")")
        },
    }
}

fn write_factors(
    factors: &[Expression],
    f: &mut Formatter<'_>,
) -> fmt::Result {
    for (i, factor) in factors.iter().enumerate() {
        if i > 0 {
            write!(f, "*")?;
        }

        if factors.len() > 1 && needs_parens_as_factor(factor) {
            write!(f, "({})", factor)?;
        } else {
            write!(f, "{}", factor)?;
        }
    }

    Ok(())
}

fn write_power(
    base: &Expression,
    exponent: &Expression,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if base.is_atomic() {
        write!(f, "{}", base)?;
    } else {
        write!(f, "({})", base)?;
    }

    match exponent {
        Expression::Number(_) => write!(f, "^{}", exponent),
        e if e.is_atomic() => write!(f, "^{}", e),
        e => write!(f, "^({})", e),
    }
}

/// Turn `x^-n` into `(x^n, true)` so it can be written after a `/`.
fn split_divisor(factor: &Expression) -> (Expression, bool) {
    if let Expression::Power { base, exponent } = factor {
        if let Expression::Number(n) = **exponent {
            if n < 0 {
                return match n.checked_neg() {
                    Some(1) => (Expression::clone(base), true),
                    Some(positive) => {
                        (Expression::clone(base).pow(positive), true)
                    },
                    None => (factor.clone(), false),
                };
            }
        }
    }

    (factor.clone(), false)
}

/// The absolute value of a term with a negative coefficient.
fn negated(term: &Expression) -> Option<Expression> {
    match term {
        Expression::Number(n) if *n < 0 => {
            n.checked_neg().map(Expression::from)
        },
        Expression::Fraction(n, d) if *n < 0 => {
            n.checked_neg().map(|n| Expression::Fraction(n, *d))
        },
        Expression::Product(factors) => match factors.split_first()? {
            (Expression::Number(-1), [single]) => Some(single.clone()),
            (Expression::Number(-1), rest) => {
                Some(Expression::product(rest.to_vec()))
            },
            (head, rest) => {
                let positive = negated(head)?;
                let mut factors = vec![positive];
                factors.extend(rest.iter().cloned());
                Some(Expression::product(factors))
            },
        },
        _ => None,
    }
}

fn needs_parens_as_factor(factor: &Expression) -> bool {
    match factor {
        Expression::Sum(_) | Expression::Fraction(..) => true,
        _ => false,
    }
}

impl Expression {
    fn is_compound(&self) -> bool {
        match self {
            Expression::Sum(_) | Expression::Product(_) => true,
            _ => false,
        }
    }

    fn is_atomic(&self) -> bool {
        match self {
            Expression::Number(n) => *n >= 0,
            Expression::Symbol(_) | Expression::Function { .. } => true,
            _ => false,
        }
    }

    /// Get a [`Display`]-able version of this expression which shows the
    /// structure of the tree instead of conventional notation.
    ///
    /// Use the alternate flag (`{:#}`) to print one node per line.
    pub fn compact(&self) -> Compact<'_> { Compact(self) }
}

/// The bracketed form of an [`Expression`], e.g. `+[x, *[2, y]]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Compact<'a>(pub &'a Expression);

impl<'a> Display for Compact<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write_tree(self.0, 0, f)
        } else {
            write_compact(self.0, f)
        }
    }
}

fn write_compact(expr: &Expression, f: &mut Formatter<'_>) -> fmt::Result {
    match expr {
        Expression::Number(value) => write!(f, "{}", value),
        Expression::Fraction(numerator, denominator) => {
            write!(f, "({}/{})", numerator, denominator)
        },
        Expression::Symbol(symbol) => write!(f, "{}", symbol),
        Expression::Sum(items) | Expression::Product(items) => {
            let op = if let Expression::Sum(_) = expr { "+" } else { "*" };
            write!(f, "{}[", op)?;

            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_compact(item, f)?;
            }

            write!(f, "]")
        },
        Expression::Power { base, exponent } => {
            write!(f, "(")?;
            write_compact(base, f)?;
            write!(f, "^")?;
            write_compact(exponent, f)?;
            write!(f, ")")
        },
        Expression::Function { function, operand } => {
            write!(f, "{}(", function)?;
            write_compact(operand, f)?;
            write!(f, ")")
        },
    }
}

fn write_tree(
    expr: &Expression,
    depth: usize,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    let label = match expr {
        Expression::Sum(_) => String::from("+"),
        Expression::Product(_) => String::from("*"),
        Expression::Power { .. } => String::from("pow"),
        Expression::Function { function, .. } => function.to_string(),
        leaf => Compact(leaf).to_string(),
    };
    writeln!(f, "{:indent$}{}", "", label, indent = depth * 2)?;

    for child in expr.operands() {
        write_tree(child, depth + 1, f)?;
    }

    Ok(())
}
