//! The canonical ordering used to sort the operands of sums and products.

use crate::expr::Expression;
use std::{cmp::Ordering, slice};

impl Expression {
    /// Does this expression come before `other` in canonical order?
    ///
    /// This is a strict total order over simplified expressions. It only has
    /// mathematical meaning for constants, which are ordered by value. For
    /// everything else it is an arbitrary but stable way of deciding where
    /// an operand goes in a sorted sum or product.
    pub fn precedes(&self, other: &Expression) -> bool {
        use Expression::*;

        if let (Some(left), Some(right)) =
            (self.as_rational(), other.as_rational())
        {
            return compare_rationals(left, right) == Ordering::Less;
        }

        match (self, other) {
            (Number(_), _) | (Fraction(..), _) => true,
            (_, Number(_)) | (_, Fraction(..)) => false,

            (Symbol(left), Symbol(right)) => left.name() < right.name(),
            (Symbol(symbol), Function { function, .. }) => {
                symbol.name() <= function.name()
            },
            (Function { function, .. }, Symbol(symbol)) => {
                function.name() < symbol.name()
            },
            (
                Function {
                    function: left,
                    operand: left_operand,
                },
                Function {
                    function: right,
                    operand: right_operand,
                },
            ) => {
                if left != right {
                    left.name() < right.name()
                } else {
                    left_operand.precedes(right_operand)
                }
            },

            (Sum(left), Sum(right)) | (Product(left), Product(right)) => {
                compare_lists(left, right)
            },
            (Sum(terms), Symbol(_)) | (Sum(terms), Function { .. }) => {
                compare_lists(terms, slice::from_ref(other))
            },
            (Product(factors), Power { .. })
            | (Product(factors), Sum(_))
            | (Product(factors), Symbol(_))
            | (Product(factors), Function { .. }) => {
                compare_lists(factors, slice::from_ref(other))
            },

            (
                Power {
                    base: left_base,
                    exponent: left_exponent,
                },
                Power {
                    base: right_base,
                    exponent: right_exponent,
                },
            ) => {
                if left_base != right_base {
                    left_base.precedes(right_base)
                } else {
                    left_exponent.precedes(right_exponent)
                }
            },
            // compare as if the other operand were raised to the power of 1
            (Power { base, exponent }, Sum(_))
            | (Power { base, exponent }, Symbol(_))
            | (Power { base, exponent }, Function { .. }) => {
                if **base != *other {
                    base.precedes(other)
                } else {
                    exponent.precedes(&Expression::ONE)
                }
            },

            _ => !other.precedes(self),
        }
    }
}

/// Compare two operand lists starting from their last elements.
///
/// The first differing pair decides. When one list is a trailing run of the
/// other, the shorter list comes first.
fn compare_lists(left: &[Expression], right: &[Expression]) -> bool {
    for (l, r) in left.iter().rev().zip(right.iter().rev()) {
        if l != r {
            return l.precedes(r);
        }
    }

    left.len() < right.len()
}

fn compare_rationals(left: (i64, i64), right: (i64, i64)) -> Ordering {
    let (left_numerator, left_denominator) = normalize_sign(left);
    let (right_numerator, right_denominator) = normalize_sign(right);

    (left_numerator * right_denominator)
        .cmp(&(right_numerator * left_denominator))
}

fn normalize_sign((numerator, denominator): (i64, i64)) -> (i128, i128) {
    let numerator = i128::from(numerator);
    let denominator = i128::from(denominator);

    if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Builtin;

    fn x() -> Expression { Expression::symbol("x") }
    fn y() -> Expression { Expression::symbol("y") }
    fn n(value: i64) -> Expression { Expression::Number(value) }

    #[test]
    fn canonical_order_of_pairs() {
        let sin_x = Expression::function(Builtin::Sine, x());
        let inputs = vec![
            (n(1), n(2)),
            (n(-3), Expression::Fraction(-1, 2)),
            (Expression::Fraction(1, 3), Expression::Fraction(1, 2)),
            (Expression::Fraction(1, 2), n(1)),
            (n(100), x()),
            (Expression::Fraction(7, 2), Expression::E),
            (x(), y()),
            (Expression::E, Expression::PI),
            (Expression::PI, x()),
            (sin_x.clone(), x()),
            (x(), Expression::function(Builtin::Cosine, y()).pow(2) * y()),
            (
                Expression::function(Builtin::Cosine, x()),
                Expression::function(Builtin::Sine, x()),
            ),
            (sin_x.clone(), Expression::function(Builtin::Sine, y())),
            (x().pow(2), x().pow(3)),
            (x().pow(3), y().pow(2)),
            (x(), x().pow(2)),
            (x().pow(2), y()),
            (n(2) * x(), n(3) * x()),
            (x() * y(), y().pow(2)),
            (x() + y(), x() + y().pow(2)),
            (y(), x() + y()),
            (x() * y(), Expression::product(vec![n(3), x(), y()])),
        ];

        for (left, right) in inputs {
            assert!(left.precedes(&right), "{:?} < {:?}", left, right);
            assert!(!right.precedes(&left), "{:?} > {:?}", right, left);
        }
    }

    #[test]
    fn nothing_precedes_itself() {
        let inputs = vec![
            n(5),
            Expression::Fraction(2, 3),
            x(),
            Expression::UNDEFINED,
            x().pow(2),
            x() + y(),
            x() * y(),
            Expression::function(Builtin::Tangent, x() + y()),
        ];

        for expr in inputs {
            assert!(!expr.precedes(&expr), "{:?}", expr);
        }
    }

    #[test]
    fn constants_are_compared_exactly() {
        // 1/3 and 1/2 both truncate to 0 under integer division
        let third = Expression::Fraction(1, 3);
        let half = Expression::Fraction(1, 2);
        let negative_half = Expression::Fraction(1, -2);

        assert!(third.precedes(&half));
        assert!(negative_half.precedes(&third));
        assert!(!n(i64::MAX).precedes(&Expression::Fraction(i64::MAX, 2)));
    }

    #[test]
    fn the_shorter_list_comes_first_when_tails_match() {
        let short = [x()];
        let long = [y(), x()];

        assert!(compare_lists(&short, &long));
        assert!(!compare_lists(&long, &short));
        assert!(!compare_lists(&long, &long));
    }
}
