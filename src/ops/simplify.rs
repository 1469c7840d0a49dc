//! Automatic simplification into canonical form.
//!
//! A simplified expression satisfies a handful of invariants:
//!
//! - sums never directly contain sums, and products never contain products
//! - the operands of sums and products are sorted by
//!   [`Expression::precedes()`] and no two of them can be combined
//! - numeric constants are fully reduced
//! - [`Expression::UNDEFINED`] is either the entire result or absent
//!
//! Two expressions which only differ by the order of their operands therefore
//! simplify to structurally identical trees.

use crate::{
    expr::Expression,
    ops::{numeric, Operation},
};
use std::collections::VecDeque;

/// Normalize an [`Expression`] into its canonical form.
pub fn simplify(expr: &Expression) -> Expression {
    let simplified = canonical(expr);

    tracing::trace!(
        input = %expr.compact(),
        output = %simplified.compact(),
        "Simplified an expression"
    );

    simplified
}

fn canonical(expr: &Expression) -> Expression {
    match expr {
        Expression::Number(_) | Expression::Symbol(_) => expr.clone(),
        Expression::Fraction(numerator, denominator) => numeric::rational(
            i128::from(*numerator),
            i128::from(*denominator),
        ),
        Expression::Sum(terms) => sum_of(terms.iter().map(canonical).collect()),
        Expression::Product(factors) => {
            product_of(factors.iter().map(canonical).collect())
        },
        Expression::Power { base, exponent } => {
            power_of(canonical(base), canonical(exponent))
        },
        Expression::Function { function, operand } => {
            let operand = canonical(operand);

            if operand.is_undefined() {
                Expression::UNDEFINED
            } else {
                Expression::function(*function, operand)
            }
        },
    }
}

/// Add some already simplified terms together.
pub(crate) fn sum_of(terms: Vec<Expression>) -> Expression {
    reduce(Operation::Sum, terms)
}

/// Multiply some already simplified factors together.
pub(crate) fn product_of(factors: Vec<Expression>) -> Expression {
    reduce(Operation::Product, factors)
}

/// Raise an already simplified `base` to an already simplified `exponent`.
pub(crate) fn power_of(base: Expression, exponent: Expression) -> Expression {
    if base.is_undefined() || exponent.is_undefined() {
        return Expression::UNDEFINED;
    }

    if base == Expression::ZERO {
        return match exponent {
            Expression::Number(n) if n > 0 => Expression::ZERO,
            Expression::Fraction(numerator, _) if numerator > 0 => {
                Expression::ZERO
            },
            _ => Expression::UNDEFINED,
        };
    }

    if base == Expression::ONE {
        return Expression::ONE;
    }

    match exponent {
        Expression::Number(n) => int_power(base, n),
        exponent => Expression::power(base, exponent),
    }
}

fn int_power(base: Expression, n: i64) -> Expression {
    if let Some(value) = base.as_rational() {
        return numeric::power(value, n);
    }

    match n {
        0 => return Expression::ONE,
        1 => return base,
        _ => {},
    }

    match base {
        // (u^r)^n = u^(r*n)
        Expression::Power { base, exponent } => {
            match product_of(vec![
                Expression::clone(&exponent),
                Expression::Number(n),
            ]) {
                Expression::Number(m) => int_power(Expression::clone(&base), m),
                p if p.is_undefined() => Expression::UNDEFINED,
                p => Expression::Power {
                    base,
                    exponent: p.into(),
                },
            }
        },
        // (uv)^n = u^n * v^n
        Expression::Product(factors) => product_of(
            factors.iter().map(|f| int_power(f.clone(), n)).collect(),
        ),
        other => Expression::power(other, Expression::Number(n)),
    }
}

fn reduce(op: Operation, operands: Vec<Expression>) -> Expression {
    if operands.iter().any(Expression::is_undefined) {
        return Expression::UNDEFINED;
    }

    if op == Operation::Product && operands.contains(&Expression::ZERO) {
        return Expression::ZERO;
    }

    // fold from the right, merging each operand into the already reduced tail
    let mut operands = operands.into_iter().rev();

    let mut reduced = match operands.next() {
        Some(last) => flatten(op, &last),
        None => return op.identity(),
    };

    for head in operands {
        reduced = merge(op, flatten(op, &head), reduced);

        if is_undefined(&reduced) {
            return Expression::UNDEFINED;
        }
    }

    assemble(op, reduced)
}

/// The operands of an expression when viewed as part of `op`, without any
/// identity elements.
fn flatten(op: Operation, expr: &Expression) -> VecDeque<Expression> {
    match op.operands_of(expr) {
        Some(items) => items.iter().cloned().collect(),
        None if *expr == op.identity() => VecDeque::new(),
        None => {
            let mut single = VecDeque::with_capacity(1);
            single.push_back(expr.clone());
            single
        },
    }
}

fn assemble(op: Operation, operands: VecDeque<Expression>) -> Expression {
    let mut operands = Vec::from(operands);

    match operands.len() {
        0 => op.identity(),
        1 => operands.remove(0),
        _ if op == Operation::Product
            && operands.contains(&Expression::ZERO) =>
        {
            Expression::ZERO
        },
        _ => op.build(operands),
    }
}

/// What to do with the heads of two sorted operand lists.
#[derive(Debug, Clone, PartialEq)]
enum Combine {
    /// The left head comes first.
    Keep,
    /// The right head comes first.
    Swap,
    /// Both heads collapse into a single value.
    Into(Expression),
}

/// Merge two sorted operand lists, combining like operands as they meet.
///
/// This is a linear merge, like the one at the heart of a merge sort. An
/// undefined result is always returned as the single operand `[UNDEFINED]`.
fn merge(
    op: Operation,
    mut left: VecDeque<Expression>,
    mut right: VecDeque<Expression>,
) -> VecDeque<Expression> {
    let mut merged = VecDeque::with_capacity(left.len() + right.len());

    loop {
        let decision = match (left.front(), right.front()) {
            (Some(a), Some(b)) => combine(op, a, b),
            _ => break,
        };

        match decision {
            Combine::Keep => merged.extend(left.pop_front()),
            Combine::Swap => merged.extend(right.pop_front()),
            Combine::Into(result) => {
                left.pop_front();
                right.pop_front();

                tracing::debug!(
                    ?op,
                    result = %result.compact(),
                    "Combined two operands"
                );

                if result.is_undefined() {
                    return undefined();
                }

                // the result can sort before, or combine with, operands that
                // were already placed
                let placed = std::mem::take(&mut merged);
                let pending = merge(op, placed, flatten(op, &result));

                if is_undefined(&pending) {
                    return pending;
                }

                left = merge(op, pending, left);

                if is_undefined(&left) {
                    return left;
                }
            },
        }
    }

    // at most one of these still has anything in it
    merged.extend(left);
    merged.extend(right);
    merged
}

fn undefined() -> VecDeque<Expression> {
    VecDeque::from(vec![Expression::UNDEFINED])
}

fn is_undefined(operands: &VecDeque<Expression>) -> bool {
    operands.front().map_or(false, Expression::is_undefined)
}

fn combine(op: Operation, a: &Expression, b: &Expression) -> Combine {
    if let (Some(left), Some(right)) = (a.as_rational(), b.as_rational()) {
        let folded = match op {
            Operation::Sum => numeric::add(left, right),
            Operation::Product => numeric::multiply(left, right),
        };
        return Combine::Into(folded);
    }

    if !a.is_constant() && !b.is_constant() {
        match op {
            // like terms, 2xy + 3xy = 5xy
            Operation::Sum
                if a.non_constant_factors() == b.non_constant_factors() =>
            {
                let coefficient =
                    sum_of(vec![a.coefficient(), b.coefficient()]);
                return Combine::Into(product_of(vec![coefficient, a.term()]));
            },
            // like factors, x^2 * x^3 = x^5
            Operation::Product if a.base() == b.base() => {
                let exponent = sum_of(vec![a.exponent(), b.exponent()]);
                return Combine::Into(power_of(a.base().clone(), exponent));
            },
            _ => {},
        }
    }

    if a.precedes(b) {
        Combine::Keep
    } else {
        Combine::Swap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Builtin;
    use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};

    fn x() -> Expression { Expression::symbol("x") }
    fn y() -> Expression { Expression::symbol("y") }
    fn n(value: i64) -> Expression { Expression::Number(value) }

    fn simplified(src: &str) -> Expression {
        let expr: Expression = src.parse().unwrap();
        simplify(&expr)
    }

    #[test]
    fn simplify_to_canonical_trees() {
        let inputs = vec![
            ("4/8", Expression::Fraction(1, 2)),
            ("6/3", n(2)),
            ("-6/4", Expression::Fraction(-3, 2)),
            ("1/0", Expression::UNDEFINED),
            ("0.25", Expression::Fraction(1, 4)),
            ("x + x", n(2) * x()),
            ("x - x", n(0)),
            ("x*x", x().pow(2)),
            ("x/x", n(1)),
            ("y + x", x() + y()),
            ("x^2 * x^4", x().pow(6)),
            ("(5x)^2", n(25) * x().pow(2)),
            ("(x^2)^5", x().pow(10)),
            ("(x^(1/2))^2", x()),
            ("2^3", n(8)),
            ("2^-2", Expression::Fraction(1, 4)),
            ("(2/3)^-2", Expression::Fraction(9, 4)),
            ("0^2", n(0)),
            ("0^(1/2)", n(0)),
            ("0^0", Expression::UNDEFINED),
            ("0^-1", Expression::UNDEFINED),
            ("0^x", Expression::UNDEFINED),
            ("1^x", n(1)),
            ("x^0", n(1)),
            ("x^1", x()),
            ("3*0*x", n(0)),
            ("2*x*3", n(6) * x()),
            ("1 + 2 + x + 3", n(6) + x()),
            ("x*y + 2*y*x", Expression::product(vec![n(3), x(), y()])),
            ("(x + 1) + (x + 1)", n(2) + n(2) * x()),
            (
                "x^2 + x + 1",
                Expression::sum(vec![n(1), x(), x().pow(2)]),
            ),
            ("(x + 1)(x + 1)", (n(1) + x()).pow(2)),
            (
                "sin(2*x + x)",
                Expression::function(Builtin::Sine, n(3) * x()),
            ),
            ("sin(1/0)", Expression::UNDEFINED),
            ("x + 1/0", Expression::UNDEFINED),
            ("e + pi", Expression::E + Expression::PI),
        ];

        for (src, should_be) in inputs {
            let got = simplified(src);
            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn combined_factors_are_spliced_back_into_the_product() {
        // (xy)^(1/2) * (xy)^(1/2) = xy, not *[*[x, y]]
        let root = (x() * y()).pow(Expression::Fraction(1, 2));

        let got = simplify(&(root.clone() * root));

        assert_eq!(got, x() * y());
    }

    #[test]
    fn constants_from_combined_factors_are_folded() {
        let root_2 = n(2).pow(Expression::Fraction(1, 2));
        let inputs = vec![
            root_2.clone() * (n(3) * root_2.clone()),
            n(3) * root_2.clone() * root_2.clone(),
            root_2.clone() * root_2.clone() * n(3),
        ];

        for input in inputs {
            let got = simplify(&input);
            assert_eq!(got, n(6), "{}", input.compact());
        }

        let sum = n(1) + root_2.clone() * root_2 + n(4);
        assert_eq!(simplify(&sum), n(7));
    }

    #[test]
    fn spliced_factors_are_sorted_and_combined() {
        let root = (x() * y()).pow(Expression::Fraction(1, 2));
        let permutations = vec![
            vec![root.clone(), y().pow(2), root.clone()],
            vec![y().pow(2), root.clone(), root.clone()],
            vec![root.clone(), root.clone(), y().pow(2)],
        ];
        let should_be = x() * y().pow(3);

        for factors in permutations {
            let got = simplify(&Expression::product(factors));
            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }

        // the combination cancels a factor which was already placed
        let got = simplify(&Expression::product(vec![
            y().pow(-1),
            root.clone(),
            root,
        ]));
        assert_eq!(got, x());
    }

    #[test]
    fn overflow_is_undefined() {
        let big = Expression::Number(i64::MAX);

        assert_eq!(simplify(&(big.clone() + n(1))), Expression::UNDEFINED);
        assert_eq!(simplify(&(big.clone() * n(2))), Expression::UNDEFINED);
        assert_eq!(simplify(&big.clone().pow(2)), Expression::UNDEFINED);
        assert_eq!(simplify(&(big.clone() + n(-1))), n(i64::MAX - 1));

        // like terms whose coefficients overflow in the middle of a merge
        let z = Expression::symbol("z");
        let terms = vec![y(), big * x(), x(), z];
        assert_eq!(simplify(&Expression::sum(terms)), Expression::UNDEFINED);
    }

    #[test]
    fn empty_compounds() {
        assert_eq!(simplify(&Expression::sum(Vec::new())), n(0));
        assert_eq!(simplify(&Expression::product(Vec::new())), n(1));
        assert_eq!(simplify(&Expression::sum(vec![x()])), x());
    }

    #[test]
    fn rendered_canonical_forms() {
        let inputs = vec![
            ("2x^2 + 9x + 10", "10 + 9*x + 2*x^2"),
            ("x - 2y + 3", "3 + x - 2*y"),
            ("(x+y)^2 * x", "x*(x + y)^2"),
            ("3/x", "3 / x"),
        ];

        for (src, should_be) in inputs {
            let got = simplified(src).to_string();
            assert_eq!(got, should_be);
        }
    }

    /// A small expression over `x`, `y` and `z`.
    #[derive(Debug, Clone)]
    struct Small(Expression);

    impl Arbitrary for Small {
        fn arbitrary(g: &mut Gen) -> Self { Small(generate(g, 2)) }
    }

    fn generate(g: &mut Gen, depth: usize) -> Expression {
        let variables = ["x", "y", "z"];

        if depth == 0 {
            return match u8::arbitrary(g) % 6 {
                0 => Expression::Number(i64::from(i8::arbitrary(g) % 4)),
                // irrational constants, which can combine into rationals
                1 => {
                    let base = 2 + i64::from(u8::arbitrary(g) % 2);
                    n(base).pow(Expression::Fraction(1, 2))
                },
                _ => Expression::symbol(
                    variables[usize::arbitrary(g) % variables.len()],
                ),
            };
        }

        let children = |g: &mut Gen| {
            let count = 2 + usize::arbitrary(g) % 2;
            (0..count).map(|_| generate(g, depth - 1)).collect::<Vec<_>>()
        };

        match u8::arbitrary(g) % 6 {
            0 => Expression::sum(children(g)),
            1 => Expression::product(children(g)),
            2 => {
                let exponent = match u8::arbitrary(g) % 6 {
                    0 => Expression::Fraction(1, 2),
                    1 => Expression::Fraction(-1, 2),
                    2 => n(-1),
                    3 => Expression::symbol(
                        variables[usize::arbitrary(g) % variables.len()],
                    ),
                    other => n(i64::from(other) - 2),
                };
                generate(g, depth - 1).pow(exponent)
            },
            3 => {
                let function = Builtin::ALL[usize::arbitrary(g) % 3];
                Expression::function(function, generate(g, depth - 1))
            },
            _ => generate(g, 0),
        }
    }

    fn quickcheck<A: quickcheck::Testable>(property: A) {
        QuickCheck::new().tests(500).quickcheck(property);
    }

    #[test]
    fn simplification_is_idempotent() {
        fn property(Small(expr): Small) -> bool {
            let once = simplify(&expr);
            simplify(&once) == once
        }

        quickcheck(property as fn(Small) -> bool);
    }

    #[test]
    fn operand_order_does_not_matter() {
        fn property(Small(a): Small, Small(b): Small, Small(c): Small) -> bool {
            let permutations = vec![
                vec![a.clone(), b.clone(), c.clone()],
                vec![a.clone(), c.clone(), b.clone()],
                vec![b.clone(), a.clone(), c.clone()],
                vec![b.clone(), c.clone(), a.clone()],
                vec![c.clone(), a.clone(), b.clone()],
                vec![c, b, a],
            ];

            let sum = simplify(&Expression::sum(permutations[0].clone()));
            let product =
                simplify(&Expression::product(permutations[0].clone()));

            permutations.into_iter().all(|operands| {
                simplify(&Expression::sum(operands.clone())) == sum
                    && simplify(&Expression::product(operands)) == product
            })
        }

        quickcheck(property as fn(Small, Small, Small) -> bool);
    }

    #[test]
    fn undefined_is_absorbing() {
        fn property(Small(expr): Small) -> bool {
            let undefined = Expression::UNDEFINED;

            [
                expr.clone() + undefined.clone(),
                undefined.clone() * expr.clone(),
                expr.clone().pow(undefined.clone()),
                undefined.clone().pow(expr.clone()),
                Expression::function(Builtin::Cosine, undefined),
            ]
            .iter()
            .all(|compound| simplify(compound).is_undefined())
        }

        quickcheck(property as fn(Small) -> bool);
    }

    #[test]
    fn identity_laws() {
        fn property(Small(expr): Small) -> TestResult {
            let simplified = simplify(&expr);

            if simplified == Expression::ZERO || simplified.is_undefined() {
                return TestResult::discard();
            }

            TestResult::from_bool(
                simplify(&(expr.clone() + n(0))) == simplified
                    && simplify(&(expr.clone() * n(1))) == simplified
                    && simplify(&expr.clone().pow(1)) == simplified
                    && simplify(&expr.pow(0)) == n(1),
            )
        }

        quickcheck(property as fn(Small) -> TestResult);
    }
}
