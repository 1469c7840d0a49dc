//! Algebraic expansion.
//!
//! Products are distributed over sums and positive integer powers of sums
//! are multiplied out. Expanding `(a + b + ...)^n` produces one term per
//! multinomial coefficient, so the output grows combinatorially with `n`
//! and the number of terms. There is no cutoff.

use crate::{
    expr::Expression,
    ops::{
        numeric,
        simplify::{power_of, product_of, simplify, sum_of},
    },
};

/// Multiply out all products of sums and positive integer powers of sums.
///
/// Negative powers are left alone, so `(x + 1)^-2` is unchanged. The result
/// is simplified.
pub fn expand(expr: &Expression) -> Expression {
    let expanded = expand_simplified(&simplify(expr));

    tracing::trace!(
        input = %expr.compact(),
        output = %expanded.compact(),
        "Expanded an expression"
    );

    expanded
}

fn expand_simplified(expr: &Expression) -> Expression {
    match expr {
        Expression::Power { base, exponent } => match (&**base, &**exponent) {
            (Expression::Sum(terms), Expression::Number(n)) if *n > 0 => {
                multinomial(terms, *n)
            },
            (Expression::Sum(_), Expression::Number(0)) => Expression::ONE,
            _ => expr.clone(),
        },
        Expression::Product(factors) => expand_product(factors),
        Expression::Sum(terms) => {
            sum_of(terms.iter().map(expand_simplified).collect())
        },
        Expression::Number(_)
        | Expression::Fraction(..)
        | Expression::Symbol(_)
        | Expression::Function { .. } => expr.clone(),
    }
}

/// Expand `(f + g)^n` as the sum of `C(n, k) * f^(n-k) * g^k`, where `f` is
/// the first term and `g` is everything else.
fn multinomial(terms: &[Expression], n: i64) -> Expression {
    let expanded = sum_of(terms.iter().map(expand_simplified).collect());

    let (first, rest) = match expanded.terms().split_first() {
        Some((first, rest)) if !rest.is_empty() => (first.clone(), rest),
        _ => {
            // the terms collapsed, so there is nothing left to distribute
            return expand_simplified(&power_of(
                expanded.clone(),
                Expression::Number(n),
            ));
        },
    };
    let rest = sum_of(rest.to_vec());

    let mut expansion = Vec::new();

    for k in 0..=n {
        let coefficient = match numeric::binomial(n, k) {
            Some(coefficient) => Expression::Number(coefficient),
            None => return Expression::UNDEFINED,
        };
        let f = power_of(first.clone(), Expression::Number(n - k));
        let g = expand_simplified(&power_of(
            rest.clone(),
            Expression::Number(k),
        ));

        expansion.push(expand_product(&[coefficient, f, g]));
    }

    sum_of(expansion)
}

fn expand_product(factors: &[Expression]) -> Expression {
    factors
        .iter()
        .map(expand_simplified)
        .fold(Expression::ONE, |product, factor| distribute(&product, &factor))
}

/// Multiply every term of `left` by every term of `right`.
fn distribute(left: &Expression, right: &Expression) -> Expression {
    let capacity = left.terms().len() * right.terms().len();
    let mut terms = Vec::with_capacity(capacity);

    for a in left.terms() {
        for b in right.terms() {
            terms.push(product_of(vec![a.clone(), b.clone()]));
        }
    }

    sum_of(terms)
}
