//! Treating an [`Expression`] as a polynomial.
//!
//! The "variables" of a polynomial can be any expression, not just
//! [`Symbol::Variable`](crate::Symbol::Variable)s. Treating `sin(x)` or
//! `(x + 1)` as the unknown lets you ask for the leading coefficient of
//! `2*sin(x)^2 + sin(x)` the same way you would for `2y^2 + y`.
//!
//! Every function here expects its input to already be simplified.

use crate::{
    expr::Expression,
    ops::{
        expand::expand,
        simplify::{product_of, simplify, sum_of},
    },
};
use std::collections::HashSet;

/// Is `expr` a *general monomial expression* in `variables`?
///
/// That is one of
///
/// - a variable
/// - something which doesn't depend on any of the variables
/// - `x^n`, where `x` is a variable and `n` is an integer greater than 1
/// - a product of general monomials
pub fn is_general_monomial(
    expr: &Expression,
    variables: &HashSet<Expression>,
) -> bool {
    if variables.contains(expr) || expr.free_of_all(variables) {
        return true;
    }

    match expr {
        Expression::Power { base, exponent } => {
            variables.contains(&**base)
                && matches!(**exponent, Expression::Number(n) if n > 1)
        },
        Expression::Product(factors) => factors
            .iter()
            .all(|factor| is_general_monomial(factor, variables)),
        _ => false,
    }
}

/// Is `expr` a *general polynomial expression* in `variables` (a general
/// monomial, or a sum of them)?
pub fn is_general_polynomial(
    expr: &Expression,
    variables: &HashSet<Expression>,
) -> bool {
    match expr {
        Expression::Sum(terms)
            if terms.iter().all(|t| is_general_monomial(t, variables)) =>
        {
            true
        },
        _ => is_general_monomial(expr, variables),
    }
}

/// Find the sub-expressions which `expr` could be considered a polynomial
/// in.
///
/// A sum appearing as a factor is kept whole, so the variables of
/// `(x + 1)*y` are `x + 1` and `y`.
pub fn variables(expr: &Expression) -> HashSet<Expression> {
    let mut found = HashSet::new();
    collect_variables(expr, &mut found);
    found
}

fn collect_variables(expr: &Expression, found: &mut HashSet<Expression>) {
    match expr {
        Expression::Number(_) | Expression::Fraction(..) => {},
        Expression::Power { base, exponent }
            if matches!(**exponent, Expression::Number(n) if n > 1) =>
        {
            found.insert(Expression::clone(base));
        },
        Expression::Sum(terms) => {
            for term in terms.iter() {
                collect_variables(term, found);
            }
        },
        Expression::Product(factors) => {
            for factor in factors.iter() {
                match factor {
                    Expression::Sum(_) => {
                        found.insert(factor.clone());
                    },
                    _ => collect_variables(factor, found),
                }
            }
        },
        _ => {
            found.insert(expr.clone());
        },
    }
}

/// Split a monomial in `x` into its coefficient and degree.
///
/// `3x^2y` gives `(3y, 2)`. When `term` isn't a monomial in `x` the
/// coefficient is [`Expression::UNDEFINED`].
pub fn monomial_coefficient(
    term: &Expression,
    x: &Expression,
) -> (Expression, i64) {
    if term == x {
        return (Expression::ONE, 1);
    }

    if term.free_of(x) {
        return (term.clone(), 0);
    }

    match term {
        Expression::Product(factors) => {
            let mut coefficient = Vec::with_capacity(factors.len());
            let mut degree = 0;

            for factor in factors.iter() {
                match monomial_coefficient(factor, x) {
                    (c, _) if c.is_undefined() => {
                        return (Expression::UNDEFINED, 0)
                    },
                    (_, 0) => coefficient.push(factor.clone()),
                    (_, d) => degree = d,
                }
            }

            (product_of(coefficient), degree)
        },
        Expression::Power { base, exponent } if **base == *x => {
            match **exponent {
                Expression::Number(n) if n > 1 => (Expression::ONE, n),
                _ => (Expression::UNDEFINED, 0),
            }
        },
        _ => (Expression::UNDEFINED, 0),
    }
}

/// The total degree of a monomial, the sum of the exponents of each variable.
///
/// Returns `None` if `term` isn't a general monomial.
pub fn monomial_degree(
    term: &Expression,
    variables: &HashSet<Expression>,
) -> Option<i64> {
    if !is_general_monomial(term, variables) {
        return None;
    }

    let degree_of = |factor: &Expression| {
        if variables.contains(factor) {
            1
        } else if variables.contains(factor.base()) {
            match factor.exponent() {
                Expression::Number(n) => n,
                _ => 0,
            }
        } else {
            0
        }
    };

    match term {
        Expression::Product(factors) if !variables.contains(term) => {
            Some(factors.iter().map(degree_of).sum())
        },
        _ => Some(degree_of(term)),
    }
}

/// The degree of a polynomial, the highest degree of any of its monomials.
///
/// Returns `None` if `expr` isn't a general polynomial.
pub fn degree(
    expr: &Expression,
    variables: &HashSet<Expression>,
) -> Option<i64> {
    match expr {
        Expression::Sum(terms) if !variables.contains(expr) => {
            let mut highest = 0;

            for term in terms.iter() {
                highest = highest.max(monomial_degree(term, variables)?);
            }

            Some(highest)
        },
        _ => monomial_degree(expr, variables),
    }
}

/// The sum of the coefficients of every monomial in `expr` with this
/// `degree` in `x`.
///
/// Returns [`Expression::UNDEFINED`] if `expr` isn't a polynomial in `x`.
pub fn polynomial_coefficient(
    expr: &Expression,
    x: &Expression,
    degree: i64,
) -> Expression {
    if expr == x {
        return if degree == 1 {
            Expression::ONE
        } else {
            Expression::ZERO
        };
    }

    let mut coefficients = Vec::new();

    for term in expr.terms() {
        let (coefficient, d) = monomial_coefficient(term, x);

        if coefficient.is_undefined() {
            return Expression::UNDEFINED;
        } else if d == degree {
            coefficients.push(coefficient);
        }
    }

    sum_of(coefficients)
}

/// The coefficient of the highest power of `x`.
///
/// Returns [`Expression::UNDEFINED`] if `expr` isn't a polynomial in `x`.
pub fn leading_coefficient(expr: &Expression, x: &Expression) -> Expression {
    let variables = single(x);

    match degree(expr, &variables) {
        Some(d) => polynomial_coefficient(expr, x, d),
        None => Expression::UNDEFINED,
    }
}

/// Long division of two polynomials in `x`, returning the quotient and
/// remainder.
///
/// Both results are [`Expression::UNDEFINED`] when either input isn't a
/// polynomial in `x` or `divisor` is zero.
pub fn divide(
    dividend: &Expression,
    divisor: &Expression,
    x: &Expression,
) -> (Expression, Expression) {
    let undefined = (Expression::UNDEFINED, Expression::UNDEFINED);
    let variables = single(x);

    let dividend = simplify(dividend);
    let divisor = simplify(divisor);

    if divisor == Expression::ZERO {
        return undefined;
    }

    let (mut m, n) =
        match (degree(&dividend, &variables), degree(&divisor, &variables)) {
            (Some(m), Some(n)) => (m, n),
            _ => return undefined,
        };

    let lc_divisor = leading_coefficient(&divisor, x);
    // everything in the divisor except its leading term
    let divisor_tail = simplify(&Expression::sum(vec![
        divisor.clone(),
        -(lc_divisor.clone() * x.clone().pow(n)),
    ]));

    let mut quotient = Expression::ZERO;
    let mut remainder = dividend;

    while m >= n && remainder != Expression::ZERO {
        let lc_remainder = leading_coefficient(&remainder, x);
        let s = simplify(&(lc_remainder.clone() / lc_divisor.clone()));
        let step = s * x.clone().pow(m - n);

        quotient = simplify(&(quotient + step.clone()));
        remainder = expand(&Expression::sum(vec![
            remainder,
            -(lc_remainder * x.clone().pow(m)),
            -(divisor_tail.clone() * step),
        ]));

        tracing::debug!(
            quotient = %quotient.compact(),
            remainder = %remainder.compact(),
            "Long division step"
        );

        match degree(&remainder, &variables) {
            // the leading term must cancel, otherwise we'd loop forever
            Some(next) if next < m || remainder == Expression::ZERO => m = next,
            _ => return undefined,
        }
    }

    (quotient, remainder)
}

fn single(x: &Expression) -> HashSet<Expression> {
    let mut variables = HashSet::with_capacity(1);
    variables.insert(x.clone());
    variables
}
