//! Exact integer arithmetic for numeric constants.
//!
//! Every operation is checked. A result which doesn't fit in an `i64`
//! numerator and denominator becomes [`Expression::UNDEFINED`].

use crate::expr::Expression;

pub(crate) fn gcd(a: i128, b: i128) -> u128 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());

    while b != 0 {
        let remainder = a % b;
        a = b;
        b = remainder;
    }

    a
}

/// Build the canonical constant for `numerator / denominator`.
pub(crate) fn rational(numerator: i128, denominator: i128) -> Expression {
    if denominator == 0 {
        return Expression::UNDEFINED;
    }
    if numerator == 0 {
        return Expression::ZERO;
    }

    let divisor = match i128::try_from(gcd(numerator, denominator)) {
        Ok(divisor) => divisor,
        // only 2^127 overflows, which means both are i128::MIN
        Err(_) => return Expression::ONE,
    };
    let (numerator, denominator) = (numerator / divisor, denominator / divisor);

    let (numerator, denominator) = if denominator < 0 {
        match (numerator.checked_neg(), denominator.checked_neg()) {
            (Some(numerator), Some(denominator)) => (numerator, denominator),
            _ => return Expression::UNDEFINED,
        }
    } else {
        (numerator, denominator)
    };

    match (i64::try_from(numerator), i64::try_from(denominator)) {
        (Ok(numerator), Ok(1)) => Expression::Number(numerator),
        (Ok(numerator), Ok(denominator)) => {
            Expression::Fraction(numerator, denominator)
        },
        _ => Expression::UNDEFINED,
    }
}

fn widen((numerator, denominator): (i64, i64)) -> (i128, i128) {
    (i128::from(numerator), i128::from(denominator))
}

/// Add two numeric constants.
pub(crate) fn add(left: (i64, i64), right: (i64, i64)) -> Expression {
    let (a, b) = widen(left);
    let (c, d) = widen(right);

    match (a * d).checked_add(c * b) {
        Some(numerator) => rational(numerator, b * d),
        None => Expression::UNDEFINED,
    }
}

/// Multiply two numeric constants.
pub(crate) fn multiply(left: (i64, i64), right: (i64, i64)) -> Expression {
    let (a, b) = widen(left);
    let (c, d) = widen(right);

    rational(a * c, b * d)
}

/// Raise a numeric constant to an integer power.
pub(crate) fn power(
    (numerator, denominator): (i64, i64),
    exponent: i64,
) -> Expression {
    if exponent == 0 {
        return Expression::ONE;
    }

    let magnitude = match u32::try_from(exponent.unsigned_abs()) {
        Ok(magnitude) => magnitude,
        Err(_) => return Expression::UNDEFINED,
    };
    let top = i128::from(numerator).checked_pow(magnitude);
    let bottom = i128::from(denominator).checked_pow(magnitude);

    match (top, bottom) {
        (Some(top), Some(bottom)) if exponent > 0 => rational(top, bottom),
        (Some(top), Some(bottom)) => rational(bottom, top),
        _ => Expression::UNDEFINED,
    }
}

/// The binomial coefficient `n choose k`, or `None` on overflow.
pub(crate) fn binomial(n: i64, k: i64) -> Option<i64> {
    if k < 0 || k > n {
        return Some(0);
    }

    // the running product is always itself a binomial coefficient, so the
    // division is exact
    let k = k.min(n - k);
    let mut coefficient: i128 = 1;

    for i in 1..=i128::from(k) {
        coefficient = coefficient.checked_mul(i128::from(n) - i + 1)? / i;
    }

    i64::try_from(coefficient).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rationals_are_reduced() {
        let inputs = vec![
            ((4, 8), Expression::Fraction(1, 2)),
            ((6, 3), Expression::Number(2)),
            ((3, -6), Expression::Fraction(-1, 2)),
            ((-3, -6), Expression::Fraction(1, 2)),
            ((0, 5), Expression::ZERO),
            ((1, 0), Expression::UNDEFINED),
            ((i128::from(i64::MAX) + 1, 1), Expression::UNDEFINED),
            ((1, i128::MIN), Expression::UNDEFINED),
            ((i128::MIN, -1), Expression::UNDEFINED),
            ((i128::MIN, i128::MIN), Expression::ONE),
            ((0, i128::MIN), Expression::ZERO),
            ((i128::MIN, i128::from(i64::MIN)), Expression::UNDEFINED),
        ];

        for ((numerator, denominator), should_be) in inputs {
            let got = rational(numerator, denominator);
            assert_eq!(got, should_be);
        }
    }

    #[test]
    fn exact_arithmetic() {
        assert_eq!(add((1, 2), (1, 3)), Expression::Fraction(5, 6));
        assert_eq!(add((1, 2), (1, 2)), Expression::ONE);
        assert_eq!(multiply((2, 3), (3, 4)), Expression::Fraction(1, 2));
        assert_eq!(multiply((i64::MAX, 1), (2, 1)), Expression::UNDEFINED);
    }

    #[test]
    fn integer_powers() {
        let inputs = vec![
            ((2, 1), 10, Expression::Number(1024)),
            ((2, 1), -2, Expression::Fraction(1, 4)),
            ((-2, 3), 3, Expression::Fraction(-8, 27)),
            ((-2, 3), -3, Expression::Fraction(-27, 8)),
            ((0, 1), -1, Expression::UNDEFINED),
            ((7, 1), 0, Expression::ONE),
            ((10, 1), 30, Expression::UNDEFINED),
            ((-2, 1), -127, Expression::UNDEFINED),
            ((-2, 1), 127, Expression::UNDEFINED),
            ((1, -2), 127, Expression::UNDEFINED),
            ((-2, 1), -62, Expression::Fraction(1, 1 << 62)),
        ];

        for (base, exponent, should_be) in inputs {
            let got = power(base, exponent);
            assert_eq!(got, should_be, "{:?}^{}", base, exponent);
        }
    }

    #[test]
    fn gcd_handles_extreme_values() {
        assert_eq!(gcd(12, -18), 6);
        assert_eq!(gcd(i128::MIN, -1), 1);
        assert_eq!(gcd(i128::MIN, 0), 1 << 127);
    }

    #[test]
    fn binomial_coefficients() {
        assert_eq!(binomial(5, 0), Some(1));
        assert_eq!(binomial(5, 2), Some(10));
        assert_eq!(binomial(5, 5), Some(1));
        assert_eq!(binomial(3, 4), Some(0));
        assert_eq!(binomial(60, 30), Some(118_264_581_564_861_424));
        assert_eq!(binomial(100, 50), None);
    }
}
