//! Symbolic differentiation.

use crate::{
    expr::{Builtin, Expression, Symbol},
    ops::simplify::simplify,
};

/// Differentiate an [`Expression`], treating every variable as the unknown.
///
/// This is the derivative a single-variable calculator would give, so
/// `dx(x*y)` is `x + y`. Use [`partial_derivative()`] to hold the other
/// variables constant. The result is always simplified.
pub fn dx(expr: &Expression) -> Expression {
    let derivative = Differentiator { wrt: None }.derive(&simplify(expr));

    tracing::trace!(
        input = %expr.compact(),
        output = %derivative.compact(),
        "Differentiated an expression"
    );

    derivative
}

/// Calculate an [`Expression`]'s partial derivative with respect to a
/// particular variable.
pub fn partial_derivative(expr: &Expression, variable: &str) -> Expression {
    let differentiator = Differentiator {
        wrt: Some(variable),
    };
    let derivative = differentiator.derive(&simplify(expr));

    tracing::trace!(
        input = %expr.compact(),
        wrt = variable,
        output = %derivative.compact(),
        "Took a partial derivative"
    );

    derivative
}

struct Differentiator<'a> {
    /// The variable being differentiated with respect to, or `None` when all
    /// variables are.
    wrt: Option<&'a str>,
}

impl<'a> Differentiator<'a> {
    fn derive(&self, f: &Expression) -> Expression {
        let derivative = match f {
            Expression::Number(_)
            | Expression::Fraction(..)
            | Expression::Symbol(Symbol::E)
            | Expression::Symbol(Symbol::Pi) => return Expression::ZERO,
            Expression::Symbol(Symbol::Undefined) => {
                return Expression::UNDEFINED
            },
            Expression::Symbol(Symbol::Variable(name)) => {
                return match self.wrt {
                    Some(wrt) if wrt != name.as_str() => Expression::ZERO,
                    _ => Expression::ONE,
                };
            },
            Expression::Sum(terms) => {
                Expression::sum(terms.iter().map(|t| self.derive(t)).collect())
            },
            Expression::Product(factors) => self.product(factors),
            Expression::Power { base, exponent } => self.power(base, exponent),
            Expression::Function { function, operand } => {
                self.function(*function, operand)
            },
        };

        simplify(&derivative)
    }

    fn product(&self, factors: &[Expression]) -> Expression {
        match factors {
            [] => return Expression::ZERO,
            [single] => return self.derive(single),
            // (cf)' = cf'
            [constant, rest @ ..] if constant.is_constant() => {
                return constant.clone() * self.derive(&product_of_all(rest));
            },
            _ => {},
        }

        if let Some((last, numerator)) = factors.split_last() {
            if let Some(g) = divisor(last) {
                return self.quotient(&product_of_all(numerator), &g);
            }
        }

        if let Some((first, numerator)) = factors.split_first() {
            if let Some(g) = divisor(first) {
                return self.quotient(&product_of_all(numerator), &g);
            }
        }

        // the product rule, (fgh)' = f'gh + fg'h + fgh'
        let terms = (0..factors.len())
            .map(|i| {
                let mut term = Vec::with_capacity(factors.len());
                term.push(self.derive(&factors[i]));
                term.extend(
                    factors
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, factor)| factor.clone()),
                );
                Expression::product(term)
            })
            .collect();

        Expression::sum(terms)
    }

    /// The quotient rule, `(f/g)' = (g*f' - f*g') * g^-2`.
    fn quotient(&self, f: &Expression, g: &Expression) -> Expression {
        let numerator = Expression::sum(vec![
            g.clone() * self.derive(f),
            -(f.clone() * self.derive(g)),
        ]);

        numerator * g.clone().pow(-2)
    }

    fn power(&self, base: &Expression, exponent: &Expression) -> Expression {
        if exponent.is_constant() {
            // (u^n)' = n * u' * u^(n-1)
            let reduced = Expression::sum(vec![
                exponent.clone(),
                Expression::NEGATIVE_ONE,
            ]);

            Expression::product(vec![
                exponent.clone(),
                self.derive(base),
                base.clone().pow(reduced),
            ])
        } else if *base == Expression::E {
            // (e^v)' = v' * e^v
            self.derive(exponent) * Expression::E.pow(exponent.clone())
        } else {
            // (u^v)' = u^v * (v*u'/u + v'*ln(u))
            let ln_base =
                Expression::function(Builtin::NaturalLog, base.clone());

            Expression::product(vec![
                base.clone().pow(exponent.clone()),
                Expression::sum(vec![
                    Expression::product(vec![
                        exponent.clone(),
                        self.derive(base),
                        base.clone().pow(-1),
                    ]),
                    self.derive(exponent) * ln_base,
                ]),
            ])
        }
    }

    /// The chain rule, `f(u)' = f'(u) * u'`.
    fn function(&self, function: Builtin, u: &Expression) -> Expression {
        let of_u = |f: Builtin| Expression::function(f, u.clone());

        let outer = match function {
            Builtin::Sine => of_u(Builtin::Cosine),
            Builtin::Cosine => -of_u(Builtin::Sine),
            Builtin::Tangent => of_u(Builtin::Secant).pow(2),
            Builtin::Cosecant => {
                -(of_u(Builtin::Cosecant) * of_u(Builtin::Cotangent))
            },
            Builtin::Secant => of_u(Builtin::Secant) * of_u(Builtin::Tangent),
            Builtin::Cotangent => -of_u(Builtin::Cosecant).pow(2),
            Builtin::Log => {
                let ln_10 =
                    Expression::function(Builtin::NaturalLog, 10.into());
                (u.clone() * ln_10).pow(-1)
            },
            Builtin::NaturalLog => u.clone().pow(-1),
        };

        self.derive(u) * outer
    }
}

/// The `g` in `f/g` when `factor` is `g^-1` (or `g^-n`).
fn divisor(factor: &Expression) -> Option<Expression> {
    match factor {
        Expression::Power { base, exponent } => match **exponent {
            Expression::Number(n) if n < 0 => match n.checked_neg()? {
                1 => Some(Expression::clone(base)),
                positive => Some(Expression::clone(base).pow(positive)),
            },
            _ => None,
        },
        _ => None,
    }
}

fn product_of_all(factors: &[Expression]) -> Expression {
    match factors {
        [single] => single.clone(),
        _ => Expression::product(factors.to_vec()),
    }
}
