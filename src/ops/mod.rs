//! [`Expression`] operations.

pub mod derivative;
pub mod expand;
mod numeric;
pub mod polynomial;
pub mod simplify;

use crate::expr::{Builtin, Expression, Symbol};
use smol_str::SmolStr;
use std::sync::Arc;

/// Contextual information used when evaluating an [`Expression`].
pub trait Context {
    fn evaluate_function(
        &self,
        function: Builtin,
        argument: f64,
    ) -> Result<f64, EvaluationError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("No value was provided for \"{name}\"")]
    UnknownVariable { name: SmolStr },
    #[error("The expression is undefined")]
    Undefined,
    #[error("{function}({argument}) is outside the function's domain")]
    OutOfDomain { function: Builtin, argument: f64 },
}

/// How the arguments of trigonometric functions are interpreted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AngleUnit {
    Radians,
    Degrees,
}

impl Default for AngleUnit {
    fn default() -> Self { AngleUnit::Radians }
}

/// The set of builtin functions.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Builtins {
    pub angles: AngleUnit,
}

impl Builtins {
    pub fn degrees() -> Self {
        Builtins {
            angles: AngleUnit::Degrees,
        }
    }

    fn angle(&self, argument: f64) -> f64 {
        match self.angles {
            AngleUnit::Radians => argument,
            AngleUnit::Degrees => argument.to_radians(),
        }
    }
}

impl Context for Builtins {
    fn evaluate_function(
        &self,
        function: Builtin,
        argument: f64,
    ) -> Result<f64, EvaluationError> {
        let value = match function {
            Builtin::Sine => self.angle(argument).sin(),
            Builtin::Cosine => self.angle(argument).cos(),
            Builtin::Tangent => self.angle(argument).tan(),
            Builtin::Cosecant => self.angle(argument).sin().recip(),
            Builtin::Secant => self.angle(argument).cos().recip(),
            Builtin::Cotangent => self.angle(argument).tan().recip(),
            Builtin::Log => argument.log10(),
            Builtin::NaturalLog => argument.ln(),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvaluationError::OutOfDomain { function, argument })
        }
    }
}

/// Calculate the numeric value of an [`Expression`], using `lookup` to find
/// the value of each variable.
pub fn evaluate<F, C>(
    expr: &Expression,
    lookup: F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&str) -> Option<f64>,
    C: Context,
{
    evaluate_with(expr, &lookup, ctx)
}

fn evaluate_with<F, C>(
    expr: &Expression,
    lookup: &F,
    ctx: &C,
) -> Result<f64, EvaluationError>
where
    F: Fn(&str) -> Option<f64>,
    C: Context,
{
    match expr {
        Expression::Number(value) => Ok(*value as f64),
        Expression::Fraction(numerator, denominator) => {
            Ok(*numerator as f64 / *denominator as f64)
        },
        Expression::Symbol(Symbol::E) => Ok(std::f64::consts::E),
        Expression::Symbol(Symbol::Pi) => Ok(std::f64::consts::PI),
        Expression::Symbol(Symbol::Undefined) => {
            Err(EvaluationError::Undefined)
        },
        Expression::Symbol(Symbol::Variable(name)) => {
            lookup(name).ok_or_else(|| EvaluationError::UnknownVariable {
                name: name.clone(),
            })
        },
        Expression::Sum(terms) => {
            let mut total = 0.0;

            for term in terms.iter() {
                total += evaluate_with(term, lookup, ctx)?;
            }

            Ok(total)
        },
        Expression::Product(factors) => {
            let mut total = 1.0;

            for factor in factors.iter() {
                total *= evaluate_with(factor, lookup, ctx)?;
            }

            Ok(total)
        },
        Expression::Power { base, exponent } => {
            let base = evaluate_with(base, lookup, ctx)?;
            let exponent = evaluate_with(exponent, lookup, ctx)?;
            let value = base.powf(exponent);

            if value.is_finite() {
                Ok(value)
            } else {
                Err(EvaluationError::Undefined)
            }
        },
        Expression::Function { function, operand } => {
            let argument = evaluate_with(operand, lookup, ctx)?;
            ctx.evaluate_function(*function, argument)
        },
    }
}

/// Replace every occurrence of `target` with `value`.
///
/// The result is not simplified.
pub fn substitute(
    expression: &Expression,
    target: &Expression,
    value: &Expression,
) -> Expression {
    if expression == target {
        return value.clone();
    }

    match expression {
        Expression::Sum(terms) => Expression::sum(
            terms.iter().map(|t| substitute(t, target, value)).collect(),
        ),
        Expression::Product(factors) => Expression::product(
            factors.iter().map(|f| substitute(f, target, value)).collect(),
        ),
        Expression::Power { base, exponent } => Expression::power(
            substitute(base, target, value),
            substitute(exponent, target, value),
        ),
        Expression::Function { function, operand } => Expression::Function {
            function: *function,
            operand: Arc::new(substitute(operand, target, value)),
        },
        Expression::Number(_)
        | Expression::Fraction(..)
        | Expression::Symbol(_) => expression.clone(),
    }
}

/// The two n-ary operations an [`Expression`] can be built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Operation {
    Sum,
    Product,
}

impl Operation {
    /// The value which leaves every operand unchanged.
    pub(crate) fn identity(self) -> Expression {
        match self {
            Operation::Sum => Expression::ZERO,
            Operation::Product => Expression::ONE,
        }
    }

    /// The operands of `expr` if it is built with this operation.
    pub(crate) fn operands_of(
        self,
        expr: &Expression,
    ) -> Option<&[Expression]> {
        match (self, expr) {
            (Operation::Sum, Expression::Sum(items))
            | (Operation::Product, Expression::Product(items)) => {
                Some(&items[..])
            },
            _ => None,
        }
    }

    pub(crate) fn build(self, operands: Vec<Expression>) -> Expression {
        match self {
            Operation::Sum => Expression::sum(operands),
            Operation::Product => Expression::product(operands),
        }
    }
}
