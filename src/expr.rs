use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
    slice,
    sync::Arc,
};

/// An expression.
///
/// Values are immutable. Every transformation builds a new tree, sharing
/// untouched subtrees with its input, so cloning an [`Expression`] is cheap.
///
/// Subtraction and division have no variant of their own. `a - b` is written
/// as `a + (-1 * b)` and `a / b` as `a * b^-1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// An exact integer.
    Number(i64),
    /// An exact rational, `numerator / denominator`.
    Fraction(i64, i64),
    Symbol(Symbol),
    /// Several terms added together.
    Sum(Arc<[Expression]>),
    /// Several factors multiplied together.
    Product(Arc<[Expression]>),
    /// Raise `base` to the power of `exponent`.
    Power {
        base: Arc<Expression>,
        exponent: Arc<Expression>,
    },
    /// Invoke a builtin function.
    Function {
        function: Builtin,
        operand: Arc<Expression>,
    },
}

impl Expression {
    /// The absorbing "not a number" value.
    pub const UNDEFINED: Expression = Expression::Symbol(Symbol::Undefined);
    /// Euler's number.
    pub const E: Expression = Expression::Symbol(Symbol::E);
    pub const PI: Expression = Expression::Symbol(Symbol::Pi);
    pub const ZERO: Expression = Expression::Number(0);
    pub const ONE: Expression = Expression::Number(1);
    pub const NEGATIVE_ONE: Expression = Expression::Number(-1);

    /// Create a [`Symbol`], recognising the names of the builtin constants.
    pub fn symbol<S: Into<SmolStr>>(name: S) -> Self {
        Expression::Symbol(Symbol::named(name))
    }

    pub fn sum(terms: Vec<Expression>) -> Self {
        Expression::Sum(terms.into())
    }

    pub fn product(factors: Vec<Expression>) -> Self {
        Expression::Product(factors.into())
    }

    pub fn power(base: Expression, exponent: Expression) -> Self {
        Expression::Power {
            base: Arc::new(base),
            exponent: Arc::new(exponent),
        }
    }

    /// The `degree`-th root of `radicand`, i.e. `radicand^(1/degree)`.
    pub fn root(radicand: Expression, degree: i64) -> Self {
        Expression::power(radicand, Expression::Fraction(1, degree))
    }

    pub fn function(function: Builtin, operand: Expression) -> Self {
        Expression::Function {
            function,
            operand: Arc::new(operand),
        }
    }

    /// Raise this expression to some power.
    pub fn pow<X: Into<Expression>>(self, exponent: X) -> Self {
        Expression::power(self, exponent.into())
    }

    /// Is this a numeric constant (a [`Expression::Number`] or
    /// [`Expression::Fraction`])?
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Number(_) | Expression::Fraction(..) => true,
            _ => false,
        }
    }

    pub fn is_undefined(&self) -> bool {
        *self == Expression::UNDEFINED
    }

    /// The value of a numeric constant as a `(numerator, denominator)` pair.
    pub fn as_rational(&self) -> Option<(i64, i64)> {
        match *self {
            Expression::Number(value) => Some((value, 1)),
            Expression::Fraction(numerator, denominator) => {
                Some((numerator, denominator))
            },
            _ => None,
        }
    }

    /// The base of a power, or the expression itself.
    pub fn base(&self) -> &Expression {
        match self {
            Expression::Power { base, .. } => &**base,
            other => other,
        }
    }

    /// The exponent of a power, or `1`.
    pub fn exponent(&self) -> Expression {
        match self {
            Expression::Power { exponent, .. } => Expression::clone(exponent),
            _ => Expression::ONE,
        }
    }

    /// The numeric coefficient of a term.
    ///
    /// For `3xy` this is `3`, for `xy` it is `1`. Constants have no
    /// coefficient and give [`Expression::UNDEFINED`].
    pub fn coefficient(&self) -> Expression {
        if self.is_constant() {
            return Expression::UNDEFINED;
        }

        match self.factors().first() {
            Some(head) if head.is_constant() => head.clone(),
            _ => Expression::ONE,
        }
    }

    /// The non-constant part of a term, `xy` for both `3xy` and `xy`.
    ///
    /// Constants have no such part and give [`Expression::UNDEFINED`].
    pub fn term(&self) -> Expression {
        if self.is_constant() {
            return Expression::UNDEFINED;
        }

        match self.non_constant_factors() {
            [single] => single.clone(),
            factors => Expression::product(factors.to_vec()),
        }
    }

    /// The factors remaining once a leading numeric coefficient is removed.
    pub(crate) fn non_constant_factors(&self) -> &[Expression] {
        match self {
            Expression::Product(factors)
                if !factors.is_empty() && factors[0].is_constant() =>
            {
                &factors[1..]
            },
            Expression::Product(factors) => &factors[..],
            other => slice::from_ref(other),
        }
    }

    /// The terms of a sum, or the expression itself.
    pub fn terms(&self) -> &[Expression] {
        match self {
            Expression::Sum(terms) => &terms[..],
            other => slice::from_ref(other),
        }
    }

    /// The factors of a product, or the expression itself.
    pub fn factors(&self) -> &[Expression] {
        match self {
            Expression::Product(factors) => &factors[..],
            other => slice::from_ref(other),
        }
    }

    /// The immediate children of this expression.
    pub fn operands(&self) -> Vec<&Expression> {
        match self {
            Expression::Sum(items) | Expression::Product(items) => {
                items.iter().collect()
            },
            Expression::Power { base, exponent } => vec![&**base, &**exponent],
            Expression::Function { operand, .. } => vec![&**operand],
            Expression::Number(_)
            | Expression::Fraction(..)
            | Expression::Symbol(_) => Vec::new(),
        }
    }

    /// Returns `false` when `other` is this expression or one of its complete
    /// sub-expressions.
    pub fn free_of(&self, other: &Expression) -> bool {
        self != other
            && self.operands().into_iter().all(|child| child.free_of(other))
    }

    /// Is this expression free of every expression in `others`?
    pub fn free_of_all<'a, I>(&self, others: I) -> bool
    where
        I: IntoIterator<Item = &'a Expression>,
    {
        others.into_iter().all(|other| self.free_of(other))
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Expression { Expression::Number(value) }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Expression { Expression::Number(value.into()) }
}

impl From<Symbol> for Expression {
    fn from(symbol: Symbol) -> Expression { Expression::Symbol(symbol) }
}

/// An opaque, atomic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// An ordinary unknown, e.g. `x`.
    Variable(SmolStr),
    E,
    Pi,
    /// The result of a mathematically undefined operation.
    Undefined,
}

impl Symbol {
    pub fn named<S: Into<SmolStr>>(name: S) -> Self {
        let name = name.into();

        match name.as_str() {
            "e" => Symbol::E,
            "pi" => Symbol::Pi,
            _ => Symbol::Variable(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(name) => name,
            Symbol::E => "e",
            Symbol::Pi => "pi",
            Symbol::Undefined => "Undefined",
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Various builtin functions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sine,
    Cosine,
    Tangent,
    Cosecant,
    Secant,
    Cotangent,
    /// The base-10 logarithm.
    Log,
    NaturalLog,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Sine,
        Builtin::Cosine,
        Builtin::Tangent,
        Builtin::Cosecant,
        Builtin::Secant,
        Builtin::Cotangent,
        Builtin::Log,
        Builtin::NaturalLog,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Sine => "sin",
            Builtin::Cosine => "cos",
            Builtin::Tangent => "tan",
            Builtin::Cosecant => "csc",
            Builtin::Secant => "sec",
            Builtin::Cotangent => "cot",
            Builtin::Log => "log",
            Builtin::NaturalLog => "ln",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Builtin::ALL.iter().copied().find(|b| b.name() == name)
    }
}

impl Display for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// define some operator overloads to make constructing an expression easier.
// Like the parser, these build the raw tree and never simplify.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::sum(vec![self, rhs])
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression { self + (-rhs) }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::product(vec![self, rhs])
    }
}

impl Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Expression) -> Expression {
        self * rhs.pow(Expression::NEGATIVE_ONE)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Self::Output { Expression::NEGATIVE_ONE * self }
}
