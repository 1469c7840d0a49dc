//! A small computer-algebra core.
//!
//! Expressions are parsed (or built by hand) into an [`Expression`] tree,
//! normalized into a canonical form with [`simplify()`], and then
//! differentiated with [`dx()`], expanded with [`expand()`], or analysed as
//! polynomials using the functions in [`ops::polynomial`].
//!
//! ```rust
//! use derivate::{dx, expand, simplify, Expression};
//!
//! let f: Expression = "x^2 * (x^3 + 1)".parse().unwrap();
//! let derivative = expand(&dx(&f));
//!
//! let should_be: Expression = "5x^4 + 2x".parse().unwrap();
//! assert_eq!(derivative, simplify(&should_be));
//! ```
//!
//! Mathematically undefined results (e.g. `1/0` or `0^0`) are not errors.
//! They are represented by [`Expression::UNDEFINED`], which absorbs every
//! expression it appears in.

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod display;
mod expr;
pub mod ops;
mod order;
mod parse;

pub use display::Compact;
pub use expr::{Builtin, Expression, Symbol};
pub use ops::{
    derivative::{dx, partial_derivative},
    evaluate,
    expand::expand,
    simplify::simplify,
    substitute, AngleUnit, Builtins, Context, EvaluationError,
};
pub use parse::{parse, ParseError, TokenKind};
