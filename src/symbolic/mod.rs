//! A deliberately small symbolic-math module: parse, evaluate, solve.
//!
//! The normalizer guarantees its output alphabet (`0-9 a-z A-Z + - * / ( ) .
//! =`), so the grammar here is correspondingly small: numbers, named
//! variables, the four arithmetic operators, `**` for exponentiation, unary
//! minus, and parentheses. No functions, no constants, no simplification
//! engine — closed expressions are evaluated numerically and equations are
//! solved only as far as single-variable polynomials of degree two, which
//! covers what a person plausibly writes on one line of a whiteboard.
//!
//! ## Layout
//!
//! - [`expr`]  — the [`Expr`] tree: display, free variables, numeric eval
//! - [`parse`] — tokenizer + recursive-descent parser over the normalized
//!   alphabet
//! - [`solve`] — polynomial coefficient extraction and the real-root solver,
//!   producing a [`Solution`] set

pub mod expr;
pub mod parse;
pub mod solve;

pub use expr::{EvalError, Expr};
pub use parse::{parse, ParseError};
pub use solve::{format_number, solve_equation, Solution, SolveError};
