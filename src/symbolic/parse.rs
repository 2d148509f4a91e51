//! Tokenizer and recursive-descent parser for normalized expressions.
//!
//! The input alphabet is whatever [`crate::pipeline::normalize`] emits:
//! digits, dots, letters, `+ - * / ( )`, with `**` as the exponentiation
//! operator. `=` never reaches this parser — the caller splits equations into
//! sides first.
//!
//! ## Grammar
//!
//! ```text
//! expr   := term   (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := '-' factor | '+' factor | power
//! power  := atom ('**' factor)?          right-associative
//! atom   := NUMBER | IDENT | '(' expr ')'
//! ```
//!
//! `**` binding tighter than the unary minus on its left gives the
//! conventional reading `-x**2 == -(x**2)`; a negative exponent is reached
//! through the `factor` on the right-hand side (`x**-2`).

use super::expr::Expr;
use std::iter::Peekable;
use thiserror::Error;

/// Errors from tokenizing or parsing.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// A character outside the normalized alphabet reached the parser.
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char },

    /// A numeric literal that f64 cannot parse (e.g. `1.2.3` or a bare `.`).
    #[error("invalid number '{literal}'")]
    InvalidNumber { literal: String },

    /// A token in a position the grammar does not allow.
    #[error("unexpected token '{token}'")]
    UnexpectedToken { token: String },

    /// Input ended mid-expression.
    #[error("expression ended unexpectedly")]
    UnexpectedEnd,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleStar,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Num(n) => n.to_string(),
            Token::Ident(s) => s.clone(),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::DoubleStar => "**".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::InvalidNumber {
                        literal: literal.clone(),
                    })?;
                tokens.push(Token::Num(value));
            }
            'a'..='z' | 'A'..='Z' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphabetic() {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::DoubleStar);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(ParseError::UnexpectedChar { ch: other }),
        }
    }

    Ok(tokens)
}

/// Parse a normalized expression string into an [`Expr`] tree.
///
/// # Errors
/// [`ParseError`] on anything the grammar above rejects, including trailing
/// tokens after a complete expression.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut stream = tokens.into_iter().peekable();
    let expr = parse_expr(&mut stream)?;
    match stream.next() {
        None => Ok(expr),
        Some(extra) => Err(ParseError::UnexpectedToken {
            token: extra.describe(),
        }),
    }
}

type Tokens = Peekable<std::vec::IntoIter<Token>>;

fn parse_expr(tokens: &mut Tokens) -> Result<Expr, ParseError> {
    let mut lhs = parse_term(tokens)?;
    loop {
        match tokens.peek() {
            Some(Token::Plus) => {
                tokens.next();
                lhs = Expr::add(lhs, parse_term(tokens)?);
            }
            Some(Token::Minus) => {
                tokens.next();
                lhs = Expr::sub(lhs, parse_term(tokens)?);
            }
            _ => return Ok(lhs),
        }
    }
}

fn parse_term(tokens: &mut Tokens) -> Result<Expr, ParseError> {
    let mut lhs = parse_factor(tokens)?;
    loop {
        match tokens.peek() {
            Some(Token::Star) => {
                tokens.next();
                lhs = Expr::mul(lhs, parse_factor(tokens)?);
            }
            Some(Token::Slash) => {
                tokens.next();
                lhs = Expr::div(lhs, parse_factor(tokens)?);
            }
            _ => return Ok(lhs),
        }
    }
}

fn parse_factor(tokens: &mut Tokens) -> Result<Expr, ParseError> {
    match tokens.peek() {
        Some(Token::Minus) => {
            tokens.next();
            Ok(Expr::neg(parse_factor(tokens)?))
        }
        // A stray leading `+` is harmless; accept and ignore it.
        Some(Token::Plus) => {
            tokens.next();
            parse_factor(tokens)
        }
        _ => parse_power(tokens),
    }
}

fn parse_power(tokens: &mut Tokens) -> Result<Expr, ParseError> {
    let base = parse_atom(tokens)?;
    if tokens.peek() == Some(&Token::DoubleStar) {
        tokens.next();
        // Right-associative: the exponent is a full factor, so `x**-2` and
        // `x**y**z == x**(y**z)` both parse.
        let exp = parse_factor(tokens)?;
        return Ok(Expr::pow(base, exp));
    }
    Ok(base)
}

fn parse_atom(tokens: &mut Tokens) -> Result<Expr, ParseError> {
    match tokens.next() {
        Some(Token::Num(n)) => Ok(Expr::num(n)),
        Some(Token::Ident(name)) => Ok(Expr::var(name)),
        Some(Token::LParen) => {
            let inner = parse_expr(tokens)?;
            match tokens.next() {
                Some(Token::RParen) => Ok(inner),
                Some(other) => Err(ParseError::UnexpectedToken {
                    token: other.describe(),
                }),
                None => Err(ParseError::UnexpectedEnd),
            }
        }
        Some(other) => Err(ParseError::UnexpectedToken {
            token: other.describe(),
        }),
        None => Err(ParseError::UnexpectedEnd),
    }
}
