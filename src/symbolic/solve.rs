//! Equation solving: polynomial extraction and real roots up to degree two.
//!
//! ## Approach
//!
//! Move everything to one side (`lhs - rhs`), flatten the tree into dense
//! polynomial coefficients in the single unknown, and apply the closed-form
//! root formulas. Degree two is the ceiling on purpose: it covers the linear
//! and quadratic equations people photograph, and everything beyond it would
//! mean dragging in numeric root-finding with its own failure modes — a
//! descriptive error is more honest than a half-converged root.

use super::expr::Expr;
use std::fmt;
use thiserror::Error;

/// Coefficients below this are treated as zero. Absorbs the float dust that
/// `lhs - rhs` rearrangement produces (e.g. `0.1*x + 0.2*x - 0.3*x`).
const EPS: f64 = 1e-9;

/// Highest exponent accepted during extraction. Keeps `x**999999` from
/// allocating a million coefficients before the degree check can reject it.
const MAX_EXPONENT: u32 = 16;

/// Errors from equation solving.
#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    /// More than one unknown; this solver handles exactly one.
    #[error("{count} unknowns ({names}); only single-variable equations are supported")]
    Multivariate { count: usize, names: String },

    /// The equation does not reduce to a polynomial in the unknown.
    #[error("not a polynomial in {var}: {detail}")]
    NotPolynomial { var: String, detail: String },

    /// The polynomial degree is beyond the closed-form range.
    #[error("degree {degree} is not supported (maximum is 2)")]
    DegreeTooHigh { degree: usize },
}

/// The solution set of an equation.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    /// Finitely many real roots, ascending.
    Discrete(Vec<f64>),
    /// The equation is an identity; every real number satisfies it.
    AllReals,
    /// No real number satisfies the equation.
    Empty,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solution::Discrete(roots) => {
                write!(f, "[")?;
                for (i, root) in roots.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", format_number(*root))?;
                }
                write!(f, "]")
            }
            Solution::AllReals => write!(f, "all real numbers"),
            Solution::Empty => write!(f, "[]"),
        }
    }
}

/// Format a value the way a person would write it: integral values without a
/// decimal point, everything else with Rust's shortest round-trip form.
///
/// Values within [`EPS`] of an integer are snapped first, so quadratic-formula
/// dust like `1.9999999999999998` prints as `2`.
pub fn format_number(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < EPS && rounded.abs() < 1e15 {
        // Normalise -0 so "[-0]" never reaches a response.
        format!("{}", (rounded + 0.0) as i64)
    } else {
        format!("{value}")
    }
}

/// Solve `lhs = rhs` for its single unknown.
///
/// The unknown is the union of free variables from both sides; when neither
/// side has one the equation is constant and solved over a nominal `x`.
/// Returns the variable name alongside the solution set so the caller can
/// report which symbol was solved for.
///
/// # Errors
/// [`SolveError`] when the equation has several unknowns, does not reduce to
/// a polynomial, or exceeds degree two.
pub fn solve_equation(lhs: &Expr, rhs: &Expr) -> Result<(String, Solution), SolveError> {
    let mut vars = lhs.free_variables();
    vars.extend(rhs.free_variables());

    if vars.len() > 1 {
        return Err(SolveError::Multivariate {
            count: vars.len(),
            names: vars.into_iter().collect::<Vec<_>>().join(", "),
        });
    }
    // A constant equation still gets solved over a nominal x.
    let var = vars.into_iter().next().unwrap_or_else(|| "x".to_string());

    let difference = Expr::sub(lhs.clone(), rhs.clone());
    let mut coeffs = polynomial(&difference, &var)?;
    trim(&mut coeffs);

    let solution = match coeffs.len() {
        // Every term cancelled: 0 = 0.
        0 => Solution::AllReals,
        // Non-zero constant: contradiction.
        1 => Solution::Empty,
        2 => Solution::Discrete(vec![-coeffs[0] / coeffs[1]]),
        3 => solve_quadratic(coeffs[0], coeffs[1], coeffs[2]),
        n => return Err(SolveError::DegreeTooHigh { degree: n - 1 }),
    };

    Ok((var, solution))
}

/// Real roots of `a*x^2 + b*x + c = 0` with `a != 0`, ascending.
fn solve_quadratic(c: f64, b: f64, a: f64) -> Solution {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -EPS {
        return Solution::Empty;
    }
    if discriminant.abs() <= EPS {
        return Solution::Discrete(vec![-b / (2.0 * a)]);
    }
    let sqrt_d = discriminant.sqrt();
    let mut roots = [(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)];
    roots.sort_by(f64::total_cmp);
    Solution::Discrete(roots.to_vec())
}

/// Dense coefficients of `expr` as a polynomial in `var` (index = power).
fn polynomial(expr: &Expr, var: &str) -> Result<Vec<f64>, SolveError> {
    match expr {
        Expr::Num(n) => Ok(vec![*n]),
        Expr::Var(name) => {
            if name == var {
                Ok(vec![0.0, 1.0])
            } else {
                // Unreachable after the free-variable check, but harmless.
                Err(SolveError::Multivariate {
                    count: 2,
                    names: format!("{var}, {name}"),
                })
            }
        }
        Expr::Neg(inner) => {
            let mut coeffs = polynomial(inner, var)?;
            for c in &mut coeffs {
                *c = -*c;
            }
            Ok(coeffs)
        }
        Expr::Add(a, b) => {
            let mut lhs = polynomial(a, var)?;
            let rhs = polynomial(b, var)?;
            add_into(&mut lhs, &rhs, 1.0);
            Ok(lhs)
        }
        Expr::Sub(a, b) => {
            let mut lhs = polynomial(a, var)?;
            let rhs = polynomial(b, var)?;
            add_into(&mut lhs, &rhs, -1.0);
            Ok(lhs)
        }
        Expr::Mul(a, b) => {
            let lhs = polynomial(a, var)?;
            let rhs = polynomial(b, var)?;
            Ok(convolve(&lhs, &rhs))
        }
        Expr::Div(a, b) => {
            // Only division by a non-zero constant keeps us polynomial.
            let mut divisor = polynomial(b, var)?;
            trim(&mut divisor);
            match divisor.as_slice() {
                [] => Err(SolveError::NotPolynomial {
                    var: var.to_string(),
                    detail: "division by zero".into(),
                }),
                [constant] => {
                    let mut coeffs = polynomial(a, var)?;
                    for c in &mut coeffs {
                        *c /= constant;
                    }
                    Ok(coeffs)
                }
                _ => Err(SolveError::NotPolynomial {
                    var: var.to_string(),
                    detail: format!("division by an expression containing {var}"),
                }),
            }
        }
        Expr::Pow(base, exp) => {
            let power = match exp.eval() {
                Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(MAX_EXPONENT) => v as u32,
                Ok(v) => {
                    return Err(SolveError::NotPolynomial {
                        var: var.to_string(),
                        detail: format!("exponent {} is not a small non-negative integer", v),
                    })
                }
                Err(_) => {
                    return Err(SolveError::NotPolynomial {
                        var: var.to_string(),
                        detail: format!("exponent contains {var}"),
                    })
                }
            };
            let base_coeffs = polynomial(base, var)?;
            let mut result = vec![1.0];
            for _ in 0..power {
                result = convolve(&result, &base_coeffs);
            }
            Ok(result)
        }
    }
}

/// `lhs += sign * rhs`, extending `lhs` as needed.
fn add_into(lhs: &mut Vec<f64>, rhs: &[f64], sign: f64) {
    if lhs.len() < rhs.len() {
        lhs.resize(rhs.len(), 0.0);
    }
    for (l, r) in lhs.iter_mut().zip(rhs) {
        *l += sign * r;
    }
}

/// Polynomial product.
fn convolve(lhs: &[f64], rhs: &[f64]) -> Vec<f64> {
    if lhs.is_empty() || rhs.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; lhs.len() + rhs.len() - 1];
    for (i, l) in lhs.iter().enumerate() {
        for (j, r) in rhs.iter().enumerate() {
            out[i + j] += l * r;
        }
    }
    out
}

/// Drop trailing coefficients within [`EPS`] of zero.
fn trim(coeffs: &mut Vec<f64>) {
    while coeffs.last().is_some_and(|c| c.abs() < EPS) {
        coeffs.pop();
    }
}
