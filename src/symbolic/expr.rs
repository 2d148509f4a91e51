//! The expression tree: structure, display, free variables, numeric eval.

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A parsed algebraic expression.
///
/// Variables are named by the letter runs the normalizer leaves adjacent
/// (usually a single letter; `yz` survives as one name when the pairing pass
/// skipped it). Numbers are `f64` throughout — the OCR alphabet cannot
/// express anything a double will not hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

/// Errors from numeric evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The expression references a variable, so it has no numeric value.
    #[error("expression contains the free variable '{name}'")]
    FreeVariable { name: String },

    /// Division by zero or an operation that left the reals (e.g. `(-1)**0.5`).
    #[error("expression has no finite value ({operation})")]
    NotFinite { operation: &'static str },
}

impl Expr {
    /// Collect the free variable names, sorted and deduplicated.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeSet<String>) {
        match self {
            Expr::Num(_) => {}
            Expr::Var(name) => {
                vars.insert(name.clone());
            }
            Expr::Neg(inner) => inner.collect_variables(vars),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => {
                a.collect_variables(vars);
                b.collect_variables(vars);
            }
        }
    }

    /// Evaluate a closed expression to a number.
    ///
    /// # Errors
    /// [`EvalError::FreeVariable`] when any variable appears;
    /// [`EvalError::NotFinite`] when the arithmetic leaves the finite reals.
    pub fn eval(&self) -> Result<f64, EvalError> {
        let value = match self {
            Expr::Num(n) => *n,
            Expr::Var(name) => {
                return Err(EvalError::FreeVariable { name: name.clone() });
            }
            Expr::Neg(inner) => -inner.eval()?,
            Expr::Add(a, b) => a.eval()? + b.eval()?,
            Expr::Sub(a, b) => a.eval()? - b.eval()?,
            Expr::Mul(a, b) => a.eval()? * b.eval()?,
            Expr::Div(a, b) => {
                let denom = b.eval()?;
                if denom == 0.0 {
                    return Err(EvalError::NotFinite {
                        operation: "division by zero",
                    });
                }
                a.eval()? / denom
            }
            Expr::Pow(base, exp) => base.eval()?.powf(exp.eval()?),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NotFinite {
                operation: "overflow or invalid power",
            })
        }
    }

    /// Binding strength for display parenthesization.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(..) => 3,
            Expr::Pow(..) => 4,
            Expr::Num(_) | Expr::Var(_) => 5,
        }
    }

    fn fmt_child(&self, child: &Expr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.precedence() < self.precedence() {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(n) => write!(f, "{}", super::solve::format_number(*n)),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Neg(inner) => {
                write!(f, "-")?;
                self.fmt_child(inner, f)
            }
            Expr::Add(a, b) => {
                self.fmt_child(a, f)?;
                write!(f, "+")?;
                self.fmt_child(b, f)
            }
            Expr::Sub(a, b) => {
                self.fmt_child(a, f)?;
                write!(f, "-")?;
                // `a-(b+c)` must keep its parentheses even at equal precedence.
                if b.precedence() <= self.precedence() {
                    write!(f, "({b})")
                } else {
                    write!(f, "{b}")
                }
            }
            Expr::Mul(a, b) => {
                self.fmt_child(a, f)?;
                write!(f, "*")?;
                self.fmt_child(b, f)
            }
            Expr::Div(a, b) => {
                self.fmt_child(a, f)?;
                write!(f, "/")?;
                if b.precedence() <= self.precedence() {
                    write!(f, "({b})")
                } else {
                    write!(f, "{b}")
                }
            }
            Expr::Pow(base, exp) => {
                if base.precedence() <= self.precedence() {
                    write!(f, "({base})")?;
                } else {
                    write!(f, "{base}")?;
                }
                write!(f, "**")?;
                self.fmt_child(exp, f)
            }
        }
    }
}

// Construction shorthand used by the parser and the solver tests.
impl Expr {
    pub fn num(n: f64) -> Self {
        Expr::Num(n)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn add(a: Expr, b: Expr) -> Self {
        Expr::Add(Box::new(a), Box::new(b))
    }

    pub fn sub(a: Expr, b: Expr) -> Self {
        Expr::Sub(Box::new(a), Box::new(b))
    }

    pub fn mul(a: Expr, b: Expr) -> Self {
        Expr::Mul(Box::new(a), Box::new(b))
    }

    pub fn div(a: Expr, b: Expr) -> Self {
        Expr::Div(Box::new(a), Box::new(b))
    }

    pub fn pow(base: Expr, exp: Expr) -> Self {
        Expr::Pow(Box::new(base), Box::new(exp))
    }

    pub fn neg(inner: Expr) -> Self {
        Expr::Neg(Box::new(inner))
    }
}
