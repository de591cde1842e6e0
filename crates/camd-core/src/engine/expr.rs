use super::model::{Assignment, VarId};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("Variable {0:?} has no value in the assignment")]
    UnboundVariable(VarId),
    #[error("Numeric domain violation: {operation} of {argument}")]
    NumericDomainViolation {
        operation: &'static str,
        argument: f64,
    },
    #[error("Expression evaluated to a non-finite value ({0})")]
    NonFinite(f64),
}

/// Algebraic expression over model variables.
///
/// Large enough for the group-contribution model (weighted sums, logarithms,
/// squares, a product and a reciprocal) and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(f64),
    Variable(VarId),
    Sum(Vec<Expr>),
    Scale(f64, Box<Expr>),
    Product(Box<Expr>, Box<Expr>),
    Powi(Box<Expr>, i32),
    Ln(Box<Expr>),
    Sqrt(Box<Expr>),
}

/// `constant + sum coefficient * variable`, with one term per variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearForm {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearForm {
    pub fn evaluate(&self, assignment: &Assignment) -> Result<f64, EvalError> {
        let mut value = self.constant;
        for &(var, coefficient) in &self.terms {
            let x = assignment.get(var).ok_or(EvalError::UnboundVariable(var))?;
            value += coefficient * x;
        }
        Ok(value)
    }
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn var(id: VarId) -> Self {
        Expr::Variable(id)
    }

    pub fn sum<I: IntoIterator<Item = Expr>>(terms: I) -> Self {
        Expr::Sum(terms.into_iter().collect())
    }

    /// `sum coefficient * variable`, skipping zero coefficients.
    pub fn linear<I: IntoIterator<Item = (VarId, f64)>>(terms: I) -> Self {
        Expr::Sum(
            terms
                .into_iter()
                .filter(|&(_, c)| c != 0.0)
                .map(|(v, c)| Expr::Scale(c, Box::new(Expr::Variable(v))))
                .collect(),
        )
    }

    pub fn scale(self, factor: f64) -> Self {
        Expr::Scale(factor, Box::new(self))
    }

    pub fn plus(self, other: Expr) -> Self {
        Expr::Sum(vec![self, other])
    }

    pub fn minus(self, other: Expr) -> Self {
        Expr::Sum(vec![self, other.scale(-1.0)])
    }

    pub fn times(self, other: Expr) -> Self {
        Expr::Product(Box::new(self), Box::new(other))
    }

    pub fn powi(self, exponent: i32) -> Self {
        Expr::Powi(Box::new(self), exponent)
    }

    pub fn ln(self) -> Self {
        Expr::Ln(Box::new(self))
    }

    pub fn sqrt(self) -> Self {
        Expr::Sqrt(Box::new(self))
    }

    pub fn eval(&self, assignment: &Assignment) -> Result<f64, EvalError> {
        let value = match self {
            Expr::Constant(c) => *c,
            Expr::Variable(v) => *assignment.get(*v).ok_or(EvalError::UnboundVariable(*v))?,
            Expr::Sum(terms) => {
                let mut total = 0.0;
                for term in terms {
                    total += term.eval(assignment)?;
                }
                total
            }
            Expr::Scale(factor, inner) => factor * inner.eval(assignment)?,
            Expr::Product(a, b) => a.eval(assignment)? * b.eval(assignment)?,
            Expr::Powi(inner, exponent) => {
                let base = inner.eval(assignment)?;
                if *exponent < 0 && base == 0.0 {
                    return Err(EvalError::NumericDomainViolation {
                        operation: "division",
                        argument: base,
                    });
                }
                base.powi(*exponent)
            }
            Expr::Ln(inner) => {
                let argument = inner.eval(assignment)?;
                if !(argument > 0.0) {
                    return Err(EvalError::NumericDomainViolation {
                        operation: "ln",
                        argument,
                    });
                }
                argument.ln()
            }
            Expr::Sqrt(inner) => {
                let argument = inner.eval(assignment)?;
                if !(argument >= 0.0) {
                    return Err(EvalError::NumericDomainViolation {
                        operation: "sqrt",
                        argument,
                    });
                }
                argument.sqrt()
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::NonFinite(value))
        }
    }

    /// Flattens the expression if it is affine in the variables.
    ///
    /// Nonlinear nodes are accepted only when their operands are constant.
    pub fn linear_form(&self) -> Option<LinearForm> {
        let mut terms = BTreeMap::new();
        let constant = self.accumulate(1.0, &mut terms)?;
        Some(LinearForm {
            terms: terms.into_iter().filter(|&(_, c)| c != 0.0).collect(),
            constant,
        })
    }

    fn accumulate(&self, factor: f64, terms: &mut BTreeMap<VarId, f64>) -> Option<f64> {
        match self {
            Expr::Constant(c) => Some(factor * c),
            Expr::Variable(v) => {
                *terms.entry(*v).or_insert(0.0) += factor;
                Some(0.0)
            }
            Expr::Sum(items) => {
                let mut constant = 0.0;
                for item in items {
                    constant += item.accumulate(factor, terms)?;
                }
                Some(constant)
            }
            Expr::Scale(c, inner) => inner.accumulate(factor * c, terms),
            Expr::Product(a, b) => {
                let (a, b) = (a.linear_form()?, b.linear_form()?);
                let (constant, other) = match (a.terms.is_empty(), b.terms.is_empty()) {
                    (true, _) => (a.constant, b),
                    (_, true) => (b.constant, a),
                    _ => return None,
                };
                for (v, c) in other.terms {
                    *terms.entry(v).or_insert(0.0) += factor * constant * c;
                }
                Some(factor * constant * other.constant)
            }
            Expr::Powi(inner, 1) => inner.accumulate(factor, terms),
            Expr::Powi(_, 0) => Some(factor),
            Expr::Powi(..) | Expr::Ln(_) | Expr::Sqrt(_) => {
                self.constant_operand()?;
                Some(factor * self.eval(&Assignment::new()).ok()?)
            }
        }
    }

    fn constant_operand(&self) -> Option<LinearForm> {
        let inner = match self {
            Expr::Powi(inner, _) | Expr::Ln(inner) | Expr::Sqrt(inner) => inner,
            _ => return None,
        };
        inner.linear_form().filter(|form| form.terms.is_empty())
    }

    /// Variables referenced anywhere in the expression.
    pub fn variables(&self) -> Vec<VarId> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found.sort();
        found.dedup();
        found
    }

    fn collect_variables(&self, found: &mut Vec<VarId>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Variable(v) => found.push(*v),
            Expr::Sum(items) => items.iter().for_each(|item| item.collect_variables(found)),
            Expr::Scale(_, inner) | Expr::Powi(inner, _) | Expr::Ln(inner) | Expr::Sqrt(inner) => {
                inner.collect_variables(found)
            }
            Expr::Product(a, b) => {
                a.collect_variables(found);
                b.collect_variables(found);
            }
        }
    }
}
