use super::model::{Assignment, DesignModel};
use std::fmt;

/// How the oracle's search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    /// Budget exhausted; the result may still carry the best point found.
    TimeLimit,
    Error(String),
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => f.write_str("optimal"),
            SolveStatus::Infeasible => f.write_str("infeasible"),
            SolveStatus::TimeLimit => f.write_str("time limit"),
            SolveStatus::Error(message) => write!(f, "solver error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// Values of every model variable at the returned point, if any.
    pub assignment: Option<Assignment>,
    pub objective: Option<f64>,
}

impl SolveResult {
    pub fn without_point(status: SolveStatus) -> Self {
        Self {
            status,
            assignment: None,
            objective: None,
        }
    }
}

/// External optimizer exploring the feasible region of a [`DesignModel`].
///
/// The model is read-only; an oracle reports what it found and never
/// alters the problem.
pub trait SolverOracle {
    fn solve(&self, model: &DesignModel) -> SolveResult;
}

impl<T: SolverOracle + ?Sized> SolverOracle for &T {
    fn solve(&self, model: &DesignModel) -> SolveResult {
        (**self).solve(model)
    }
}
