use super::expr::{EvalError, Expr};
use crate::core::groups::fragment::Fragment;
use crate::core::models::candidate::Candidate;
use crate::core::models::hansen::HansenReference;
use crate::core::models::sense::Sense;
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use std::fmt;

new_key_type! {
    /// Handle of a decision or auxiliary variable in a [`DesignModel`].
    pub struct VarId;
}

/// Values of (some of) the model variables.
pub type Assignment = SecondaryMap<VarId, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Integer,
    Continuous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Starting-point definition in terms of earlier variables. Advice for
    /// oracles, not a constraint.
    pub seed: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub body: Expr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied(&self, assignment: &Assignment, tolerance: f64) -> Result<bool, EvalError> {
        Ok(self.sense.holds(self.body.eval(assignment)?, self.rhs, tolerance))
    }
}

/// Variables holding the derived properties of the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyHandles {
    pub boiling_point: VarId,
    pub melting_point: VarId,
    pub molar_mass: VarId,
    pub molar_volume: VarId,
    pub density: VarId,
    pub red: VarId,
    pub cp_low: VarId,
    pub cp_high: VarId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelViolation {
    Constraint {
        name: String,
        value: f64,
        sense: Sense,
        rhs: f64,
    },
    Bound {
        variable: String,
        value: f64,
        lower: Option<f64>,
        upper: Option<f64>,
    },
    Integrality {
        variable: String,
        value: f64,
    },
}

impl fmt::Display for ModelViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelViolation::Constraint {
                name,
                value,
                sense,
                rhs,
            } => write!(f, "{}: {} {} {} does not hold", name, value, sense, rhs),
            ModelViolation::Bound {
                variable,
                value,
                lower,
                upper,
            } => write!(
                f,
                "{} = {} is outside [{:?}, {:?}]",
                variable, value, lower, upper
            ),
            ModelViolation::Integrality { variable, value } => {
                write!(f, "{} = {} is not integral", variable, value)
            }
        }
    }
}

/// A complete, self-contained optimization model: minimize `objective`
/// subject to `constraints` and variable bounds.
///
/// Built once per run by the assembler and handed by reference to a
/// [`SolverOracle`](super::oracle::SolverOracle).
#[derive(Debug, Clone)]
pub struct DesignModel {
    pub(crate) variables: SlotMap<VarId, Variable>,
    pub(crate) order: Vec<VarId>,
    pub(crate) fragments: Vec<(Fragment, VarId)>,
    pub(crate) properties: PropertyHandles,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) objective: Expr,
    pub(crate) reference: HansenReference,
}

impl DesignModel {
    /// Variables in creation order.
    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> + '_ {
        self.order.iter().map(move |&id| (id, &self.variables[id]))
    }

    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id)
    }

    pub fn fragment_variables(&self) -> &[(Fragment, VarId)] {
        &self.fragments
    }

    pub fn fragment_variable(&self, fragment: Fragment) -> Option<VarId> {
        self.fragments
            .iter()
            .find(|(f, _)| *f == fragment)
            .map(|&(_, id)| id)
    }

    pub fn properties(&self) -> &PropertyHandles {
        &self.properties
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Expression to minimize.
    pub fn objective(&self) -> &Expr {
        &self.objective
    }

    pub fn reference(&self) -> &HansenReference {
        &self.reference
    }

    /// Fills every unset variable from its seed expression, in creation order.
    pub fn complete_from_seeds(&self, assignment: &mut Assignment) -> Result<(), EvalError> {
        for &id in &self.order {
            if assignment.contains_key(id) {
                continue;
            }
            if let Some(seed) = &self.variables[id].seed {
                let value = seed.eval(assignment)?;
                assignment.insert(id, value);
            }
        }
        Ok(())
    }

    /// Fragment counts taken from `candidate`, every other variable from its
    /// seed. Fragments of `candidate` without a model variable are ignored.
    pub fn seed_assignment(&self, candidate: &Candidate) -> Result<Assignment, EvalError> {
        let mut assignment = Assignment::new();
        for &(fragment, id) in &self.fragments {
            assignment.insert(id, f64::from(candidate.count(fragment)));
        }
        self.complete_from_seeds(&mut assignment)?;
        Ok(assignment)
    }

    /// Every bound, integrality and constraint violated by `assignment`.
    pub fn violations(&self, assignment: &Assignment, tolerance: f64) -> Result<Vec<ModelViolation>, EvalError> {
        let mut violations = Vec::new();

        for (id, variable) in self.variables() {
            let value = *assignment.get(id).ok_or(EvalError::UnboundVariable(id))?;
            let below = variable.lower.is_some_and(|l| value < l - tolerance);
            let above = variable.upper.is_some_and(|u| value > u + tolerance);
            if below || above {
                violations.push(ModelViolation::Bound {
                    variable: variable.name.clone(),
                    value,
                    lower: variable.lower,
                    upper: variable.upper,
                });
            }
            if variable.domain == Domain::Integer && (value - value.round()).abs() > tolerance {
                violations.push(ModelViolation::Integrality {
                    variable: variable.name.clone(),
                    value,
                });
            }
        }

        for constraint in &self.constraints {
            let value = constraint.body.eval(assignment)?;
            if !constraint.sense.holds(value, constraint.rhs, tolerance) {
                violations.push(ModelViolation::Constraint {
                    name: constraint.name.clone(),
                    value,
                    sense: constraint.sense,
                    rhs: constraint.rhs,
                });
            }
        }

        Ok(violations)
    }

    pub fn objective_value(&self, assignment: &Assignment) -> Result<f64, EvalError> {
        self.objective.eval(assignment)
    }

    /// Rounds the fragment variables of `assignment` to a candidate.
    pub fn candidate(&self, assignment: &Assignment) -> Candidate {
        self.fragments
            .iter()
            .filter_map(|&(fragment, id)| {
                let value = assignment.get(id)?.round();
                (value >= 1.0).then_some((fragment, value as u32))
            })
            .collect()
    }
}
