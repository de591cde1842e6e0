use super::model::{Assignment, DesignModel, Domain, VarId};
use super::oracle::{SolveResult, SolveStatus, SolverOracle};
use crate::core::models::sense::Sense;
use std::time::{Duration, Instant};
use tracing::{info, trace, warn};

/// Reference oracle: depth-first enumeration of every integer variable within
/// its bounds, continuous variables fixed from their seeds.
///
/// Linear rows over integer variables only are checked on partial assignments
/// with interval arithmetic, which prunes most of the tree for the structural
/// rules. Complete points are accepted when [`DesignModel::violations`] is
/// empty. Exact for models whose continuous variables are determined by their
/// seeds, which is the case for everything the assembler builds.
#[derive(Debug, Clone, PartialEq)]
pub struct ExhaustiveOracle {
    pub tolerance: f64,
    pub node_limit: Option<u64>,
    pub time_limit: Option<Duration>,
}

impl Default for ExhaustiveOracle {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            node_limit: None,
            time_limit: None,
        }
    }
}

impl ExhaustiveOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// `constant + sum coefficients[i] * x[i]  (sense)  rhs` over the integer
/// variables in search order.
struct IntegerRow {
    coefficients: Vec<f64>,
    constant: f64,
    sense: Sense,
    rhs: f64,
}

struct Search<'m> {
    model: &'m DesignModel,
    oracle: &'m ExhaustiveOracle,
    integers: Vec<(VarId, i64, i64)>,
    rows: Vec<IntegerRow>,
    values: Vec<i64>,
    nodes: u64,
    leaves: u64,
    started: Instant,
    exhausted: bool,
    best: Option<(f64, Assignment)>,
}

impl<'m> Search<'m> {
    fn prepare(model: &'m DesignModel, oracle: &'m ExhaustiveOracle) -> Result<Self, String> {
        let mut integers = Vec::new();
        for (id, variable) in model.variables() {
            match variable.domain {
                Domain::Integer => {
                    let (Some(lower), Some(upper)) = (variable.lower, variable.upper) else {
                        return Err(format!("integer variable '{}' is unbounded", variable.name));
                    };
                    integers.push((id, lower.ceil() as i64, upper.floor() as i64));
                }
                Domain::Continuous if variable.seed.is_none() => {
                    return Err(format!(
                        "continuous variable '{}' has no seed to fix it from",
                        variable.name
                    ));
                }
                Domain::Continuous => {}
            }
        }

        let position = |id: VarId| integers.iter().position(|&(v, _, _)| v == id);
        let mut rows = Vec::new();
        'rows: for constraint in model.constraints() {
            let Some(form) = constraint.body.linear_form() else {
                continue;
            };
            let mut coefficients = vec![0.0; integers.len()];
            for &(id, a) in &form.terms {
                match position(id) {
                    Some(i) => coefficients[i] = a,
                    None => continue 'rows,
                }
            }
            rows.push(IntegerRow {
                coefficients,
                constant: form.constant,
                sense: constraint.sense,
                rhs: constraint.rhs,
            });
        }

        let values = vec![0; integers.len()];
        Ok(Self {
            model,
            oracle,
            integers,
            rows,
            values,
            nodes: 0,
            leaves: 0,
            started: Instant::now(),
            exhausted: false,
            best: None,
        })
    }

    fn over_budget(&self) -> bool {
        self.oracle.node_limit.is_some_and(|limit| self.nodes > limit)
            || self
                .oracle
                .time_limit
                .is_some_and(|limit| self.started.elapsed() > limit)
    }

    /// Whether every integer row can still hold once `values[..depth]` is fixed.
    fn can_hold(&self, depth: usize) -> bool {
        let tolerance = self.oracle.tolerance;
        self.rows.iter().all(|row| {
            let mut low = row.constant;
            let mut high = row.constant;
            for (i, &a) in row.coefficients.iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                if i < depth {
                    let fixed = a * self.values[i] as f64;
                    low += fixed;
                    high += fixed;
                } else {
                    let (_, lo, hi) = self.integers[i];
                    let (x, y) = (a * lo as f64, a * hi as f64);
                    low += x.min(y);
                    high += x.max(y);
                }
            }
            match row.sense {
                Sense::Equal => low <= row.rhs + tolerance && high >= row.rhs - tolerance,
                Sense::LessOrEqual => low <= row.rhs + tolerance,
                Sense::GreaterOrEqual => high >= row.rhs - tolerance,
            }
        })
    }

    fn descend(&mut self, depth: usize) {
        self.nodes += 1;
        if self.over_budget() {
            self.exhausted = true;
            return;
        }
        if !self.can_hold(depth) {
            return;
        }
        if depth == self.integers.len() {
            self.evaluate_leaf();
            return;
        }
        let (_, lo, hi) = self.integers[depth];
        for value in lo..=hi {
            self.values[depth] = value;
            self.descend(depth + 1);
            if self.exhausted {
                return;
            }
        }
    }

    fn evaluate_leaf(&mut self) {
        self.leaves += 1;
        let mut assignment = Assignment::new();
        for (&(id, _, _), &value) in self.integers.iter().zip(&self.values) {
            assignment.insert(id, value as f64);
        }
        if let Err(e) = self.model.complete_from_seeds(&mut assignment) {
            trace!("Point {:?} rejected while seeding: {}", self.values, e);
            return;
        }
        let feasible = match self.model.violations(&assignment, self.oracle.tolerance) {
            Ok(violations) => violations.is_empty(),
            Err(e) => {
                trace!("Point {:?} rejected while checking: {}", self.values, e);
                false
            }
        };
        if !feasible {
            return;
        }
        let Ok(objective) = self.model.objective_value(&assignment) else {
            return;
        };
        trace!("Feasible point {:?} with objective {}", self.values, objective);
        if self.best.as_ref().is_none_or(|(incumbent, _)| objective < *incumbent) {
            self.best = Some((objective, assignment));
        }
    }
}

impl SolverOracle for ExhaustiveOracle {
    fn solve(&self, model: &DesignModel) -> SolveResult {
        let mut search = match Search::prepare(model, self) {
            Ok(search) => search,
            Err(message) => return SolveResult::without_point(SolveStatus::Error(message)),
        };
        info!(
            "Enumerating {} integer variables under {} linear integer rows.",
            search.integers.len(),
            search.rows.len()
        );

        search.descend(0);

        let status = if search.exhausted {
            warn!(
                "Search budget exhausted after {} nodes ({} complete points).",
                search.nodes, search.leaves
            );
            SolveStatus::TimeLimit
        } else if search.best.is_some() {
            SolveStatus::Optimal
        } else {
            SolveStatus::Infeasible
        };
        info!(
            "Search finished: {} after {} nodes, {} complete points.",
            status, search.nodes, search.leaves
        );

        match search.best {
            Some((objective, assignment)) => SolveResult {
                status,
                assignment: Some(assignment),
                objective: Some(objective),
            },
            None => SolveResult::without_point(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feasibility::FeasibilityLimits;
    use crate::core::groups::fixtures::library_with;
    use crate::core::groups::fragment::Fragment;
    use crate::core::heat_capacity::table::HeatCapacityTable;
    use crate::core::models::candidate::Candidate;
    use crate::engine::assembler::ModelAssembler;
    use crate::engine::config::ModelSettings;

    fn model_for(labels: &[&str], max_total: u32) -> DesignModel {
        let library = library_with(labels);
        let table = HeatCapacityTable::builtin().unwrap();
        let settings = ModelSettings {
            limits: FeasibilityLimits {
                max_total,
                ..FeasibilityLimits::default()
            },
            ..ModelSettings::default()
        };
        ModelAssembler::new(&library, &table, &settings).assemble().unwrap()
    }

    #[test]
    fn finds_the_diol_optimum_on_a_three_fragment_vocabulary() {
        let model = model_for(&["CH3", "CH2", "OH"], 6);
        let result = ExhaustiveOracle::new().solve(&model);

        assert_eq!(result.status, SolveStatus::Optimal);
        let assignment = result.assignment.unwrap();
        assert_eq!(
            model.candidate(&assignment),
            Candidate::new()
                .with(Fragment::Methylene, 1)
                .with(Fragment::Hydroxyl, 2)
        );
        let objective = result.objective.unwrap();
        assert!((objective - 334.2029).abs() < 1e-3);
        assert!((assignment[model.properties().boiling_point] - 397.5303).abs() < 1e-3);
    }

    #[test]
    fn reports_infeasible_when_no_alkane_fits_the_size_bound() {
        // Tb >= 393 K needs at least octane, which has eight fragments.
        let model = model_for(&["CH3", "CH2"], 6);
        let result = ExhaustiveOracle::new().solve(&model);
        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.assignment.is_none());
        assert!(result.objective.is_none());
    }

    #[test]
    fn octane_is_the_only_alkane_within_eight_fragments() {
        let model = model_for(&["CH3", "CH2"], 8);
        let result = ExhaustiveOracle::new().solve(&model);
        assert_eq!(result.status, SolveStatus::Optimal);
        let assignment = result.assignment.unwrap();
        assert_eq!(
            model.candidate(&assignment),
            Candidate::new()
                .with(Fragment::Methyl, 2)
                .with(Fragment::Methylene, 6)
        );
    }

    #[test]
    fn node_limit_stops_the_search_with_time_limit_status() {
        let model = model_for(&["CH3", "CH2", "OH"], 6);
        let result = ExhaustiveOracle::new().with_node_limit(1).solve(&model);
        assert_eq!(result.status, SolveStatus::TimeLimit);
        assert!(result.assignment.is_none());
    }

    #[test]
    fn budget_exhaustion_keeps_the_best_point_found_so_far() {
        let model = model_for(&["CH3", "CH2", "OH"], 6);
        let full = ExhaustiveOracle::new().solve(&model);
        let mut limit = 1;
        let partial = loop {
            let result = ExhaustiveOracle::new().with_node_limit(limit).solve(&model);
            if result.status == SolveStatus::TimeLimit && result.assignment.is_some() {
                break result;
            }
            assert_eq!(result.status, SolveStatus::TimeLimit, "search completed before a point was kept");
            limit += 1;
        };
        assert!(partial.objective.unwrap() >= full.objective.unwrap());
    }

    #[test]
    fn unseeded_continuous_variable_is_a_solver_error() {
        let mut model = model_for(&["CH3", "CH2"], 8);
        let red = model.properties().red;
        model.variables[red].seed = None;
        let result = ExhaustiveOracle::new().solve(&model);
        assert!(matches!(result.status, SolveStatus::Error(message) if message.contains("red")));
    }

    #[test]
    fn unbounded_integer_variable_is_a_solver_error() {
        let mut model = model_for(&["CH3", "CH2"], 8);
        let (_, id) = model.fragment_variables()[0];
        model.variables[id].upper = None;
        let result = ExhaustiveOracle::new().solve(&model);
        assert!(matches!(result.status, SolveStatus::Error(_)));
    }
}
