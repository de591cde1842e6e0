use crate::core::groups::library::GroupLibrary;
use crate::core::heat_capacity::table::HeatCapacityTable;
use crate::core::models::candidate::Candidate;
use crate::core::models::hansen::{HansenReference, HansenTriple};
use crate::core::properties::estimator::PropertyEstimator;
use crate::engine::assembler::ModelAssembler;
use crate::engine::config::{DataSource, DesignConfig};
use crate::engine::error::{BestKnown, EngineError};
use crate::engine::expr::EvalError;
use crate::engine::model::{Assignment, DesignModel, VarId};
use crate::engine::oracle::{SolveResult, SolveStatus, SolverOracle};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Relative gap above which model and estimator values are reported as drifting.
const DRIFT_TOLERANCE: f64 = 1e-6;

/// The molecule an oracle returned.
///
/// Temperatures, density, RED and heat capacities are the oracle's values.
/// Molar mass, molar volume and the Hansen triple are re-estimated from the
/// fragment counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignedMolecule {
    pub candidate: Candidate,
    pub boiling_point: f64,
    pub melting_point: f64,
    pub molar_mass: f64,
    pub molar_volume: f64,
    pub density: f64,
    pub hansen: HansenTriple,
    pub red: f64,
    pub cp_low: f64,
    pub cp_high: f64,
    pub objective: f64,
}

impl DesignedMolecule {
    fn from_assignment(
        model: &DesignModel,
        assignment: &Assignment,
        objective: f64,
        estimator: &PropertyEstimator<'_>,
    ) -> Result<Self, EngineError> {
        let value = |id: VarId| assignment.get(id).copied().ok_or(EvalError::UnboundVariable(id));
        let handles = model.properties();
        let candidate = model.candidate(assignment);
        let estimated = estimator.estimate(&candidate)?;

        let molecule = Self {
            boiling_point: value(handles.boiling_point)?,
            melting_point: value(handles.melting_point)?,
            molar_mass: estimated.molar_mass,
            molar_volume: estimated.molar_volume,
            density: value(handles.density)?,
            hansen: estimated.hansen,
            red: value(handles.red)?,
            cp_low: value(handles.cp_low)?,
            cp_high: value(handles.cp_high)?,
            objective,
            candidate,
        };
        for (property, model_value, estimate) in [
            ("boiling point", molecule.boiling_point, estimated.boiling_point),
            ("melting point", molecule.melting_point, estimated.melting_point),
            ("density", molecule.density, estimated.density),
            ("RED", molecule.red, estimated.red),
        ] {
            if (model_value - estimate).abs() > DRIFT_TOLERANCE * estimate.abs().max(1.0) {
                warn!(
                    "Oracle {} {:.6} differs from the estimated {:.6}.",
                    property, model_value, estimate
                );
            }
        }
        Ok(molecule)
    }
}

impl fmt::Display for DesignedMolecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fragments:      {}", self.candidate)?;
        writeln!(f, "Boiling point:  {:.2} K", self.boiling_point)?;
        writeln!(f, "Melting point:  {:.2} K", self.melting_point)?;
        writeln!(f, "Molar mass:     {:.3} kg/kmol", self.molar_mass)?;
        writeln!(f, "Density:        {:.2} kg/m^3", self.density)?;
        writeln!(
            f,
            "Hansen (D,P,H): ({:.3}, {:.3}, {:.3}) MPa^0.5",
            self.hansen.dispersion, self.hansen.polar, self.hansen.hydrogen_bonding
        )?;
        writeln!(f, "RED:            {:.4}", self.red)?;
        writeln!(f, "Cp (313.15 K):  {:.2} J/(mol K)", self.cp_low)?;
        writeln!(f, "Cp (393.15 K):  {:.2} J/(mol K)", self.cp_high)?;
        write!(f, "Objective:      {:.4}", self.objective)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DesignReport {
    pub reference: HansenReference,
    pub molecule: DesignedMolecule,
}

fn load_tables(config: &DesignConfig) -> Result<(GroupLibrary, HeatCapacityTable), EngineError> {
    let library = match &config.groups {
        DataSource::Builtin => GroupLibrary::builtin()?,
        DataSource::File(path) => GroupLibrary::load(path)?,
    };
    let library = match &config.reference {
        Some(reference) => library.with_reference(reference.clone()),
        None => library,
    };
    let heat_capacity = match &config.heat_capacity {
        DataSource::Builtin => HeatCapacityTable::builtin()?,
        DataSource::File(path) => HeatCapacityTable::load(path)?,
    };
    Ok((library, heat_capacity))
}

fn best_known(model: &DesignModel, result: &SolveResult) -> Option<BestKnown> {
    let assignment = result.assignment.clone()?;
    let objective = match result.objective {
        Some(objective) => objective,
        None => model.objective_value(&assignment).ok()?,
    };
    Some(BestKnown {
        assignment,
        objective,
    })
}

/// Loads the tables, assembles one model and asks `oracle` to solve it.
///
/// The oracle's outcome is reported as is: an infeasible model, an exhausted
/// budget or a solver failure becomes the matching [`EngineError`] carrying
/// the best-known point, and nothing is retried.
#[instrument(skip_all, name = "design_workflow")]
pub fn run<O: SolverOracle + ?Sized>(config: &DesignConfig, oracle: &O) -> Result<DesignReport, EngineError> {
    info!("Starting design run: loading coefficient tables.");
    let (library, heat_capacity) = load_tables(config)?;

    let model = ModelAssembler::new(&library, &heat_capacity, &config.settings).assemble()?;
    info!(
        "Model assembled for reference '{}': {} fragments, {} constraints.",
        model.reference().name,
        model.fragment_variables().len(),
        model.constraints().len()
    );

    let result = oracle.solve(&model);
    debug!("Oracle returned status: {}", result.status);

    match &result.status {
        SolveStatus::Optimal => {
            let (Some(assignment), objective) = (&result.assignment, result.objective) else {
                return Err(EngineError::Solver {
                    message: "optimal status without a solution point".to_string(),
                    best_known: None,
                });
            };
            let objective = match objective {
                Some(objective) => objective,
                None => model.objective_value(assignment)?,
            };
            let estimator = PropertyEstimator::new(&library).with_log_floor(config.settings.log_floor);
            let molecule = DesignedMolecule::from_assignment(&model, assignment, objective, &estimator)?;
            info!("Design complete: {} (objective {:.4}).", molecule.candidate, objective);
            Ok(DesignReport {
                reference: model.reference().clone(),
                molecule,
            })
        }
        SolveStatus::Infeasible => {
            info!("The oracle proved the design model infeasible.");
            Err(EngineError::InfeasibleModel)
        }
        SolveStatus::TimeLimit => {
            warn!("The oracle hit its time limit.");
            Err(EngineError::SolverTimeout {
                best_known: best_known(&model, &result),
            })
        }
        SolveStatus::Error(message) => Err(EngineError::Solver {
            message: message.clone(),
            best_known: best_known(&model, &result),
        }),
    }
}

/// One independent [`run`] per reference species, results in input order.
#[instrument(skip_all, name = "reference_sweep")]
pub fn sweep_references<O: SolverOracle + ?Sized>(
    config: &DesignConfig,
    references: &[HansenReference],
    oracle: &O,
) -> Vec<Result<DesignReport, EngineError>> {
    info!("Sweeping {} reference species.", references.len());
    references
        .iter()
        .map(|reference| {
            let mut run_config = config.clone();
            run_config.reference = Some(reference.clone());
            run(&run_config, oracle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::groups::fixtures::groups_toml_with;
    use crate::core::groups::fragment::Fragment;
    use crate::core::properties::estimator::EstimationError;
    use crate::engine::config::DesignConfigBuilder;
    use crate::engine::exhaustive::ExhaustiveOracle;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    const TOLERANCE: f64 = 1e-3;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn groups_file(labels: &[&str]) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("groups.toml");
        fs::write(&path, groups_toml_with(labels)).unwrap();
        (dir, path)
    }

    fn config(path: PathBuf, max_total: u32) -> DesignConfig {
        DesignConfigBuilder::new()
            .groups(DataSource::File(path))
            .max_total(max_total)
            .build()
            .unwrap()
    }

    /// Replays a fixed outcome, pointing at a seeded candidate.
    struct ScriptedOracle {
        status: SolveStatus,
        point: Option<Candidate>,
    }

    impl SolverOracle for ScriptedOracle {
        fn solve(&self, model: &DesignModel) -> SolveResult {
            let assignment = self
                .point
                .as_ref()
                .map(|c| model.seed_assignment(c).unwrap());
            SolveResult {
                status: self.status.clone(),
                assignment,
                objective: None,
            }
        }
    }

    fn diol() -> Candidate {
        Candidate::new()
            .with(Fragment::Methylene, 1)
            .with(Fragment::Hydroxyl, 2)
    }

    #[test]
    fn run_reports_the_optimal_molecule() {
        let (_dir, path) = groups_file(&["CH3", "CH2", "OH"]);
        let report = run(&config(path, 6), &ExhaustiveOracle::new()).unwrap();

        assert_eq!(report.reference.name, "CO2");
        let m = &report.molecule;
        assert_eq!(m.candidate, diol());
        assert!(f64_approx_equal(m.boiling_point, 397.5303));
        assert!(f64_approx_equal(m.melting_point, 275.8295));
        assert!(f64_approx_equal(m.density, 1287.9893));
        assert!(f64_approx_equal(m.molar_mass, 48.042));
        assert!(f64_approx_equal(m.molar_volume, 0.0373));
        assert!(f64_approx_equal(m.hansen.dispersion, 16.0983));
        assert!(f64_approx_equal(m.hansen.polar, 10.3094));
        assert!(f64_approx_equal(m.hansen.hydrogen_bonding, 23.386));
        assert!(f64_approx_equal(m.red, 18.3109));
        assert!(f64_approx_equal(m.cp_low, 146.42));
        assert!(f64_approx_equal(m.cp_high, 170.76));
        assert!(f64_approx_equal(m.objective, 334.2029));
        assert!(m.to_string().starts_with("Fragments:      1xCH2 + 2xOH"));
    }

    #[test]
    fn infeasible_model_is_reported_without_retry() {
        let (_dir, path) = groups_file(&["CH3", "CH2"]);
        let result = run(&config(path, 6), &ExhaustiveOracle::new());
        assert!(matches!(result, Err(EngineError::InfeasibleModel)));
    }

    #[test]
    fn exhausted_budget_becomes_solver_timeout() {
        let (_dir, path) = groups_file(&["CH3", "CH2", "OH"]);
        let oracle = ExhaustiveOracle::new().with_node_limit(1);
        let result = run(&config(path, 6), &oracle);
        assert!(matches!(
            result,
            Err(EngineError::SolverTimeout { best_known: None })
        ));
    }

    #[test]
    fn timeout_carries_the_best_known_point() {
        let (_dir, path) = groups_file(&["CH3", "CH2", "OH"]);
        let oracle = ScriptedOracle {
            status: SolveStatus::TimeLimit,
            point: Some(diol()),
        };
        match run(&config(path, 6), &oracle) {
            Err(EngineError::SolverTimeout {
                best_known: Some(best),
            }) => assert!(f64_approx_equal(best.objective, 334.2029)),
            other => panic!("expected SolverTimeout with a point, got {:?}", other),
        }
    }

    #[test]
    fn solver_error_is_surfaced_verbatim() {
        let (_dir, path) = groups_file(&["CH3", "CH2", "OH"]);
        let oracle = ScriptedOracle {
            status: SolveStatus::Error("license expired".to_string()),
            point: None,
        };
        match run(&config(path, 6), &oracle) {
            Err(EngineError::Solver {
                message,
                best_known: None,
            }) => assert_eq!(message, "license expired"),
            other => panic!("expected Solver error, got {:?}", other),
        }
    }

    #[test]
    fn data_errors_halt_before_any_solve() {
        let dir = tempdir().unwrap();
        let config = config(dir.path().join("absent.toml"), 6);
        let oracle = ScriptedOracle {
            status: SolveStatus::Optimal,
            point: None,
        };
        assert!(matches!(run(&config, &oracle), Err(EngineError::Library { .. })));
    }

    #[test]
    fn optimal_status_without_a_point_is_a_solver_error() {
        let (_dir, path) = groups_file(&["CH3", "CH2", "OH"]);
        let oracle = ScriptedOracle {
            status: SolveStatus::Optimal,
            point: None,
        };
        assert!(matches!(
            run(&config(path, 6), &oracle),
            Err(EngineError::Solver { .. })
        ));
    }

    #[test]
    fn returned_point_outside_the_estimator_domain_is_an_estimation_error() {
        let (_dir, path) = groups_file(&["CH3", "CH2", "OH"]);
        let oracle = ScriptedOracle {
            status: SolveStatus::Optimal,
            point: Some(Candidate::new()),
        };
        assert!(matches!(
            run(&config(path, 6), &oracle),
            Err(EngineError::Estimation {
                source: EstimationError::NumericDomainViolation { .. }
            })
        ));
    }

    #[test]
    fn sweep_runs_one_model_per_reference_in_order() {
        let (_dir, path) = groups_file(&["CH3", "CH2", "OH"]);
        let references = vec![
            HansenReference::new("CO2", HansenTriple::new(15.0, 5.0, 6.0)),
            HansenReference::new("H2S", HansenTriple::new(17.0, 6.0, 10.2)),
        ];
        let reports = sweep_references(&config(path, 6), &references, &ExhaustiveOracle::new());

        assert_eq!(reports.len(), 2);
        let names: Vec<String> = reports
            .iter()
            .map(|r| r.as_ref().unwrap().reference.name.clone())
            .collect();
        assert_eq!(names, vec!["CO2", "H2S"]);
        let co2 = &reports[0].as_ref().unwrap().molecule;
        let h2s = &reports[1].as_ref().unwrap().molecule;
        assert!(f64_approx_equal(co2.objective, 334.2029));
        assert!(h2s.red != co2.red);
    }
}
