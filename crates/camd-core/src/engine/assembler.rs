use super::config::ModelSettings;
use super::expr::Expr;
use super::model::{Constraint, DesignModel, Domain, PropertyHandles, VarId, Variable};
use crate::core::feasibility::FeasibilityChecker;
use crate::core::groups::fragment::{Fragment, Property};
use crate::core::groups::library::{GroupLibrary, MissingCoefficient};
use crate::core::heat_capacity::aggregator::HeatCapacityAggregator;
use crate::core::heat_capacity::basis::ReferenceTemperature;
use crate::core::heat_capacity::table::HeatCapacityTable;
use crate::core::models::sense::Sense;
use crate::core::properties::estimator::PropertyEstimator;
use slotmap::SlotMap;
use tracing::debug;

/// Builds one [`DesignModel`] from immutable tables and settings.
///
/// Coefficient vectors and the log floor come from the [`PropertyEstimator`],
/// so a seeded model point reproduces the estimator exactly.
///
/// Second-order corrections are not part of the model: their occurrence
/// counts cannot be expressed through fragment counts alone.
pub struct ModelAssembler<'a> {
    library: &'a GroupLibrary,
    estimator: PropertyEstimator<'a>,
    heat_capacity: &'a HeatCapacityTable,
    settings: &'a ModelSettings,
}

struct Builder {
    variables: SlotMap<VarId, Variable>,
    order: Vec<VarId>,
    constraints: Vec<Constraint>,
}

impl Builder {
    fn add_variable(&mut self, variable: Variable) -> VarId {
        let id = self.variables.insert(variable);
        self.order.push(id);
        id
    }

    fn continuous(&mut self, name: &str, lower: Option<f64>, seed: Expr) -> VarId {
        self.add_variable(Variable {
            name: name.to_string(),
            domain: Domain::Continuous,
            lower,
            upper: None,
            seed: Some(seed),
        })
    }

    fn constrain(&mut self, name: impl Into<String>, body: Expr, sense: Sense, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            body,
            sense,
            rhs,
        });
    }
}

impl<'a> ModelAssembler<'a> {
    pub fn new(
        library: &'a GroupLibrary,
        heat_capacity: &'a HeatCapacityTable,
        settings: &'a ModelSettings,
    ) -> Self {
        Self {
            library,
            estimator: PropertyEstimator::new(library).with_log_floor(settings.log_floor),
            heat_capacity,
            settings,
        }
    }

    fn linear_over(fragments: &[(Fragment, VarId)], coefficients: Vec<(Fragment, f64)>) -> Expr {
        Expr::linear(coefficients.into_iter().filter_map(|(fragment, c)| {
            fragments
                .iter()
                .find(|(f, _)| *f == fragment)
                .map(|&(_, id)| (id, c))
        }))
    }

    fn contribution_sum(
        &self,
        fragments: &[(Fragment, VarId)],
        coefficient: impl Fn(Fragment) -> Result<f64, MissingCoefficient>,
    ) -> Result<Expr, MissingCoefficient> {
        let mut terms = Vec::with_capacity(fragments.len());
        for &(fragment, id) in fragments {
            terms.push((id, coefficient(fragment)?));
        }
        Ok(Expr::linear(terms))
    }

    fn property_sum(&self, fragments: &[(Fragment, VarId)], property: Property) -> Result<Expr, MissingCoefficient> {
        Ok(Self::linear_over(fragments, self.estimator.coefficient_vector(property)?))
    }

    pub fn assemble(&self) -> Result<DesignModel, MissingCoefficient> {
        let settings = self.settings;
        let constants = self.library.constants();
        let reference = self.library.reference().clone();
        let checker = FeasibilityChecker::new(self.library, settings.limits)?;
        let aggregator = HeatCapacityAggregator::new(self.heat_capacity);

        let mut b = Builder {
            variables: SlotMap::with_key(),
            order: Vec::new(),
            constraints: Vec::new(),
        };

        let fragments: Vec<(Fragment, VarId)> = self
            .library
            .vocabulary()
            .iter()
            .map(|&fragment| {
                let id = b.add_variable(Variable {
                    name: format!("n[{}]", fragment),
                    domain: Domain::Integer,
                    lower: Some(0.0),
                    upper: Some(f64::from(settings.limits.max_per_fragment)),
                    seed: None,
                });
                (fragment, id)
            })
            .collect();
        let var_of = |fragment: Fragment| {
            fragments
                .iter()
                .find(|(f, _)| *f == fragment)
                .map(|&(_, id)| id)
        };

        for row in checker.rows() {
            let terms = row
                .coefficients
                .iter()
                .filter_map(|&(fragment, a)| var_of(fragment).map(|id| (id, a as f64)));
            b.constrain(row.rule.to_string(), Expr::linear(terms), row.sense, row.rhs as f64);
        }

        let tb_sum = self.property_sum(&fragments, Property::BoilingPoint)?;
        let tm_sum = self.property_sum(&fragments, Property::MeltingPoint)?;
        // The estimator rejects sum <= 0; a strictly positive bound keeps
        // every feasible point inside its domain.
        let min_sum = settings.min_contribution_sum;
        b.constrain("tb_contribution_positive", tb_sum.clone(), Sense::GreaterOrEqual, min_sum);
        b.constrain("tm_contribution_positive", tm_sum.clone(), Sense::GreaterOrEqual, min_sum);

        // T = T0 ln(eps + sum)
        let log_floor = self.estimator.log_floor();
        let log_of = |sum: Expr, scale: f64| Expr::constant(log_floor).plus(sum).ln().scale(scale);
        let tb_definition = log_of(tb_sum, constants.tb0);
        let tm_definition = log_of(tm_sum, constants.tm0);
        let tb = b.continuous("tb", None, tb_definition.clone());
        let tm = b.continuous("tm", None, tm_definition.clone());
        b.constrain("boiling_point_definition", Expr::var(tb).minus(tb_definition), Sense::Equal, 0.0);
        b.constrain("melting_point_definition", Expr::var(tm).minus(tm_definition), Sense::Equal, 0.0);

        let mw_sum = Self::linear_over(&fragments, self.estimator.molar_mass_vector()?);
        let mw = b.continuous("mw", Some(0.0), mw_sum.clone());
        b.constrain("molar_mass_definition", Expr::var(mw).minus(mw_sum), Sense::Equal, 0.0);

        let vm_sum = self.property_sum(&fragments, Property::MolarVolume)?;
        let vm = b.continuous("vm", None, Expr::constant(constants.vm0).plus(vm_sum.clone()));
        b.constrain("molar_volume_definition", Expr::var(vm).minus(vm_sum), Sense::Equal, constants.vm0);

        let density = b.continuous("density", None, Expr::var(mw).times(Expr::var(vm).powi(-1)));
        b.constrain(
            "density_definition",
            Expr::var(density).times(Expr::var(vm)).minus(Expr::var(mw)),
            Sense::Equal,
            0.0,
        );

        // Ra^2 = 4 dD^2 + dP^2 + dH^2
        let target = reference.triple;
        let delta = |property: Property, reference_value: f64| -> Result<Expr, MissingCoefficient> {
            Ok(self
                .property_sum(&fragments, property)?
                .minus(Expr::constant(reference_value)))
        };
        let ra_squared = Expr::sum([
            delta(Property::HansenDispersion, target.dispersion)?.powi(2).scale(4.0),
            delta(Property::HansenPolar, target.polar)?.powi(2),
            delta(Property::HansenHydrogenBonding, target.hydrogen_bonding)?.powi(2),
        ]);
        let red_lower = settings.red_non_negative.then_some(0.0);
        let red = b.continuous("red", red_lower, ra_squared.clone().sqrt());
        b.constrain("red_definition", Expr::var(red).powi(2).minus(ra_squared), Sense::Equal, 0.0);

        let mut cp = Vec::with_capacity(2);
        for temperature in ReferenceTemperature::ALL {
            let sum = self.contribution_sum(&fragments, |f| Ok(aggregator.fragment_heat_capacity(f, temperature)))?;
            let (name, constraint) = match temperature {
                ReferenceTemperature::Low => ("cp_low", "cp_t1_definition"),
                ReferenceTemperature::High => ("cp_high", "cp_t2_definition"),
            };
            let id = b.continuous(name, Some(0.0), sum.clone());
            b.constrain(constraint, Expr::var(id).minus(sum), Sense::Equal, 0.0);
            cp.push(id);
        }
        let (cp_low, cp_high) = (cp[0], cp[1]);

        b.constrain(
            "boiling_point_window",
            Expr::var(tb),
            Sense::GreaterOrEqual,
            settings.window.min_boiling_point,
        );
        b.constrain(
            "melting_point_window",
            Expr::var(tm),
            Sense::LessOrEqual,
            settings.window.max_melting_point,
        );

        let objective = Expr::sum([
            Expr::var(red),
            Expr::var(cp_low),
            Expr::var(cp_high),
            Expr::var(density).scale(-settings.density_weight),
        ]);

        debug!(
            "Assembled design model: {} variables ({} integer), {} constraints, reference '{}'.",
            b.order.len(),
            fragments.len(),
            b.constraints.len(),
            reference.name
        );

        Ok(DesignModel {
            variables: b.variables,
            order: b.order,
            fragments,
            properties: PropertyHandles {
                boiling_point: tb,
                melting_point: tm,
                molar_mass: mw,
                molar_volume: vm,
                density,
                red,
                cp_low,
                cp_high,
            },
            constraints: b.constraints,
            objective,
            reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::groups::fixtures::library_with;
    use crate::core::heat_capacity::aggregator::HeatCapacityAggregator;
    use crate::core::models::candidate::Candidate;
    use crate::core::properties::estimator::{EstimationError, PropertyEstimator};
    use crate::engine::model::ModelViolation;

    const TOLERANCE: f64 = 1e-6;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn assemble(labels: &[&str], settings: &ModelSettings) -> (GroupLibrary, HeatCapacityTable, DesignModel) {
        let library = library_with(labels);
        let table = HeatCapacityTable::builtin().unwrap();
        let model = ModelAssembler::new(&library, &table, settings).assemble().unwrap();
        (library, table, model)
    }

    fn ethylene_glycol_like() -> Candidate {
        Candidate::new()
            .with(Fragment::Hydroxyl, 2)
            .with(Fragment::Methylene, 1)
    }

    #[test]
    fn model_carries_every_named_constraint() {
        let (_, _, model) = assemble(&["CH3", "CH2", "OH"], &ModelSettings::default());
        let names: Vec<&str> = model.constraints().iter().map(|c| c.name.as_str()).collect();
        for expected in [
            "valence_closure",
            "local_bonding[CH3]",
            "local_bonding[CH2]",
            "local_bonding[OH]",
            "minimum_size",
            "maximum_size",
            "unsaturation",
            "tb_contribution_positive",
            "tm_contribution_positive",
            "boiling_point_definition",
            "melting_point_definition",
            "molar_mass_definition",
            "molar_volume_definition",
            "density_definition",
            "red_definition",
            "cp_t1_definition",
            "cp_t2_definition",
            "boiling_point_window",
            "melting_point_window",
        ] {
            assert!(names.contains(&expected), "missing constraint {}", expected);
        }
        assert_eq!(names.len(), 19);
    }

    #[test]
    fn fragment_variables_are_bounded_integers() {
        let (_, _, model) = assemble(&["CH3", "CH2"], &ModelSettings::default());
        assert_eq!(model.fragment_variables().len(), 2);
        for &(fragment, id) in model.fragment_variables() {
            let var = model.variable(id).unwrap();
            assert_eq!(var.domain, Domain::Integer);
            assert_eq!(var.lower, Some(0.0));
            assert_eq!(var.upper, Some(10.0));
            assert_eq!(var.name, format!("n[{}]", fragment));
        }
    }

    #[test]
    fn structural_rows_stay_linear() {
        let (_, _, model) = assemble(&["CH3", "CH2", "OH"], &ModelSettings::default());
        let closure = model.constraint("valence_closure").unwrap();
        let form = closure.body.linear_form().unwrap();
        let ch3 = model.fragment_variable(Fragment::Methyl).unwrap();
        let oh = model.fragment_variable(Fragment::Hydroxyl).unwrap();
        let mut expected = vec![(ch3, -1.0), (oh, -1.0)];
        expected.sort_by_key(|&(id, _)| id);
        assert_eq!(form.terms, expected);
        assert_eq!(closure.rhs, -2.0);
        assert!(model.constraint("red_definition").unwrap().body.linear_form().is_none());
    }

    #[test]
    fn seeded_point_satisfies_every_definition_and_matches_the_estimator() {
        let (library, table, model) = assemble(&["CH3", "CH2", "OH"], &ModelSettings::default());
        let candidate = ethylene_glycol_like();
        let assignment = model.seed_assignment(&candidate).unwrap();

        assert_eq!(model.violations(&assignment, TOLERANCE).unwrap(), vec![]);
        assert_eq!(model.candidate(&assignment), candidate);

        let props = PropertyEstimator::new(&library).estimate(&candidate).unwrap();
        let cp = HeatCapacityAggregator::new(&table).evaluate(&candidate);
        let handles = model.properties();
        assert!(f64_approx_equal(assignment[handles.boiling_point], props.boiling_point));
        assert!(f64_approx_equal(assignment[handles.melting_point], props.melting_point));
        assert!(f64_approx_equal(assignment[handles.density], props.density));
        assert!(f64_approx_equal(assignment[handles.red], props.red));
        assert!(f64_approx_equal(assignment[handles.cp_low], cp.low));
        assert!(f64_approx_equal(assignment[handles.cp_high], cp.high));

        let expected = props.red + cp.total() - 0.001 * props.density;
        assert!(f64_approx_equal(model.objective_value(&assignment).unwrap(), expected));
    }

    #[test]
    fn density_definition_holds_as_a_product() {
        let (_, _, model) = assemble(&["CH3", "CH2"], &ModelSettings::default());
        let octane = Candidate::new()
            .with(Fragment::Methyl, 2)
            .with(Fragment::Methylene, 6);
        let a = model.seed_assignment(&octane).unwrap();
        let h = model.properties();
        assert!(f64_approx_equal(a[h.density] * a[h.molar_volume], a[h.molar_mass]));
    }

    #[test]
    fn red_definition_admits_both_roots_unless_bounded() {
        let unbounded = ModelSettings {
            red_non_negative: false,
            ..ModelSettings::default()
        };
        let (_, _, model) = assemble(&["CH3", "CH2", "OH"], &unbounded);
        let red = model.properties().red;
        assert_eq!(model.variable(red).unwrap().lower, None);

        let mut assignment = model.seed_assignment(&ethylene_glycol_like()).unwrap();
        let root = assignment[red];
        assert!(root > 0.0);
        assignment[red] = -root;
        let definition = model.constraint("red_definition").unwrap();
        assert!(definition.is_satisfied(&assignment, TOLERANCE).unwrap());
        assert_eq!(model.violations(&assignment, TOLERANCE).unwrap(), vec![]);

        let (_, _, bounded) = assemble(&["CH3", "CH2", "OH"], &ModelSettings::default());
        let red = bounded.properties().red;
        assert_eq!(bounded.variable(red).unwrap().lower, Some(0.0));
        let mut assignment = bounded.seed_assignment(&ethylene_glycol_like()).unwrap();
        assignment[red] = -assignment[red];
        let violations = bounded.violations(&assignment, TOLERANCE).unwrap();
        assert!(matches!(
            violations.as_slice(),
            [ModelViolation::Bound { variable, .. }] if variable == "red"
        ));
    }

    #[test]
    fn structurally_infeasible_point_is_reported_by_name() {
        let (_, _, model) = assemble(&["CH3", "CH2"], &ModelSettings::default());
        // Octet and local bonding fail, and Tb is below the window.
        let propyl = Candidate::new()
            .with(Fragment::Methyl, 1)
            .with(Fragment::Methylene, 2);
        let a = model.seed_assignment(&propyl).unwrap();
        let names: Vec<String> = model
            .violations(&a, TOLERANCE)
            .unwrap()
            .into_iter()
            .filter_map(|v| match v {
                ModelViolation::Constraint { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(
            names,
            vec!["valence_closure", "local_bonding[CH2]", "boiling_point_window"]
        );
    }

    #[test]
    fn objective_rewards_density() {
        let weighted = ModelSettings {
            density_weight: 1.0,
            ..ModelSettings::default()
        };
        let (_, _, plain) = assemble(&["CH3", "CH2", "OH"], &ModelSettings::default());
        let (_, _, heavy) = assemble(&["CH3", "CH2", "OH"], &weighted);
        let candidate = ethylene_glycol_like();
        let a = plain.seed_assignment(&candidate).unwrap();
        let b = heavy.seed_assignment(&candidate).unwrap();
        let density = a[plain.properties().density];
        let delta = plain.objective_value(&a).unwrap() - heavy.objective_value(&b).unwrap();
        assert!(f64_approx_equal(delta, 0.999 * density));
    }

    #[test]
    fn empty_candidate_violates_minimum_size() {
        let (_, _, model) = assemble(&["CH3", "CH2"], &ModelSettings::default());
        let a = model.seed_assignment(&Candidate::new()).unwrap();
        let violations = model.violations(&a, TOLERANCE).unwrap();
        assert!(violations.iter().any(|v| matches!(
            v,
            ModelViolation::Constraint { name, .. } if name == "minimum_size"
        )));
    }

    #[test]
    fn zero_contribution_sum_is_excluded_as_the_estimator_rejects_it() {
        let (library, _, model) = assemble(&["CH3", "CH2"], &ModelSettings::default());
        let estimator = PropertyEstimator::new(&library);
        let empty = Candidate::new();
        let a = model.seed_assignment(&empty).unwrap();

        for (row, estimated) in [
            ("tb_contribution_positive", estimator.boiling_point(&empty)),
            ("tm_contribution_positive", estimator.melting_point(&empty)),
        ] {
            let constraint = model.constraint(row).unwrap();
            assert_eq!(constraint.rhs, 1e-3);
            assert!(!constraint.is_satisfied(&a, TOLERANCE).unwrap());
            assert!(matches!(
                estimated,
                Err(EstimationError::NumericDomainViolation { argument, .. }) if argument == 0.0
            ));
        }

        // Melting point sits far below the window, which alone would not exclude it.
        assert!(a[model.properties().melting_point] < 313.0);
    }

    #[test]
    fn estimator_and_model_agree_across_the_log_domain_boundary() {
        let (library, _, model) = assemble(&["CH3", "CH"], &ModelSettings::default());
        let estimator = PropertyEstimator::new(&library);
        let tm_row = model.constraint("tm_contribution_positive").unwrap();

        let ethane = Candidate::new().with(Fragment::Methyl, 2);
        let mut a = model.seed_assignment(&ethane).unwrap();
        assert!(tm_row.is_satisfied(&a, TOLERANCE).unwrap());
        assert!(estimator.melting_point(&ethane).is_ok());

        // CH alone: tm sum -0.5960.
        let lone = Candidate::new().with(Fragment::Methine, 1);
        a[model.fragment_variable(Fragment::Methyl).unwrap()] = 0.0;
        a[model.fragment_variable(Fragment::Methine).unwrap()] = 1.0;
        assert_eq!(model.candidate(&a), lone);
        assert!(!tm_row.is_satisfied(&a, TOLERANCE).unwrap());
        assert!(matches!(
            estimator.melting_point(&lone),
            Err(EstimationError::NumericDomainViolation { .. })
        ));
    }

    #[test]
    fn model_uses_the_configured_log_floor() {
        let settings = ModelSettings {
            log_floor: 0.5,
            ..ModelSettings::default()
        };
        let (library, _, model) = assemble(&["CH3", "CH2", "OH"], &settings);
        let candidate = ethylene_glycol_like();
        let a = model.seed_assignment(&candidate).unwrap();
        let expected = PropertyEstimator::new(&library)
            .with_log_floor(0.5)
            .estimate(&candidate)
            .unwrap();
        assert!(f64_approx_equal(a[model.properties().boiling_point], expected.boiling_point));
        assert!(f64_approx_equal(a[model.properties().melting_point], expected.melting_point));
        assert_eq!(model.violations(&a, TOLERANCE).unwrap(), vec![]);
    }
}
