use super::basis::{CpGroup, ReferenceTemperature};
use super::table::HeatCapacityTable;
use super::translation;
use crate::core::groups::fragment::Fragment;
use crate::core::models::candidate::Candidate;
use std::collections::BTreeMap;

/// Heat capacities (J/(mol K)) of a candidate at both reference temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeatCapacities {
    pub low: f64,
    pub high: f64,
}

impl HeatCapacities {
    #[inline]
    pub fn get(&self, temperature: ReferenceTemperature) -> f64 {
        match temperature {
            ReferenceTemperature::Low => self.low,
            ReferenceTemperature::High => self.high,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.low + self.high
    }
}

/// Evaluates heat capacity on the basis obtained by translating a candidate's
/// structural fragments.
pub struct HeatCapacityAggregator<'a> {
    table: &'a HeatCapacityTable,
}

impl<'a> HeatCapacityAggregator<'a> {
    pub fn new(table: &'a HeatCapacityTable) -> Self {
        Self { table }
    }

    pub fn basis_counts(&self, candidate: &Candidate) -> BTreeMap<CpGroup, u32> {
        translation::translate(candidate)
    }

    /// Heat capacity carried by a single occurrence of `fragment`.
    ///
    /// This is the per-fragment coefficient of the linear heat-capacity
    /// expression once the translation is folded in.
    pub fn fragment_heat_capacity(&self, fragment: Fragment, temperature: ReferenceTemperature) -> f64 {
        translation::contributions(fragment)
            .iter()
            .map(|&(group, n)| f64::from(n) * self.table.coefficient(group, temperature))
            .sum()
    }

    pub fn heat_capacity(&self, candidate: &Candidate, temperature: ReferenceTemperature) -> f64 {
        self.basis_counts(candidate)
            .into_iter()
            .map(|(group, n)| f64::from(n) * self.table.coefficient(group, temperature))
            .sum()
    }

    pub fn evaluate(&self, candidate: &Candidate) -> HeatCapacities {
        HeatCapacities {
            low: self.heat_capacity(candidate, ReferenceTemperature::Low),
            high: self.heat_capacity(candidate, ReferenceTemperature::High),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn single_methyl_has_the_methyl_coefficients() {
        let table = HeatCapacityTable::builtin().unwrap();
        let cp = HeatCapacityAggregator::new(&table).evaluate(&Candidate::new().with(Fragment::Methyl, 1));
        assert!(f64_approx_equal(cp.low, 43.56));
        assert!(f64_approx_equal(cp.high, 58.02));
    }

    #[test]
    fn ethane_doubles_the_methyl_coefficients() {
        let table = HeatCapacityTable::builtin().unwrap();
        let cp = HeatCapacityAggregator::new(&table).evaluate(&Candidate::new().with(Fragment::Methyl, 2));
        assert!(f64_approx_equal(cp.low, 87.12));
        assert!(f64_approx_equal(cp.high, 116.04));
        assert!(f64_approx_equal(cp.total(), 203.16));
    }

    #[test]
    fn monoethanolamine_matches_hand_computed_values() {
        // CH2NH2-CH2-OH -> 2 CH2 + NH2 + OH
        let table = HeatCapacityTable::builtin().unwrap();
        let candidate = Candidate::new()
            .with(Fragment::MethyleneAmine, 1)
            .with(Fragment::Methylene, 1)
            .with(Fragment::Hydroxyl, 1);
        let cp = HeatCapacityAggregator::new(&table).evaluate(&candidate);
        assert!(f64_approx_equal(cp.low, 2.0 * 31.40 + 58.40 + 57.51));
        assert!(f64_approx_equal(cp.high, 2.0 * 30.10 + 68.48 + 70.33));
    }

    #[test]
    fn fragment_coefficients_sum_to_the_basis_evaluation() {
        let table = HeatCapacityTable::builtin().unwrap();
        let aggregator = HeatCapacityAggregator::new(&table);
        let candidate = Candidate::new()
            .with(Fragment::Acetyl, 1)
            .with(Fragment::Methylene, 3)
            .with(Fragment::MethylNitrogen, 1)
            .with(Fragment::Vinyl, 1);
        for temperature in ReferenceTemperature::ALL {
            let by_fragment: f64 = candidate
                .iter()
                .map(|(f, n)| f64::from(n) * aggregator.fragment_heat_capacity(f, temperature))
                .sum();
            assert!(f64_approx_equal(
                by_fragment,
                aggregator.heat_capacity(&candidate, temperature)
            ));
        }
    }

    #[test]
    fn empty_candidate_has_zero_heat_capacity() {
        let table = HeatCapacityTable::builtin().unwrap();
        let cp = HeatCapacityAggregator::new(&table).evaluate(&Candidate::new());
        assert_eq!(cp, HeatCapacities::default());
    }
}
