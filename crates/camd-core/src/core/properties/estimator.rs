use crate::core::groups::fragment::{Fragment, Property};
use crate::core::groups::library::{GroupLibrary, MissingCoefficient};
use crate::core::groups::second_order::CorrectionGroup;
use crate::core::models::candidate::Candidate;
use crate::core::models::hansen::HansenTriple;
use std::collections::BTreeMap;
use thiserror::Error;

/// Default positive floor inside the Tb/Tm logarithms.
pub const DEFAULT_LOG_FLOOR: f64 = 1e-6;

/// Default lower bound an optimization model puts on the Tb/Tm contribution
/// sums. It sits well above any evaluation tolerance, so a zero sum can never
/// pass as feasible.
pub const DEFAULT_MIN_CONTRIBUTION_SUM: f64 = 1e-3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimationError {
    #[error("Numeric domain violation for {property}: argument {argument} is outside the valid domain")]
    NumericDomainViolation {
        property: &'static str,
        argument: f64,
    },
    #[error(transparent)]
    MissingCoefficient(#[from] MissingCoefficient),
    #[error(
        "Correction '{group}' x{count} needs {required} '{fragment}' fragments, candidate has {available}"
    )]
    IncompatibleCorrection {
        group: CorrectionGroup,
        count: u32,
        fragment: Fragment,
        required: u32,
        available: u32,
    },
}

/// All estimated properties of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatedProperties {
    /// Normal boiling point (K).
    pub boiling_point: f64,
    /// Normal melting point (K).
    pub melting_point: f64,
    /// Molar mass (kg/kmol).
    pub molar_mass: f64,
    /// Molar volume at 298 K (m^3/kmol).
    pub molar_volume: f64,
    /// `molar_mass / molar_volume` (kg/m^3).
    pub density: f64,
    pub hansen: HansenTriple,
    /// Non-negative Hansen distance to the library reference.
    pub red: f64,
}

/// Pure first-order (optionally second-order) group-contribution estimator.
pub struct PropertyEstimator<'a> {
    library: &'a GroupLibrary,
    log_floor: f64,
}

impl<'a> PropertyEstimator<'a> {
    pub fn new(library: &'a GroupLibrary) -> Self {
        Self {
            library,
            log_floor: DEFAULT_LOG_FLOOR,
        }
    }

    pub fn with_log_floor(mut self, log_floor: f64) -> Self {
        self.log_floor = log_floor;
        self
    }

    pub fn library(&self) -> &GroupLibrary {
        self.library
    }

    pub fn log_floor(&self) -> f64 {
        self.log_floor
    }

    /// `(f, C_p[f])` for every fragment of the active vocabulary, in
    /// vocabulary order.
    pub fn coefficient_vector(&self, property: Property) -> Result<Vec<(Fragment, f64)>, MissingCoefficient> {
        self.library
            .vocabulary()
            .iter()
            .map(|&fragment| Ok((fragment, self.library.coefficient(fragment, property)?)))
            .collect()
    }

    pub fn molar_mass_vector(&self) -> Result<Vec<(Fragment, f64)>, MissingCoefficient> {
        self.library
            .vocabulary()
            .iter()
            .map(|&fragment| Ok((fragment, self.library.molar_mass(fragment)?)))
            .collect()
    }

    /// `sum N[f] * C_p[f]` over the first-order fragments of `candidate`.
    pub fn weighted_sum(&self, candidate: &Candidate, property: Property) -> Result<f64, MissingCoefficient> {
        let mut sum = 0.0;
        for (fragment, count) in candidate.iter() {
            sum += f64::from(count) * self.library.coefficient(fragment, property)?;
        }
        Ok(sum)
    }

    fn correction_sum(
        &self,
        corrections: &BTreeMap<CorrectionGroup, u32>,
        property: Property,
    ) -> Result<f64, MissingCoefficient> {
        let mut sum = 0.0;
        for (&group, &count) in corrections {
            sum += f64::from(count) * self.library.correction(group, property)?;
        }
        Ok(sum)
    }

    fn logarithmic(&self, scale: f64, sum: f64, property: &'static str) -> Result<f64, EstimationError> {
        if !(sum > 0.0) {
            return Err(EstimationError::NumericDomainViolation {
                property,
                argument: sum,
            });
        }
        Ok(scale * (self.log_floor + sum).ln())
    }

    pub fn boiling_point(&self, candidate: &Candidate) -> Result<f64, EstimationError> {
        let sum = self.weighted_sum(candidate, Property::BoilingPoint)?;
        self.logarithmic(self.library.constants().tb0, sum, "boiling point")
    }

    pub fn melting_point(&self, candidate: &Candidate) -> Result<f64, EstimationError> {
        let sum = self.weighted_sum(candidate, Property::MeltingPoint)?;
        self.logarithmic(self.library.constants().tm0, sum, "melting point")
    }

    pub fn molar_mass(&self, candidate: &Candidate) -> Result<f64, MissingCoefficient> {
        let mut mass = 0.0;
        for (fragment, count) in candidate.iter() {
            mass += f64::from(count) * self.library.molar_mass(fragment)?;
        }
        Ok(mass)
    }

    pub fn molar_volume(&self, candidate: &Candidate) -> Result<f64, MissingCoefficient> {
        Ok(self.library.constants().vm0 + self.weighted_sum(candidate, Property::MolarVolume)?)
    }

    fn density_from(molar_mass: f64, molar_volume: f64) -> Result<f64, EstimationError> {
        if !(molar_volume > 0.0) {
            return Err(EstimationError::NumericDomainViolation {
                property: "molar volume",
                argument: molar_volume,
            });
        }
        Ok(molar_mass / molar_volume)
    }

    pub fn density(&self, candidate: &Candidate) -> Result<f64, EstimationError> {
        Self::density_from(self.molar_mass(candidate)?, self.molar_volume(candidate)?)
    }

    pub fn hansen(&self, candidate: &Candidate) -> Result<HansenTriple, MissingCoefficient> {
        Ok(HansenTriple::new(
            self.weighted_sum(candidate, Property::HansenDispersion)?,
            self.weighted_sum(candidate, Property::HansenPolar)?,
            self.weighted_sum(candidate, Property::HansenHydrogenBonding)?,
        ))
    }

    /// Non-negative root of `Ra^2` against the library reference.
    pub fn red(&self, candidate: &Candidate) -> Result<f64, MissingCoefficient> {
        Ok(self.hansen(candidate)?.distance(&self.library.reference().triple))
    }

    pub fn estimate(&self, candidate: &Candidate) -> Result<EstimatedProperties, EstimationError> {
        self.estimate_with_corrections(candidate, &BTreeMap::new())
    }

    /// Estimates with second-order terms `sum M[g] * D_p[g]` added inside
    /// every property sum.
    ///
    /// Correction counts cannot be recovered from fragment counts, so the
    /// caller supplies them. `count` copies of each motif's first-order
    /// composition must fit inside `candidate`.
    pub fn estimate_with_corrections(
        &self,
        candidate: &Candidate,
        corrections: &BTreeMap<CorrectionGroup, u32>,
    ) -> Result<EstimatedProperties, EstimationError> {
        Self::check_corrections(candidate, corrections)?;

        let sum = |property: Property| -> Result<f64, MissingCoefficient> {
            Ok(self.weighted_sum(candidate, property)? + self.correction_sum(corrections, property)?)
        };

        let constants = self.library.constants();
        let boiling_point = self.logarithmic(constants.tb0, sum(Property::BoilingPoint)?, "boiling point")?;
        let melting_point = self.logarithmic(constants.tm0, sum(Property::MeltingPoint)?, "melting point")?;
        let molar_mass = self.molar_mass(candidate)?;
        let molar_volume = constants.vm0 + sum(Property::MolarVolume)?;
        let density = Self::density_from(molar_mass, molar_volume)?;
        let hansen = HansenTriple::new(
            sum(Property::HansenDispersion)?,
            sum(Property::HansenPolar)?,
            sum(Property::HansenHydrogenBonding)?,
        );
        let red = hansen.distance(&self.library.reference().triple);

        Ok(EstimatedProperties {
            boiling_point,
            melting_point,
            molar_mass,
            molar_volume,
            density,
            hansen,
            red,
        })
    }

    fn check_corrections(
        candidate: &Candidate,
        corrections: &BTreeMap<CorrectionGroup, u32>,
    ) -> Result<(), EstimationError> {
        // Motifs may overlap (CH in both (CH3)2CH and CHOH), so each group is
        // checked on its own.
        for (&group, &count) in corrections {
            for &(fragment, per_group) in group.composition() {
                let required = per_group * count;
                let available = candidate.count(fragment);
                if required > available {
                    return Err(EstimationError::IncompatibleCorrection {
                        group,
                        count,
                        fragment,
                        required,
                        available,
                    });
                }
            }
        }
        Ok(())
    }
}
