use super::fragment::{Fragment, ParseFragmentError, Property};
use super::second_order::{CorrectionGroup, ParseCorrectionGroupError};
use crate::core::models::hansen::{HansenReference, HansenTriple};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Hukkerikar first- and second-order tables shipped with the crate.
pub const BUILTIN_GROUPS_TOML: &str = include_str!("../../../data/groups.toml");

/// Universal constants of the group-contribution property equations.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UniversalConstants {
    /// Boiling point constant (K).
    pub tb0: f64,
    /// Melting point constant (K).
    pub tm0: f64,
    /// Molar volume constant (m^3/kmol).
    pub vm0: f64,
}

/// One contribution per estimated property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyContributions {
    pub tb: f64,
    pub tm: f64,
    pub vm: f64,
    pub delta_d: f64,
    pub delta_p: f64,
    pub delta_h: f64,
}

impl PropertyContributions {
    #[inline]
    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::BoilingPoint => self.tb,
            Property::MeltingPoint => self.tm,
            Property::MolarVolume => self.vm,
            Property::HansenDispersion => self.delta_d,
            Property::HansenPolar => self.delta_p,
            Property::HansenHydrogenBonding => self.delta_h,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentRecord {
    pub valency: u32,
    pub molar_mass: f64,
    pub contributions: PropertyContributions,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawFirstOrderRecord {
    valency: Option<u32>,
    molar_mass: Option<f64>,
    tb: Option<f64>,
    tm: Option<f64>,
    vm: Option<f64>,
    delta_d: Option<f64>,
    delta_p: Option<f64>,
    delta_h: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawCorrectionRecord {
    tb: Option<f64>,
    tm: Option<f64>,
    vm: Option<f64>,
    delta_d: Option<f64>,
    delta_p: Option<f64>,
    delta_h: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawReference {
    name: String,
    delta_d: f64,
    delta_p: f64,
    delta_h: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawLibraryFile {
    vocabulary: Vec<String>,
    constants: UniversalConstants,
    reference: RawReference,
    #[serde(default)]
    first_order: HashMap<String, RawFirstOrderRecord>,
    #[serde(default)]
    second_order: HashMap<String, RawCorrectionRecord>,
}

impl RawFirstOrderRecord {
    fn value(&self, property: Property) -> Option<f64> {
        match property {
            Property::BoilingPoint => self.tb,
            Property::MeltingPoint => self.tm,
            Property::MolarVolume => self.vm,
            Property::HansenDispersion => self.delta_d,
            Property::HansenPolar => self.delta_p,
            Property::HansenHydrogenBonding => self.delta_h,
        }
    }

    fn is_complete(&self) -> bool {
        self.valency.is_some()
            && self.molar_mass.is_some()
            && Property::ALL.iter().all(|&p| self.value(p).is_some())
    }
}

impl RawCorrectionRecord {
    fn value(&self, property: Property) -> Option<f64> {
        match property {
            Property::BoilingPoint => self.tb,
            Property::MeltingPoint => self.tm,
            Property::MolarVolume => self.vm,
            Property::HansenDispersion => self.delta_d,
            Property::HansenPolar => self.delta_p,
            Property::HansenHydrogenBonding => self.delta_h,
        }
    }
}

/// A group label had no value for a field used by the model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("No '{field}' coefficient defined for group '{group}'")]
pub struct MissingCoefficient {
    pub group: String,
    pub field: &'static str,
}

#[derive(Debug, Error)]
pub enum LibraryLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    UnknownFragment(#[from] ParseFragmentError),
    #[error(transparent)]
    UnknownCorrectionGroup(#[from] ParseCorrectionGroupError),
    #[error("The active vocabulary is empty")]
    EmptyVocabulary,
    #[error("Fragment '{0}' is listed more than once in the active vocabulary")]
    DuplicateFragment(Fragment),
    #[error("Fragment '{0}' has more than one first-order record")]
    DuplicateRecord(Fragment),
    #[error("Fragment '{0}' is in the active vocabulary but has no first-order record")]
    MissingRecord(Fragment),
    #[error("Incomplete record: {0}")]
    MissingCoefficient(#[from] MissingCoefficient),
    #[error("Fragment '{fragment}' has invalid valency {valency} (must be at least 1)")]
    InvalidValency { fragment: Fragment, valency: u32 },
    #[error("Non-finite value for '{field}' of '{group}'")]
    NonFinite { group: String, field: &'static str },
}

/// Immutable registry of the fragment vocabulary and its coefficients.
///
/// Every fragment of the active vocabulary is guaranteed at load time to carry
/// a valency, a molar mass and a contribution for every [`Property`]; records
/// of fragments outside the vocabulary are not kept.
#[derive(Debug, Clone)]
pub struct GroupLibrary {
    vocabulary: Vec<Fragment>,
    records: HashMap<Fragment, FragmentRecord>,
    corrections: HashMap<CorrectionGroup, PropertyContributions>,
    constants: UniversalConstants,
    reference: HansenReference,
}

impl GroupLibrary {
    pub fn load(path: &Path) -> Result<Self, LibraryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LibraryLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LibraryLoadError> {
        Self::parse(content, "<string>")
    }

    pub fn builtin() -> Result<Self, LibraryLoadError> {
        Self::parse(BUILTIN_GROUPS_TOML, "<builtin groups.toml>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, LibraryLoadError> {
        let raw: RawLibraryFile = toml::from_str(content).map_err(|e| LibraryLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;

        let vocabulary = Self::parse_vocabulary(&raw.vocabulary)?;

        let mut raw_records = HashMap::new();
        for (label, record) in raw.first_order {
            let fragment = label.parse::<Fragment>()?;
            if raw_records.insert(fragment, record).is_some() {
                return Err(LibraryLoadError::DuplicateRecord(fragment));
            }
        }

        let mut records = HashMap::new();
        for &fragment in &vocabulary {
            let raw_record = raw_records
                .get(&fragment)
                .ok_or(LibraryLoadError::MissingRecord(fragment))?;
            records.insert(fragment, Self::complete_record(fragment, raw_record)?);
        }

        for (fragment, raw_record) in &raw_records {
            if records.contains_key(fragment) {
                continue;
            }
            if raw_record.is_complete() {
                debug!("Fragment '{}' has a record but is not in the active vocabulary.", fragment);
            } else {
                warn!(
                    "Ignoring partial record for fragment '{}' outside the active vocabulary.",
                    fragment
                );
            }
        }

        let mut corrections = HashMap::new();
        for (label, raw_record) in &raw.second_order {
            let group = label.parse::<CorrectionGroup>()?;
            let contributions = Self::complete_contributions(group.label(), |p| raw_record.value(p))?;
            corrections.insert(group, contributions);
        }

        Self::check_finite("constants", "tb0", raw.constants.tb0)?;
        Self::check_finite("constants", "tm0", raw.constants.tm0)?;
        Self::check_finite("constants", "vm0", raw.constants.vm0)?;

        let owner = format!("reference {}", raw.reference.name);
        Self::check_finite(&owner, "delta-d", raw.reference.delta_d)?;
        Self::check_finite(&owner, "delta-p", raw.reference.delta_p)?;
        Self::check_finite(&owner, "delta-h", raw.reference.delta_h)?;
        let reference = HansenReference::new(
            &raw.reference.name,
            HansenTriple::new(
                raw.reference.delta_d,
                raw.reference.delta_p,
                raw.reference.delta_h,
            ),
        );

        info!(
            "Loaded group library from {}: {} active fragments, {} second-order corrections, reference '{}'.",
            origin,
            vocabulary.len(),
            corrections.len(),
            reference.name
        );

        Ok(Self {
            vocabulary,
            records,
            corrections,
            constants: raw.constants,
            reference,
        })
    }

    fn parse_vocabulary(labels: &[String]) -> Result<Vec<Fragment>, LibraryLoadError> {
        if labels.is_empty() {
            return Err(LibraryLoadError::EmptyVocabulary);
        }
        let mut seen = HashSet::new();
        let mut vocabulary = Vec::with_capacity(labels.len());
        for label in labels {
            let fragment = label.parse::<Fragment>()?;
            if !seen.insert(fragment) {
                return Err(LibraryLoadError::DuplicateFragment(fragment));
            }
            vocabulary.push(fragment);
        }
        vocabulary.sort();
        Ok(vocabulary)
    }

    fn complete_record(
        fragment: Fragment,
        raw: &RawFirstOrderRecord,
    ) -> Result<FragmentRecord, LibraryLoadError> {
        let valency = raw.valency.ok_or_else(|| MissingCoefficient {
            group: fragment.label().to_string(),
            field: "valency",
        })?;
        if valency == 0 {
            return Err(LibraryLoadError::InvalidValency { fragment, valency });
        }
        let molar_mass = raw.molar_mass.ok_or_else(|| MissingCoefficient {
            group: fragment.label().to_string(),
            field: "molar-mass",
        })?;
        Self::check_finite(fragment.label(), "molar-mass", molar_mass)?;

        Ok(FragmentRecord {
            valency,
            molar_mass,
            contributions: Self::complete_contributions(fragment.label(), |p| raw.value(p))?,
        })
    }

    fn complete_contributions<F>(
        group: &str,
        value: F,
    ) -> Result<PropertyContributions, LibraryLoadError>
    where
        F: Fn(Property) -> Option<f64>,
    {
        let get = |property: Property| -> Result<f64, LibraryLoadError> {
            let v = value(property).ok_or_else(|| MissingCoefficient {
                group: group.to_string(),
                field: property.key(),
            })?;
            Self::check_finite(group, property.key(), v)?;
            Ok(v)
        };
        Ok(PropertyContributions {
            tb: get(Property::BoilingPoint)?,
            tm: get(Property::MeltingPoint)?,
            vm: get(Property::MolarVolume)?,
            delta_d: get(Property::HansenDispersion)?,
            delta_p: get(Property::HansenPolar)?,
            delta_h: get(Property::HansenHydrogenBonding)?,
        })
    }

    fn check_finite(group: &str, field: &'static str, value: f64) -> Result<(), LibraryLoadError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(LibraryLoadError::NonFinite {
                group: group.to_string(),
                field,
            })
        }
    }

    /// Returns the same tables aimed at a different target species.
    pub fn with_reference(mut self, reference: HansenReference) -> Self {
        self.reference = reference;
        self
    }

    /// Active fragments, in fragment order.
    pub fn vocabulary(&self) -> &[Fragment] {
        &self.vocabulary
    }

    pub fn contains(&self, fragment: Fragment) -> bool {
        self.records.contains_key(&fragment)
    }

    fn record(&self, fragment: Fragment, field: &'static str) -> Result<&FragmentRecord, MissingCoefficient> {
        self.records.get(&fragment).ok_or_else(|| MissingCoefficient {
            group: fragment.label().to_string(),
            field,
        })
    }

    pub fn coefficient(&self, fragment: Fragment, property: Property) -> Result<f64, MissingCoefficient> {
        Ok(self.record(fragment, property.key())?.contributions.get(property))
    }

    pub fn valency(&self, fragment: Fragment) -> Result<u32, MissingCoefficient> {
        Ok(self.record(fragment, "valency")?.valency)
    }

    pub fn molar_mass(&self, fragment: Fragment) -> Result<f64, MissingCoefficient> {
        Ok(self.record(fragment, "molar-mass")?.molar_mass)
    }

    pub fn correction(&self, group: CorrectionGroup, property: Property) -> Result<f64, MissingCoefficient> {
        self.corrections
            .get(&group)
            .map(|c| c.get(property))
            .ok_or_else(|| MissingCoefficient {
                group: group.label().to_string(),
                field: property.key(),
            })
    }

    /// Second-order groups that carry corrections, in group order.
    pub fn correction_groups(&self) -> Vec<CorrectionGroup> {
        let mut groups: Vec<_> = self.corrections.keys().copied().collect();
        groups.sort();
        groups
    }

    /// Active fragments holding a double bond.
    pub fn unsaturated_fragments(&self) -> Vec<Fragment> {
        self.vocabulary
            .iter()
            .copied()
            .filter(|f| f.is_unsaturated())
            .collect()
    }

    pub fn constants(&self) -> &UniversalConstants {
        &self.constants
    }

    pub fn reference(&self) -> &HansenReference {
        &self.reference
    }
}
