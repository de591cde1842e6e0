use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Group of the heat-capacity (GAA) basis.
///
/// This vocabulary is independent of [`Fragment`](crate::core::groups::fragment::Fragment):
/// groups are told apart by their local bonding environment and heteroatom,
/// not by the structural motifs used for the other properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CpGroup {
    Methyl,               // CH3
    Methylene,            // CH2
    Methine,              // CH
    Quaternary,           // C
    DoubleBondedMethine,  // =CH
    DoubleBondedCarbon,   // =C
    PrimaryAmino,         // NH2
    SecondaryAmino,       // NH
    TertiaryAmino,        // N
    DoubleBondedNitrogen, // =N
    Hydroxyl,             // OH
    Ether,                // O
    Carbonyl,             // =O
}

static CP_GROUP_LABELS: Map<&'static str, CpGroup> = phf_map! {
    "CH3" => CpGroup::Methyl,
    "CH2" => CpGroup::Methylene,
    "CH" => CpGroup::Methine,
    "C" => CpGroup::Quaternary,
    "=CH" => CpGroup::DoubleBondedMethine,
    "=C" => CpGroup::DoubleBondedCarbon,
    "NH2" => CpGroup::PrimaryAmino,
    "NH" => CpGroup::SecondaryAmino,
    "N" => CpGroup::TertiaryAmino,
    "=N" => CpGroup::DoubleBondedNitrogen,
    "OH" => CpGroup::Hydroxyl,
    "-OH" => CpGroup::Hydroxyl,
    "O" => CpGroup::Ether,
    "=O" => CpGroup::Carbonyl,
};

impl CpGroup {
    pub const ALL: [CpGroup; 13] = [
        CpGroup::Methyl,
        CpGroup::Methylene,
        CpGroup::Methine,
        CpGroup::Quaternary,
        CpGroup::DoubleBondedMethine,
        CpGroup::DoubleBondedCarbon,
        CpGroup::PrimaryAmino,
        CpGroup::SecondaryAmino,
        CpGroup::TertiaryAmino,
        CpGroup::DoubleBondedNitrogen,
        CpGroup::Hydroxyl,
        CpGroup::Ether,
        CpGroup::Carbonyl,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CpGroup::Methyl => "CH3",
            CpGroup::Methylene => "CH2",
            CpGroup::Methine => "CH",
            CpGroup::Quaternary => "C",
            CpGroup::DoubleBondedMethine => "=CH",
            CpGroup::DoubleBondedCarbon => "=C",
            CpGroup::PrimaryAmino => "NH2",
            CpGroup::SecondaryAmino => "NH",
            CpGroup::TertiaryAmino => "N",
            CpGroup::DoubleBondedNitrogen => "=N",
            CpGroup::Hydroxyl => "OH",
            CpGroup::Ether => "O",
            CpGroup::Carbonyl => "=O",
        }
    }
}

impl fmt::Display for CpGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown heat-capacity group label: '{0}'")]
pub struct ParseCpGroupError(pub String);

impl FromStr for CpGroup {
    type Err = ParseCpGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CP_GROUP_LABELS
            .get(s.trim())
            .copied()
            .ok_or_else(|| ParseCpGroupError(s.to_string()))
    }
}

/// Temperatures at which the basis carries heat-capacity coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceTemperature {
    /// 313.15 K, absorber conditions.
    Low,
    /// 393.15 K, stripper conditions.
    High,
}

impl ReferenceTemperature {
    pub const ALL: [ReferenceTemperature; 2] = [ReferenceTemperature::Low, ReferenceTemperature::High];

    pub fn kelvin(self) -> f64 {
        match self {
            ReferenceTemperature::Low => 313.15,
            ReferenceTemperature::High => 393.15,
        }
    }

    /// Column holding the coefficients in the heat-capacity table.
    pub fn column(self) -> &'static str {
        match self {
            ReferenceTemperature::Low => "cp_313",
            ReferenceTemperature::High => "cp_393",
        }
    }
}

impl fmt::Display for ReferenceTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} K", self.kelvin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_group_parses_back_from_its_label() {
        for group in CpGroup::ALL {
            assert_eq!(group.label().parse::<CpGroup>(), Ok(group));
        }
    }

    #[test]
    fn misplaced_bond_marker_is_not_a_group() {
        assert!("O=".parse::<CpGroup>().is_err());
    }

    #[test]
    fn reference_temperatures_are_ordered_and_displayed_in_kelvin() {
        assert!(ReferenceTemperature::Low < ReferenceTemperature::High);
        assert_eq!(ReferenceTemperature::High.to_string(), "393.15 K");
    }
}
