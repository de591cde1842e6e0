use super::fragment::Fragment;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Second-order (correction) group spanning several first-order fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CorrectionGroup {
    Isopropyl,        // (CH3)2CH
    TertButyl,        // (CH3)3C
    SecondaryAlcohol, // CHOH
    TertiaryAlcohol,  // COH
}

impl CorrectionGroup {
    pub const ALL: [CorrectionGroup; 4] = [
        CorrectionGroup::Isopropyl,
        CorrectionGroup::TertButyl,
        CorrectionGroup::SecondaryAlcohol,
        CorrectionGroup::TertiaryAlcohol,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CorrectionGroup::Isopropyl => "(CH3)2CH",
            CorrectionGroup::TertButyl => "(CH3)3C",
            CorrectionGroup::SecondaryAlcohol => "CHOH",
            CorrectionGroup::TertiaryAlcohol => "COH",
        }
    }

    /// First-order fragments consumed by one occurrence of the motif.
    pub fn composition(self) -> &'static [(Fragment, u32)] {
        match self {
            CorrectionGroup::Isopropyl => &[(Fragment::Methyl, 2), (Fragment::Methine, 1)],
            CorrectionGroup::TertButyl => {
                &[(Fragment::Methyl, 3), (Fragment::QuaternaryCarbon, 1)]
            }
            CorrectionGroup::SecondaryAlcohol => {
                &[(Fragment::Methine, 1), (Fragment::Hydroxyl, 1)]
            }
            CorrectionGroup::TertiaryAlcohol => {
                &[(Fragment::QuaternaryCarbon, 1), (Fragment::Hydroxyl, 1)]
            }
        }
    }
}

impl fmt::Display for CorrectionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown second-order group label: '{0}'")]
pub struct ParseCorrectionGroupError(pub String);

impl FromStr for CorrectionGroup {
    type Err = ParseCorrectionGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "(CH3)2CH" => Ok(CorrectionGroup::Isopropyl),
            "(CH3)3C" => Ok(CorrectionGroup::TertButyl),
            "CHOH" | "CH-OH" => Ok(CorrectionGroup::SecondaryAlcohol),
            "COH" | "C-OH" => Ok(CorrectionGroup::TertiaryAlcohol),
            _ => Err(ParseCorrectionGroupError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for group in CorrectionGroup::ALL {
            assert_eq!(group.label().parse::<CorrectionGroup>(), Ok(group));
        }
    }

    #[test]
    fn hyphenated_alcohol_labels_are_accepted() {
        assert_eq!(
            "CH-OH".parse::<CorrectionGroup>(),
            Ok(CorrectionGroup::SecondaryAlcohol)
        );
        assert_eq!(
            "C-OH".parse::<CorrectionGroup>(),
            Ok(CorrectionGroup::TertiaryAlcohol)
        );
    }

    #[test]
    fn tert_butyl_consumes_three_methyls_and_a_quaternary_carbon() {
        assert_eq!(
            CorrectionGroup::TertButyl.composition(),
            &[(Fragment::Methyl, 3), (Fragment::QuaternaryCarbon, 1)]
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!("CH2-OH".parse::<CorrectionGroup>().is_err());
    }
}
