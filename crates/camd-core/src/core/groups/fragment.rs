use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// First-order structural fragment (Hukkerikar group) used as a building block
/// of a candidate molecule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fragment {
    // --- Alkyl ---
    Methyl,           // CH3
    Methylene,        // CH2
    Methine,          // CH
    QuaternaryCarbon, // C

    // --- Primary amines ---
    MethyleneAmine,  // CH2NH2
    MethineAmine,    // CHNH2
    QuaternaryAmine, // CNH2

    // --- Secondary amines ---
    MethylImino,    // CH3NH
    MethyleneImino, // CH2NH
    MethineImino,   // CHNH

    // --- Tertiary amines ---
    MethylNitrogen,    // CH3N, (CH3)-N<
    MethyleneNitrogen, // CH2N, >CH2-N<

    // --- Hydroxyl ---
    Hydroxyl, // OH

    // --- Ether, carbonyl and unsaturated ---
    MethyleneOxy,      // CH2O
    Acetyl,            // CH3CO
    MethyleneCarbonyl, // CH2CO
    Vinyl,             // CH2=CH
    Vinylene,          // CH=CH
    Aldimine,          // CH=N
}

static FRAGMENT_LABELS: Map<&'static str, Fragment> = phf_map! {
    "CH3" => Fragment::Methyl,
    "CH2" => Fragment::Methylene,
    "CH" => Fragment::Methine,
    "C" => Fragment::QuaternaryCarbon,
    "CH2NH2" => Fragment::MethyleneAmine,
    "CHNH2" => Fragment::MethineAmine,
    "CNH2" => Fragment::QuaternaryAmine,
    "C-NH2" => Fragment::QuaternaryAmine,
    "CH3NH" => Fragment::MethylImino,
    "CH2NH" => Fragment::MethyleneImino,
    "CHNH" => Fragment::MethineImino,
    "CH3N" => Fragment::MethylNitrogen,
    "CH2N" => Fragment::MethyleneNitrogen,
    "OH" => Fragment::Hydroxyl,
    "-OH" => Fragment::Hydroxyl,
    "CH2O" => Fragment::MethyleneOxy,
    "CH3CO" => Fragment::Acetyl,
    "CH2CO" => Fragment::MethyleneCarbonyl,
    "CH2=CH" => Fragment::Vinyl,
    "CH=CH" => Fragment::Vinylene,
    "CH=N" => Fragment::Aldimine,
};

impl Fragment {
    pub const ALL: [Fragment; 19] = [
        Fragment::Methyl,
        Fragment::Methylene,
        Fragment::Methine,
        Fragment::QuaternaryCarbon,
        Fragment::MethyleneAmine,
        Fragment::MethineAmine,
        Fragment::QuaternaryAmine,
        Fragment::MethylImino,
        Fragment::MethyleneImino,
        Fragment::MethineImino,
        Fragment::MethylNitrogen,
        Fragment::MethyleneNitrogen,
        Fragment::Hydroxyl,
        Fragment::MethyleneOxy,
        Fragment::Acetyl,
        Fragment::MethyleneCarbonyl,
        Fragment::Vinyl,
        Fragment::Vinylene,
        Fragment::Aldimine,
    ];

    /// Canonical group label as written in the coefficient tables.
    pub fn label(self) -> &'static str {
        match self {
            Fragment::Methyl => "CH3",
            Fragment::Methylene => "CH2",
            Fragment::Methine => "CH",
            Fragment::QuaternaryCarbon => "C",
            Fragment::MethyleneAmine => "CH2NH2",
            Fragment::MethineAmine => "CHNH2",
            Fragment::QuaternaryAmine => "CNH2",
            Fragment::MethylImino => "CH3NH",
            Fragment::MethyleneImino => "CH2NH",
            Fragment::MethineImino => "CHNH",
            Fragment::MethylNitrogen => "CH3N",
            Fragment::MethyleneNitrogen => "CH2N",
            Fragment::Hydroxyl => "OH",
            Fragment::MethyleneOxy => "CH2O",
            Fragment::Acetyl => "CH3CO",
            Fragment::MethyleneCarbonyl => "CH2CO",
            Fragment::Vinyl => "CH2=CH",
            Fragment::Vinylene => "CH=CH",
            Fragment::Aldimine => "CH=N",
        }
    }

    /// Whether the fragment carries a double bond (C=O, C=C or C=N).
    pub fn is_unsaturated(self) -> bool {
        matches!(
            self,
            Fragment::Acetyl
                | Fragment::MethyleneCarbonyl
                | Fragment::Vinyl
                | Fragment::Vinylene
                | Fragment::Aldimine
        )
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown first-order group label: '{0}'")]
pub struct ParseFragmentError(pub String);

impl FromStr for Fragment {
    type Err = ParseFragmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FRAGMENT_LABELS
            .get(s.trim())
            .copied()
            .ok_or_else(|| ParseFragmentError(s.to_string()))
    }
}

/// Property estimated by additive group contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    BoilingPoint,
    MeltingPoint,
    MolarVolume,
    HansenDispersion,
    HansenPolar,
    HansenHydrogenBonding,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::BoilingPoint,
        Property::MeltingPoint,
        Property::MolarVolume,
        Property::HansenDispersion,
        Property::HansenPolar,
        Property::HansenHydrogenBonding,
    ];

    /// Key of the property column in the coefficient tables.
    pub fn key(self) -> &'static str {
        match self {
            Property::BoilingPoint => "tb",
            Property::MeltingPoint => "tm",
            Property::MolarVolume => "vm",
            Property::HansenDispersion => "delta-d",
            Property::HansenPolar => "delta-p",
            Property::HansenHydrogenBonding => "delta-h",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
