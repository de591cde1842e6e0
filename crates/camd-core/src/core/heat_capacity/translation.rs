//! Fixed translation from structural fragments to the heat-capacity basis.
//!
//! The table is an exhaustive `match` over [`Fragment`]: adding a fragment to
//! the structural vocabulary without deciding its heat-capacity groups does not
//! compile. Fragments that feed a basis group more than once carry the
//! multiplier explicitly.

use super::basis::CpGroup;
use crate::core::groups::fragment::Fragment;
use crate::core::models::candidate::Candidate;
use std::collections::BTreeMap;

/// Bumped whenever a row of [`contributions`] changes.
pub const TRANSLATION_VERSION: &str = "hukkerikar-g1/gaa-cp/1";

/// Heat-capacity groups produced by one occurrence of `fragment`.
pub fn contributions(fragment: Fragment) -> &'static [(CpGroup, u32)] {
    use CpGroup as G;
    match fragment {
        Fragment::Methyl => &[(G::Methyl, 1)],
        Fragment::Methylene => &[(G::Methylene, 1)],
        Fragment::Methine => &[(G::Methine, 1)],
        Fragment::QuaternaryCarbon => &[(G::Quaternary, 1)],
        Fragment::MethyleneAmine => &[(G::Methylene, 1), (G::PrimaryAmino, 1)],
        Fragment::MethineAmine => &[(G::Methine, 1), (G::PrimaryAmino, 1)],
        Fragment::QuaternaryAmine => &[(G::Quaternary, 1), (G::PrimaryAmino, 1)],
        Fragment::MethylImino => &[(G::Methyl, 1), (G::SecondaryAmino, 1)],
        Fragment::MethyleneImino => &[(G::Methylene, 1), (G::SecondaryAmino, 1)],
        Fragment::MethineImino => &[(G::Methine, 1), (G::SecondaryAmino, 1)],
        Fragment::MethylNitrogen => &[(G::Methyl, 1), (G::TertiaryAmino, 1)],
        Fragment::MethyleneNitrogen => &[(G::Methylene, 1), (G::TertiaryAmino, 1)],
        Fragment::Hydroxyl => &[(G::Hydroxyl, 1)],
        Fragment::MethyleneOxy => &[(G::Methylene, 1), (G::Ether, 1)],
        Fragment::Acetyl => &[(G::Methyl, 1), (G::DoubleBondedCarbon, 1), (G::Carbonyl, 1)],
        Fragment::MethyleneCarbonyl => &[
            (G::Methylene, 1),
            (G::DoubleBondedCarbon, 1),
            (G::Carbonyl, 1),
        ],
        // The GAA basis has no =CH2 group, so the terminal carbon of CH2=CH
        // is counted as =CH.
        Fragment::Vinyl => &[(G::DoubleBondedMethine, 2)],
        // Both carbons of -CH=CH- carry one hydrogen; =C is for carbons with none.
        Fragment::Vinylene => &[(G::DoubleBondedMethine, 2)],
        Fragment::Aldimine => &[(G::DoubleBondedMethine, 1), (G::DoubleBondedNitrogen, 1)],
    }
}

/// How many `group` units one `fragment` contributes; zero when unrelated.
pub fn multiplier(fragment: Fragment, group: CpGroup) -> u32 {
    contributions(fragment)
        .iter()
        .filter(|(g, _)| *g == group)
        .map(|(_, n)| n)
        .sum()
}

/// Counts over the whole heat-capacity basis, zero entries included.
pub fn translate(candidate: &Candidate) -> BTreeMap<CpGroup, u32> {
    let mut counts: BTreeMap<CpGroup, u32> = CpGroup::ALL.iter().map(|&g| (g, 0)).collect();
    for (fragment, count) in candidate.iter() {
        for &(group, n) in contributions(fragment) {
            *counts.entry(group).or_insert(0) += n * count;
        }
    }
    counts
}
