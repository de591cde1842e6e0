use crate::core::groups::fragment::Fragment;
use std::collections::BTreeMap;
use std::fmt;

/// A candidate molecule: how many times each first-order fragment occurs.
///
/// Zero counts are never stored, so two candidates with the same non-zero
/// counts compare equal regardless of how they were built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Candidate {
    counts: BTreeMap<Fragment, u32>,
}

impl Candidate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` occurrences of `fragment` to the candidate.
    pub fn with(mut self, fragment: Fragment, count: u32) -> Self {
        self.add(fragment, count);
        self
    }

    pub(crate) fn add(&mut self, fragment: Fragment, count: u32) {
        if count > 0 {
            *self.counts.entry(fragment).or_insert(0) += count;
        }
    }

    #[inline]
    pub fn count(&self, fragment: Fragment) -> u32 {
        self.counts.get(&fragment).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Non-zero counts in fragment order.
    pub fn iter(&self) -> impl Iterator<Item = (Fragment, u32)> + '_ {
        self.counts.iter().map(|(&f, &n)| (f, n))
    }
}

impl FromIterator<(Fragment, u32)> for Candidate {
    fn from_iter<I: IntoIterator<Item = (Fragment, u32)>>(iter: I) -> Self {
        let mut candidate = Candidate::new();
        for (fragment, count) in iter {
            candidate.add(fragment, count);
        }
        candidate
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(empty)");
        }
        let parts: Vec<String> = self
            .iter()
            .map(|(fragment, count)| format!("{}x{}", count, fragment))
            .collect();
        f.write_str(&parts.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_candidate_is_empty() {
        let c = Candidate::new();
        assert!(c.is_empty());
        assert_eq!(c.total(), 0);
        assert_eq!(c.count(Fragment::Methyl), 0);
    }

    #[test]
    fn zero_counts_are_not_stored() {
        let a = Candidate::new().with(Fragment::Methyl, 2).with(Fragment::Hydroxyl, 0);
        let b = Candidate::new().with(Fragment::Methyl, 2);
        assert_eq!(a, b);
        assert_eq!(a.iter().count(), 1);
    }

    #[test]
    fn repeated_fragments_accumulate() {
        let c: Candidate = [(Fragment::Methylene, 2), (Fragment::Methylene, 3)]
            .into_iter()
            .collect();
        assert_eq!(c.count(Fragment::Methylene), 5);
        assert_eq!(c.total(), 5);
    }

    #[test]
    fn display_lists_counts_in_fragment_order() {
        let c = Candidate::new()
            .with(Fragment::Hydroxyl, 2)
            .with(Fragment::Methylene, 1);
        assert_eq!(c.to_string(), "1xCH2 + 2xOH");
        assert_eq!(Candidate::new().to_string(), "(empty)");
    }
}
