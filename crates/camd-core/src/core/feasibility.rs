//! # Structural Feasibility
//!
//! Hard rules that make a multiset of fragments assemblable into one connected,
//! acyclic, bond-saturated molecule:
//!
//! 1. **Valence closure** - `sum N[f] (v[f] - 2) = -2`.
//! 2. **Local bonding** - for every fragment `j`, `N[j] (v[j] - 1) + 2 <= sum N[f]`.
//! 3. **Size** - `min_total <= sum N[f] <= max_total`.
//! 4. **Unsaturation** - at most `max_unsaturated` double-bond fragments.
//!
//! Every rule is stored once as an integer [`StructuralRow`]. The checker
//! evaluates the rows exactly on `i64`; the model assembler turns the very same
//! rows into constraints, so the predicate and the feasible region handed to a
//! solver cannot drift apart.

use crate::core::groups::fragment::Fragment;
use crate::core::groups::library::{GroupLibrary, MissingCoefficient};
use crate::core::models::candidate::Candidate;
use crate::core::models::sense::Sense;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeasibilityLimits {
    pub max_per_fragment: u32,
    pub min_total: u32,
    pub max_total: u32,
    pub max_unsaturated: u32,
}

impl Default for FeasibilityLimits {
    fn default() -> Self {
        Self {
            max_per_fragment: 10,
            min_total: 1,
            max_total: 15,
            max_unsaturated: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralRule {
    ValenceClosure,
    LocalBonding(Fragment),
    MinimumSize,
    MaximumSize,
    Unsaturation,
}

impl fmt::Display for StructuralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralRule::ValenceClosure => f.write_str("valence_closure"),
            StructuralRule::LocalBonding(fragment) => write!(f, "local_bonding[{}]", fragment),
            StructuralRule::MinimumSize => f.write_str("minimum_size"),
            StructuralRule::MaximumSize => f.write_str("maximum_size"),
            StructuralRule::Unsaturation => f.write_str("unsaturation"),
        }
    }
}

/// `sum coefficients[f] * N[f]  (sense)  rhs` over integer fragment counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralRow {
    pub rule: StructuralRule,
    pub coefficients: Vec<(Fragment, i64)>,
    pub sense: Sense,
    pub rhs: i64,
}

impl StructuralRow {
    pub fn lhs(&self, candidate: &Candidate) -> i64 {
        self.coefficients
            .iter()
            .map(|&(fragment, a)| a * i64::from(candidate.count(fragment)))
            .sum()
    }

    pub fn holds(&self, candidate: &Candidate) -> bool {
        self.sense.holds_exact(self.lhs(candidate), self.rhs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Rule {
        rule: StructuralRule,
        lhs: i64,
        sense: Sense,
        rhs: i64,
    },
    CountAboveBound {
        fragment: Fragment,
        count: u32,
        bound: u32,
    },
    OutsideVocabulary(Fragment),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Rule {
                rule,
                lhs,
                sense,
                rhs,
            } => write!(f, "{} violated: {} {} {} does not hold", rule, lhs, sense, rhs),
            Violation::CountAboveBound {
                fragment,
                count,
                bound,
            } => write!(f, "{} occurs {} times, above the bound of {}", fragment, count, bound),
            Violation::OutsideVocabulary(fragment) => {
                write!(f, "{} is not in the active vocabulary", fragment)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeasibilityReport {
    pub violations: Vec<Violation>,
}

impl FeasibilityReport {
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violates(&self, rule: StructuralRule) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::Rule { rule: r, .. } if *r == rule))
    }
}

/// Stateless predicate over candidates, bound to one library and set of limits.
pub struct FeasibilityChecker<'a> {
    library: &'a GroupLibrary,
    limits: FeasibilityLimits,
    rows: Vec<StructuralRow>,
}

impl<'a> FeasibilityChecker<'a> {
    pub fn new(library: &'a GroupLibrary, limits: FeasibilityLimits) -> Result<Self, MissingCoefficient> {
        let rows = Self::build_rows(library, &limits)?;
        Ok(Self {
            library,
            limits,
            rows,
        })
    }

    fn build_rows(
        library: &GroupLibrary,
        limits: &FeasibilityLimits,
    ) -> Result<Vec<StructuralRow>, MissingCoefficient> {
        let vocabulary = library.vocabulary();
        let mut valencies = Vec::with_capacity(vocabulary.len());
        for &fragment in vocabulary {
            valencies.push((fragment, i64::from(library.valency(fragment)?)));
        }

        let mut rows = Vec::with_capacity(vocabulary.len() + 4);

        rows.push(StructuralRow {
            rule: StructuralRule::ValenceClosure,
            coefficients: valencies
                .iter()
                .map(|&(f, v)| (f, v - 2))
                .filter(|&(_, a)| a != 0)
                .collect(),
            sense: Sense::Equal,
            rhs: -2,
        });

        // N[j] (v[j] - 1) - sum N[f] <= -2
        for &(j, v_j) in &valencies {
            rows.push(StructuralRow {
                rule: StructuralRule::LocalBonding(j),
                coefficients: valencies
                    .iter()
                    .map(|&(f, _)| (f, if f == j { v_j - 2 } else { -1 }))
                    .filter(|&(_, a)| a != 0)
                    .collect(),
                sense: Sense::LessOrEqual,
                rhs: -2,
            });
        }

        let all_ones: Vec<_> = vocabulary.iter().map(|&f| (f, 1)).collect();
        rows.push(StructuralRow {
            rule: StructuralRule::MinimumSize,
            coefficients: all_ones.clone(),
            sense: Sense::GreaterOrEqual,
            rhs: i64::from(limits.min_total),
        });
        rows.push(StructuralRow {
            rule: StructuralRule::MaximumSize,
            coefficients: all_ones,
            sense: Sense::LessOrEqual,
            rhs: i64::from(limits.max_total),
        });

        rows.push(StructuralRow {
            rule: StructuralRule::Unsaturation,
            coefficients: library
                .unsaturated_fragments()
                .into_iter()
                .map(|f| (f, 1))
                .collect(),
            sense: Sense::LessOrEqual,
            rhs: i64::from(limits.max_unsaturated),
        });

        Ok(rows)
    }

    pub fn limits(&self) -> &FeasibilityLimits {
        &self.limits
    }

    pub fn rows(&self) -> &[StructuralRow] {
        &self.rows
    }

    pub fn check(&self, candidate: &Candidate) -> FeasibilityReport {
        let mut violations = Vec::new();

        for (fragment, count) in candidate.iter() {
            if !self.library.contains(fragment) {
                violations.push(Violation::OutsideVocabulary(fragment));
            } else if count > self.limits.max_per_fragment {
                violations.push(Violation::CountAboveBound {
                    fragment,
                    count,
                    bound: self.limits.max_per_fragment,
                });
            }
        }

        for row in &self.rows {
            let lhs = row.lhs(candidate);
            if !row.sense.holds_exact(lhs, row.rhs) {
                violations.push(Violation::Rule {
                    rule: row.rule,
                    lhs,
                    sense: row.sense,
                    rhs: row.rhs,
                });
            }
        }

        FeasibilityReport { violations }
    }

    pub fn is_feasible(&self, candidate: &Candidate) -> bool {
        self.check(candidate).is_feasible()
    }
}
