use std::fmt;

/// Relation between the left- and right-hand side of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

impl Sense {
    /// Exact check for integer rows.
    #[inline]
    pub fn holds_exact(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Sense::Equal => lhs == rhs,
            Sense::LessOrEqual => lhs <= rhs,
            Sense::GreaterOrEqual => lhs >= rhs,
        }
    }

    /// Check with an absolute tolerance for real-valued rows.
    #[inline]
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Sense::Equal => (lhs - rhs).abs() <= tolerance,
            Sense::LessOrEqual => lhs <= rhs + tolerance,
            Sense::GreaterOrEqual => lhs >= rhs - tolerance,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Sense::Equal => "=",
            Sense::LessOrEqual => "<=",
            Sense::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
