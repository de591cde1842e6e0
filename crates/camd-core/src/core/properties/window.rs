use super::estimator::EstimatedProperties;
use std::fmt;

/// Hard bounds on the liquid range of a candidate solvent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyWindow {
    /// Lower bound on the normal boiling point (K).
    pub min_boiling_point: f64,
    /// Upper bound on the normal melting point (K).
    pub max_melting_point: f64,
}

impl Default for PropertyWindow {
    fn default() -> Self {
        Self {
            min_boiling_point: 393.0,
            max_melting_point: 313.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowViolation {
    BoilingPointTooLow { value: f64, bound: f64 },
    MeltingPointTooHigh { value: f64, bound: f64 },
}

impl fmt::Display for WindowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowViolation::BoilingPointTooLow { value, bound } => {
                write!(f, "boiling point {:.2} K is below {:.2} K", value, bound)
            }
            WindowViolation::MeltingPointTooHigh { value, bound } => {
                write!(f, "melting point {:.2} K is above {:.2} K", value, bound)
            }
        }
    }
}

impl PropertyWindow {
    pub fn check(&self, properties: &EstimatedProperties) -> Vec<WindowViolation> {
        let mut violations = Vec::new();
        if properties.boiling_point < self.min_boiling_point {
            violations.push(WindowViolation::BoilingPointTooLow {
                value: properties.boiling_point,
                bound: self.min_boiling_point,
            });
        }
        if properties.melting_point > self.max_melting_point {
            violations.push(WindowViolation::MeltingPointTooHigh {
                value: properties.melting_point,
                bound: self.max_melting_point,
            });
        }
        violations
    }

    pub fn contains(&self, properties: &EstimatedProperties) -> bool {
        self.check(properties).is_empty()
    }
}
