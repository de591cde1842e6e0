use nalgebra::Vector3;

/// Hansen solubility parameters in MPa^0.5.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HansenTriple {
    pub dispersion: f64,
    pub polar: f64,
    pub hydrogen_bonding: f64,
}

impl HansenTriple {
    pub fn new(dispersion: f64, polar: f64, hydrogen_bonding: f64) -> Self {
        Self {
            dispersion,
            polar,
            hydrogen_bonding,
        }
    }

    #[inline]
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.dispersion, self.polar, self.hydrogen_bonding)
    }

    /// Weights of the Hansen distance: the dispersion axis counts four times.
    #[inline]
    pub fn distance_weights() -> Vector3<f64> {
        Vector3::new(4.0, 1.0, 1.0)
    }

    /// `Ra^2 = 4 dD^2 + dP^2 + dH^2` between two points of Hansen space.
    pub fn distance_squared(&self, other: &HansenTriple) -> f64 {
        let delta = self.as_vector() - other.as_vector();
        Self::distance_weights().component_mul(&delta).dot(&delta)
    }

    pub fn distance(&self, other: &HansenTriple) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Fixed target point of the affinity objective.
#[derive(Debug, Clone, PartialEq)]
pub struct HansenReference {
    pub name: String,
    pub triple: HansenTriple,
}

impl HansenReference {
    pub fn new(name: &str, triple: HansenTriple) -> Self {
        Self {
            name: name.to_string(),
            triple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn distance_to_itself_is_zero() {
        let t = HansenTriple::new(15.0, 5.0, 6.0);
        assert_eq!(t.distance_squared(&t), 0.0);
    }

    #[test]
    fn dispersion_axis_is_weighted_four_times() {
        let a = HansenTriple::new(1.0, 0.0, 0.0);
        let b = HansenTriple::new(0.0, 1.0, 0.0);
        let origin = HansenTriple::default();
        assert!((a.distance_squared(&origin) - 4.0).abs() < TOLERANCE);
        assert!((b.distance_squared(&origin) - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn distance_is_symmetric_and_matches_closed_form() {
        let a = HansenTriple::new(16.0, 7.0, 3.0);
        let b = HansenTriple::new(15.0, 5.0, 6.0);
        let expected = (4.0_f64 * 1.0 + 4.0 + 9.0).sqrt();
        assert!((a.distance(&b) - expected).abs() < TOLERANCE);
        assert!((b.distance(&a) - expected).abs() < TOLERANCE);
    }
}
