//! First-order group-contribution estimates of the solvent properties:
//! boiling and melting points, molar mass, molar volume, density and the
//! Hansen distance to the reference species.

pub mod estimator;
pub mod window;
