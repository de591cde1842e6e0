//! # Heat-Capacity Module
//!
//! Heat capacity is estimated on its own group basis ([`basis::CpGroup`]),
//! disjoint from the structural fragments used for every other property. A
//! candidate is first mapped onto that basis through the fixed
//! [`translation`] table, then evaluated as a plain weighted sum of the
//! [`table::HeatCapacityTable`] coefficients at 313.15 K and 393.15 K.

pub mod aggregator;
pub mod basis;
pub mod table;
pub mod translation;
