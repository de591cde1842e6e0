//! # Core Module
//!
//! Stateless building blocks of the solvent design model.
//!
//! ## Overview
//!
//! Everything in this layer is either immutable data loaded once per run or a
//! pure function over a candidate molecule. Data flows one way: the group
//! library feeds the feasibility checker, the property estimator and the
//! heat-capacity aggregator, which in turn feed the model assembler in
//! [`crate::engine`].
//!
//! ## Architecture
//!
//! - **Group Library** ([`groups`]) - Fragment vocabulary, first- and second-order
//!   coefficient tables and universal constants
//! - **Value Types** ([`models`]) - Candidates, Hansen triples and relation senses
//! - **Structural Rules** ([`feasibility`]) - Octet, local bonding, size and unsaturation rows
//! - **Property Estimation** ([`properties`]) - Tb, Tm, MW, Vm, density and RED
//! - **Heat Capacity** ([`heat_capacity`]) - Translation to the GAA basis and Cp tables

pub mod feasibility;
pub mod groups;
pub mod heat_capacity;
pub mod models;
pub mod properties;
