//! # Group Module
//!
//! Fragment vocabularies and their group-contribution coefficients.
//!
//! - [`fragment`] - The closed set of first-order structural fragments and the
//!   properties they contribute to.
//! - [`second_order`] - Correction groups spanning several first-order fragments.
//! - [`library`] - The immutable [`library::GroupLibrary`], loaded and validated
//!   once from a TOML table.

pub mod fragment;
pub mod library;
pub mod second_order;

#[cfg(test)]
pub(crate) mod fixtures;
