//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! A workflow loads the coefficient tables named by a
//! [`DesignConfig`](crate::engine::config::DesignConfig), assembles one model,
//! hands it to a solver oracle and turns the oracle's answer into a report or
//! a typed error.
//!
//! - **Design Workflow** ([`design`]) - Single design run and reference sweeps

pub mod design;
