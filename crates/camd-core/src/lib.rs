//! # Solvent CAMD Core Library
//!
//! Computer-aided molecular design of CO2-capture solvents by group contribution:
//! a candidate molecule is a multiset of structural fragments, its properties are
//! estimated additively, and an optimization model selects the multiset that
//! balances solvent affinity, heat capacity and density.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture, so that every
//! piece of the model can be tested on its own:
//!
//! - **[`core`]: The Foundation.** Immutable coefficient tables (`GroupLibrary`,
//!   `HeatCapacityTable`) and pure functions over candidates: structural feasibility,
//!   property estimation and heat-capacity aggregation.
//!
//! - **[`engine`]: The Logic Core.** Builds a self-contained `DesignModel` (variables,
//!   named constraints, objective) from the core layer and defines the `SolverOracle`
//!   seam through which an external optimizer explores the feasible region.
//!
//! - **[`workflows`]: The Public API.** Ties configuration, data loading, model
//!   assembly and one oracle call together, and reports the outcome unchanged.

pub mod core;
pub mod engine;
pub mod workflows;
