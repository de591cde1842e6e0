//! # Engine Module
//!
//! Turns the stateless core layer into a complete optimization model and
//! defines the seam through which an external optimizer explores it.
//!
//! ## Overview
//!
//! One call to [`assembler::ModelAssembler::assemble`] produces one immutable
//! [`model::DesignModel`]: integer fragment counts, continuous property
//! variables, every structural and property constraint by name, and the
//! weighted objective `RED + Cp(T1) + Cp(T2) - w * density`. The model is then
//! handed to a [`oracle::SolverOracle`], whose outcome is reported unchanged.
//!
//! ## Architecture
//!
//! - **Expressions** ([`expr`]) - Algebraic expressions with checked evaluation
//! - **Model** ([`model`]) - Variables, named constraints and assignment checks
//! - **Assembly** ([`assembler`]) - Builds the model from the group tables
//! - **Oracles** ([`oracle`], [`exhaustive`]) - Solver interface and a reference enumerator
//! - **Configuration** ([`config`]) - Data sources and model settings
//! - **Error Handling** ([`error`]) - Engine-level error taxonomy

pub mod assembler;
pub mod config;
pub mod error;
pub mod exhaustive;
pub mod expr;
pub mod model;
pub mod oracle;
