use thiserror::Error;

use super::config::ConfigError;
use super::expr::EvalError;
use super::model::Assignment;
use crate::core::groups::library::{LibraryLoadError, MissingCoefficient};
use crate::core::heat_capacity::table::HeatCapacityLoadError;
use crate::core::properties::estimator::EstimationError;

/// Best point an oracle reported before giving up, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct BestKnown {
    pub assignment: Assignment,
    pub objective: f64,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to load group library: {source}")]
    Library {
        #[from]
        source: LibraryLoadError,
    },

    #[error("Failed to load heat-capacity table: {source}")]
    HeatCapacity {
        #[from]
        source: HeatCapacityLoadError,
    },

    #[error("Model assembly failed: {source}")]
    MissingCoefficient {
        #[from]
        source: MissingCoefficient,
    },

    #[error("The design model has no feasible solution")]
    InfeasibleModel,

    #[error("Solver stopped at its time limit")]
    SolverTimeout { best_known: Option<BestKnown> },

    #[error("Solver failed: {message}")]
    Solver {
        message: String,
        best_known: Option<BestKnown>,
    },

    #[error("Numeric domain violation: {source}")]
    Evaluation {
        #[from]
        source: EvalError,
    },

    #[error("Property estimation failed: {source}")]
    Estimation {
        #[from]
        source: EstimationError,
    },
}
