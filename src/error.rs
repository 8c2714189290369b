//! Error types for u-evo-schedule.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by configuration, operators, and the run lifecycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid configuration value. The previous configuration stays in effect.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown selection/crossover/mutation method id.
    #[error("Unknown {category} method id: {id}")]
    UnknownMethod {
        /// Operator category ("selection", "crossover", "mutation").
        category: &'static str,
        /// Rejected method id.
        id: u32,
    },

    /// Parameter not accepted by the chosen operator method.
    #[error("Unknown parameter '{name}' for {method}")]
    UnknownParameter {
        /// Method name.
        method: &'static str,
        /// Rejected parameter name.
        name: String,
    },

    /// Stopping-condition kind that does not exist.
    #[error("Unknown stopping condition: {0}")]
    UnknownStoppingCondition(String),

    /// Facility model failed structural validation.
    #[error("Invalid facility model: {0}")]
    InvalidFacility(String),

    /// More than one product active on a line in the same hour.
    ///
    /// Raised only by an operator bug; the offending generation is aborted.
    #[error("Invariant violation: line {line}, hour {hour} has {active} active products")]
    InvariantViolation {
        /// Line index.
        line: usize,
        /// Hour index.
        hour: usize,
        /// Number of active products found.
        active: usize,
    },

    /// Tensor shapes disagree.
    #[error("Shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Expected (lines, products, hours).
        expected: (usize, usize, usize),
        /// Actual (lines, products, hours).
        found: (usize, usize, usize),
    },

    /// The background worker could not be started.
    #[error("Failed to spawn optimization worker: {0}")]
    WorkerSpawn(String),

    /// The background worker panicked.
    #[error("Optimization worker panicked")]
    WorkerPanicked,
}
