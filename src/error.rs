//! Error types for the result-shaping pipeline.
//!
//! A response without an `aggregations` section is not an error: it flattens
//! to an empty row set. The variants here all describe configuration
//! mistakes in the request, detected either eagerly by
//! [`MetricRequest::validate`](crate::model::MetricRequest::validate) or by
//! the computed-column evaluator when it can make no further progress.

use thiserror::Error;

/// Result type for pipeline operations.
pub type FlattenResult<T> = Result<T, FlattenError>;

/// Errors that can occur while shaping an aggregation result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlattenError {
    /// A computed expression was requested together with the raw, un-flattened
    /// response. Computed columns only exist after flattening.
    #[error("computed expression '{0}' requires a flattened result")]
    ComputedRequiresFlat(String),

    /// A computed expression references a column that no requested expression
    /// produces.
    #[error("computed expression '{expression}' references unknown column '{operand}'")]
    UnknownOperand {
        /// Name of the computed expression.
        expression: String,
        /// The operand column that could not be resolved.
        operand: String,
    },

    /// The evaluator made no progress over a full pass: the listed computed
    /// columns depend on each other in a cycle, or on an operand that never
    /// appears in any row.
    #[error("computed expressions cannot be resolved: {}", .0.join(", "))]
    EvaluationStalled(Vec<String>),
}
