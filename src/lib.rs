//! # esrows
//!
//! Flattens Elasticsearch bucket/metric aggregation responses into complete
//! tabular rows.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │       MetricRequest (dimensions + named expressions)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [search] (request body rendering)
//!                          │
//!              ... search engine executes ...
//!                          │
//!                          ▼ [tree::normalize]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Response tree with nested wrappers collapsed         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [tree::flatten]
//! ┌─────────────────────────────────────────────────────────┐
//! │       Raw rows (dimension keys + metric values)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [eval]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Rows with computed columns resolved            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [complete]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Complete grid (placeholder rows for absent buckets)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole pipeline is synchronous and performs no I/O; the caller obtains
//! the response tree through whatever transport it likes and hands it over as
//! a `serde_json::Value`.

pub mod complete;
pub mod error;
pub mod eval;
pub mod model;
pub mod pipeline;
pub mod search;
pub mod tree;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::complete::complete_rows;
    pub use crate::error::{FlattenError, FlattenResult};
    pub use crate::eval::evaluate_row;
    pub use crate::model::{
        Choice, ComputedOp, DateHistogramSpec, Dimension, DimensionKind, Expression, MetricOp,
        MetricRequest, NamedExpression, RangeBucket, Row,
    };
    pub use crate::pipeline::{shape_result, FlattenOptions};
    pub use crate::search::SearchBuilder;
    pub use crate::tree::{collapse_nested, ResultTree};
}

// Also export at crate root for convenience
pub use error::{FlattenError, FlattenResult};
pub use model::{Dimension, Expression, MetricRequest, NamedExpression, Row};
pub use pipeline::{shape_result, FlattenOptions};
pub use tree::ResultTree;
