//! One-call orchestration: normalize, flatten, evaluate, complete.

use serde_json::Value;

use crate::complete::complete_rows;
use crate::error::FlattenResult;
use crate::eval::evaluate_row;
use crate::model::types::Row;
use crate::model::MetricRequest;
use crate::tree::ResultTree;

/// Caller-supplied behavior flags for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Collapse transparent nested-object wrapper levels before flattening.
    /// Turning this off is a diagnostic mode; flattened output for nested
    /// requests is not meaningful without the collapse.
    pub collapse_nested: bool,
    /// Synthesize an "others" row per size-capped bucket collection, from the
    /// engine's `sum_other_doc_count` figure.
    pub add_others_row: bool,
    /// Run the missing-combination completion step.
    pub fill_missing: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            collapse_nested: true,
            add_others_row: false,
            fill_missing: true,
        }
    }
}

/// Shape one raw engine response into a complete row set.
///
/// Consumes the response: the flattening traversal is destructive. Callers
/// that want to shape the same response twice must pass a fresh clone each
/// time.
pub fn shape_result(
    request: &MetricRequest,
    response: Value,
    options: &FlattenOptions,
) -> FlattenResult<Vec<Row>> {
    request.validate()?;

    let mut rows = ResultTree::new(response).flatten(options);
    for row in &mut rows {
        evaluate_row(row, &request.expressions)?;
    }

    if options.fill_missing {
        complete_rows(&mut rows, request);
    }

    Ok(rows)
}
