//! Typed description of an aggregation request.

pub mod dimension;
pub mod expression;
pub mod interval;
pub mod types;

pub use dimension::{Choice, Dimension, DimensionKind, RangeBucket};
pub use expression::{ComputedOp, Expression, MetricOp, NamedExpression, DOC_COUNT};
pub use interval::{parse_interval, parse_offset, DateHistogramSpec, Interval};
pub use types::{scalar_cmp, string_form, Row};

use std::collections::HashSet;

use crate::error::{FlattenError, FlattenResult};

/// An aggregation request: ordered grouping dimensions plus named output
/// expressions. This is what the pipeline consumes together with the raw
/// response tree; building and submitting the actual search is the
/// transport's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRequest {
    /// Grouping axes, outermost first.
    pub group_by: Vec<Dimension>,
    /// Requested output columns, in declaration order.
    pub expressions: Vec<NamedExpression>,
    /// Whether the caller wants flattened rows (the normal case) or the raw
    /// engine response. Computed expressions require `flat`.
    pub flat: bool,
}

impl MetricRequest {
    pub fn new(group_by: Vec<Dimension>, expressions: Vec<NamedExpression>) -> Self {
        Self {
            group_by,
            expressions,
            flat: true,
        }
    }

    /// Ask for the raw engine response instead of flattened rows.
    pub fn raw(mut self) -> Self {
        self.flat = false;
        self
    }

    /// The non-structural dimensions, in declaration order.
    pub fn value_dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.group_by.iter().filter(|d| !d.is_structural())
    }

    /// Check the request for configuration errors, before any flattening:
    /// computed expressions are incompatible with a raw response, and every
    /// operand of every computed expression must name a column some requested
    /// expression produces.
    pub fn validate(&self) -> FlattenResult<()> {
        let mut columns: HashSet<String> = HashSet::new();
        columns.insert(DOC_COUNT.to_string());
        for ne in &self.expressions {
            columns.extend(ne.column_names());
        }

        for ne in &self.expressions {
            let Expression::Computed { operands, .. } = &ne.expr else {
                continue;
            };

            if !self.flat {
                return Err(FlattenError::ComputedRequiresFlat(ne.name.clone()));
            }

            for operand in operands {
                if !columns.contains(operand) {
                    return Err(FlattenError::UnknownOperand {
                        expression: ne.name.clone(),
                        operand: operand.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
