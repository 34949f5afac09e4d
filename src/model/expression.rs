//! Requested output columns.

use serde::{Deserialize, Serialize};

/// Column name of the implicit per-bucket document count.
pub const DOC_COUNT: &str = "doc_count";

/// A named output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedExpression {
    pub name: String,
    pub expr: Expression,
}

/// What a column contains. Closed set: one variant per shape the engine (or
/// the evaluator) can produce, each carrying only the fields it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// One numeric aggregation over one stored field.
    Metric { op: MetricOp, field: String },
    /// The implicit row count; always present in produced rows.
    DocCount,
    /// A named group of leaf metrics evaluated at a shallower document scope
    /// than the enclosing dimensions. Exploded into `<bundle>__<member>`
    /// columns plus `<bundle>__doc_count`.
    ReverseNested {
        /// Nested path to return from; `"root"` returns to the document root.
        path: String,
        metrics: Vec<NamedExpression>,
    },
    /// An operator over other requested columns, by name. Not tied to any
    /// stored field; resolved after flattening.
    Computed {
        op: ComputedOp,
        operands: Vec<String>,
    },
}

/// Leaf numeric aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricOp {
    Sum,
    Avg,
    Min,
    Max,
    Cardinality,
}

impl MetricOp {
    /// The aggregation name the engine expects in a request body.
    pub fn reference(&self) -> &'static str {
        match self {
            MetricOp::Sum => "sum",
            MetricOp::Avg => "avg",
            MetricOp::Min => "min",
            MetricOp::Max => "max",
            MetricOp::Cardinality => "cardinality",
        }
    }
}

/// Operators for computed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComputedOp {
    /// Sum of all operands; null if any operand is null.
    Addition,
    /// First operand minus second; null if either is null.
    Subtraction,
    /// `100 * dividend / divisor`; null on null dividend or null/zero divisor.
    Ratio,
}

impl NamedExpression {
    pub fn metric(name: impl Into<String>, op: MetricOp, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expr: Expression::Metric {
                op,
                field: field.into(),
            },
        }
    }

    pub fn doc_count() -> Self {
        Self {
            name: DOC_COUNT.to_string(),
            expr: Expression::DocCount,
        }
    }

    pub fn reverse_nested(path: impl Into<String>, metrics: Vec<NamedExpression>) -> Self {
        let path = path.into();
        Self {
            name: format!("reverse_nested_{path}"),
            expr: Expression::ReverseNested { path, metrics },
        }
    }

    pub fn computed(
        name: impl Into<String>,
        op: ComputedOp,
        operands: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            expr: Expression::Computed { op, operands },
        }
    }

    /// The bundle column prefix, for reverse-nested expressions.
    pub fn bundle_name(&self) -> Option<String> {
        match &self.expr {
            Expression::ReverseNested { path, .. } => Some(format!("reverse_nested_{path}")),
            _ => None,
        }
    }

    /// Every output column this expression contributes to a row.
    pub fn column_names(&self) -> Vec<String> {
        match &self.expr {
            Expression::Metric { .. } | Expression::Computed { .. } => vec![self.name.clone()],
            Expression::DocCount => vec![DOC_COUNT.to_string()],
            Expression::ReverseNested { path, metrics } => {
                let bundle = format!("reverse_nested_{path}");
                let mut names: Vec<String> = metrics
                    .iter()
                    .filter(|m| !matches!(m.expr, Expression::DocCount))
                    .map(|m| format!("{bundle}__{}", m.name))
                    .collect();
                names.push(format!("{bundle}__{DOC_COUNT}"));
                names
            }
        }
    }
}
