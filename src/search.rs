//! Rendering of the aggregation section of a search request.
//!
//! The pipeline itself never talks to the engine; this module only builds the
//! JSON body a transport would submit, so that the aggregation names in the
//! response line up with the dimension keys and expression names the
//! flattener and completer expect.

use serde_json::{json, Map, Value};

use crate::model::expression::{Expression, NamedExpression};
use crate::model::{Dimension, DimensionKind, MetricRequest};

/// Builds a search body from a request description.
pub struct SearchBuilder<'a> {
    request: &'a MetricRequest,
    default_size: Option<u64>,
    order_by: Option<(String, String)>,
}

impl<'a> SearchBuilder<'a> {
    pub fn new(request: &'a MetricRequest) -> Self {
        Self {
            request,
            default_size: None,
            order_by: None,
        }
    }

    /// Size applied to terms dimensions that declare no cap of their own.
    pub fn default_size(mut self, size: u64) -> Self {
        self.default_size = Some(size);
        self
    }

    /// Order the innermost terms buckets by a metric column.
    pub fn order_by(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_by = Some((column.into(), direction.into()));
        self
    }

    /// The full search body: a match-all query plus the aggregations.
    pub fn search_body(&self) -> Value {
        let mut body = json!({"query": {"match_all": {}}});
        let aggs = self.aggregation_body();
        if !aggs.is_empty() {
            body["aggs"] = Value::Object(aggs);
        }
        body
    }

    /// The `aggs` section: dimensions nested in declaration order, leaf
    /// metrics and reverse-nested bundles attached to the innermost bucket.
    pub fn aggregation_body(&self) -> Map<String, Value> {
        let mut inner = metric_aggs(&self.request.expressions);

        let innermost_key = self
            .request
            .value_dimensions()
            .last()
            .map(|dim| dim.key.clone());

        for dim in self.request.group_by.iter().rev() {
            let ordered = innermost_key.as_deref() == Some(dim.key.as_str());
            let mut agg = self.dimension_agg(dim, ordered);
            if !inner.is_empty() {
                agg.insert("aggs".to_string(), Value::Object(inner));
            }
            let mut level = Map::new();
            level.insert(dim.key.clone(), Value::Object(agg));
            inner = level;
        }

        inner
    }

    fn dimension_agg(&self, dim: &Dimension, ordered: bool) -> Map<String, Value> {
        let mut agg = Map::new();

        match &dim.kind {
            DimensionKind::Terms | DimensionKind::Choices(_) => {
                let mut terms = Map::new();
                terms.insert("field".to_string(), Value::String(dim.field.clone()));
                if let Some(size) = dim.size.or(self.default_size) {
                    terms.insert("size".to_string(), Value::from(size));
                }
                if ordered {
                    if let Some((column, direction)) = &self.order_by {
                        terms.insert(
                            "order".to_string(),
                            json!({column.clone(): direction.clone()}),
                        );
                    }
                }
                agg.insert("terms".to_string(), Value::Object(terms));
            }
            DimensionKind::Ranges(ranges) => {
                let descriptors: Vec<Value> = ranges
                    .iter()
                    .map(|range| {
                        let mut descriptor = Map::new();
                        if let Some(from) = &range.from {
                            descriptor.insert("from".to_string(), from.clone());
                        }
                        if let Some(to) = &range.to {
                            descriptor.insert("to".to_string(), to.clone());
                        }
                        if let Some(key) = &range.key {
                            descriptor.insert("key".to_string(), Value::String(key.clone()));
                        }
                        Value::Object(descriptor)
                    })
                    .collect();
                agg.insert(
                    "range".to_string(),
                    json!({
                        "field": dim.field,
                        "keyed": true,
                        "ranges": descriptors,
                    }),
                );
            }
            DimensionKind::DateHistogram(spec) => {
                let mut histogram = Map::new();
                histogram.insert("field".to_string(), Value::String(dim.field.clone()));
                histogram.insert(
                    "interval".to_string(),
                    Value::String(spec.interval.clone()),
                );
                // Empty buckets must be reported for the grid to be complete.
                histogram.insert("min_doc_count".to_string(), Value::from(0));
                if let (Some(min), Some(max)) = (spec.min, spec.max) {
                    histogram.insert(
                        "extended_bounds".to_string(),
                        json!({
                            "min": format_bound(min),
                            "max": format_bound(max),
                        }),
                    );
                }
                if let Some(offset) = &spec.offset {
                    histogram.insert("offset".to_string(), Value::String(offset.clone()));
                }
                agg.insert("date_histogram".to_string(), Value::Object(histogram));
            }
            DimensionKind::Filters(groups) => {
                let mut filters = Map::new();
                for (name, values) in groups {
                    filters.insert(
                        name.clone(),
                        json!({"terms": {dim.field.clone(): values.clone()}}),
                    );
                }
                agg.insert("filters".to_string(), json!({"filters": filters}));
            }
            DimensionKind::Nested { path } => {
                agg.insert("nested".to_string(), json!({"path": path}));
            }
        }

        agg
    }
}

/// The leaf metric and reverse-nested aggregations attached to the innermost
/// bucket. Doc counts are implicit and computed columns are post-processing,
/// so neither contributes anything here.
fn metric_aggs(expressions: &[NamedExpression]) -> Map<String, Value> {
    let mut aggs = Map::new();

    for ne in expressions {
        match &ne.expr {
            Expression::Metric { op, field } => {
                aggs.insert(ne.name.clone(), json!({op.reference(): {"field": field}}));
            }
            Expression::ReverseNested { path, metrics } => {
                let mut body = Map::new();
                // path must not be provided for a root reverse_nested bucket
                if path != "root" {
                    body.insert("path".to_string(), Value::String(path.clone()));
                }
                let mut bundle = Map::new();
                bundle.insert("reverse_nested".to_string(), Value::Object(body));
                let inner = metric_aggs(metrics);
                if !inner.is_empty() {
                    bundle.insert("aggs".to_string(), Value::Object(inner));
                }
                aggs.insert(format!("reverse_nested_{path}"), Value::Object(bundle));
            }
            Expression::DocCount | Expression::Computed { .. } => {}
        }
    }

    aggs
}

fn format_bound(bound: chrono::DateTime<chrono::Utc>) -> String {
    bound.format("%Y-%m-%dT%H:%M:%S").to_string()
}
