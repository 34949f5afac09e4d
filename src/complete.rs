//! Back-fill of grouping combinations the engine never returned.
//!
//! A bucket aggregation only reports keys that matched at least one document,
//! so a grid consumer would otherwise see holes. This step derives a universe
//! of legal values per dimension, diffs the cartesian product of those
//! universes against the produced rows, and appends a zeroed placeholder row
//! per absent combination.

use std::collections::HashSet;

use serde_json::Value;

use crate::model::expression::{Expression, NamedExpression, DOC_COUNT};
use crate::model::types::{scalar_cmp, string_form, Row};
use crate::model::{Dimension, MetricRequest};

/// Separator for composite row fingerprints. Dimension values are scalars,
/// so joining their string forms is unambiguous in practice.
const FINGERPRINT_SEPARATOR: &str = "::";

/// Append placeholder rows for every combination of dimension values absent
/// from `rows`. Idempotent: a complete row set passes through unchanged.
///
/// A dimension without declared choices, ranges or generated date keys falls
/// back to the values observed in `rows`; a value that was truncated out of a
/// size-capped aggregation everywhere can therefore never be synthesized.
/// This is an accepted best-effort limit, not a defect to patch downstream.
pub fn complete_rows(rows: &mut Vec<Row>, request: &MetricRequest) {
    let dimensions: Vec<&Dimension> = request.value_dimensions().collect();
    if dimensions.is_empty() {
        return;
    }

    let universes: Vec<(String, Vec<Value>)> = dimensions
        .iter()
        .map(|dim| (dim.key.clone(), universe(dim, rows)))
        .collect();

    let seen: HashSet<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = universes
                .iter()
                .map(|(key, _)| row.get(key).map(string_form).unwrap_or_default())
                .collect();
            values.join(FINGERPRINT_SEPARATOR)
        })
        .collect();

    let mut synthesized = Vec::new();
    for combination in cartesian_product(&universes) {
        let fingerprint = combination
            .iter()
            .map(|(_, value)| string_form(value))
            .collect::<Vec<_>>()
            .join(FINGERPRINT_SEPARATOR);
        if !seen.contains(&fingerprint) {
            synthesized.push(placeholder_row(&combination, &request.expressions));
        }
    }

    rows.extend(synthesized);
}

/// The legal values of one dimension: declared if possible, otherwise the
/// distinct values observed across the produced rows, sorted ascending.
fn universe(dimension: &Dimension, rows: &[Row]) -> Vec<Value> {
    if let Some(declared) = dimension.declared_universe() {
        return declared;
    }

    let mut observed: Vec<Value> = Vec::new();
    for row in rows {
        if let Some(value) = row.get(&dimension.key) {
            if !observed.contains(value) {
                observed.push(value.clone());
            }
        }
    }
    observed.sort_by(scalar_cmp);
    observed
}

/// Every combination of one value per dimension, in dimension-declaration
/// order with the last dimension varying fastest.
fn cartesian_product(universes: &[(String, Vec<Value>)]) -> Vec<Vec<(String, Value)>> {
    // A dimension with an empty universe leaves nothing to synthesize.
    if universes.iter().any(|(_, values)| values.is_empty()) {
        return Vec::new();
    }

    let mut combinations: Vec<Vec<(String, Value)>> = vec![Vec::new()];
    for (key, values) in universes {
        let mut expanded = Vec::with_capacity(combinations.len() * values.len());
        for combination in &combinations {
            for value in values {
                let mut next = combination.clone();
                next.push((key.clone(), value.clone()));
                expanded.push(next);
            }
        }
        combinations = expanded;
    }
    combinations
}

/// A zeroed row for one absent combination: dimension columns set, every
/// metric and computed column null, doc counts zero.
fn placeholder_row(
    combination: &[(String, Value)],
    expressions: &[NamedExpression],
) -> Row {
    let mut row = Row::new();
    for (key, value) in combination {
        row.insert(key.clone(), value.clone());
    }

    for ne in expressions {
        match &ne.expr {
            Expression::Metric { .. } | Expression::Computed { .. } => {
                row.insert(ne.name.clone(), Value::Null);
            }
            Expression::DocCount => {}
            Expression::ReverseNested { path, metrics } => {
                let bundle = format!("reverse_nested_{path}");
                for metric in metrics {
                    if matches!(metric.expr, Expression::DocCount) {
                        continue;
                    }
                    row.insert(format!("{bundle}__{}", metric.name), Value::Null);
                }
                row.insert(format!("{bundle}__{DOC_COUNT}"), Value::from(0));
            }
        }
    }

    row.insert(DOC_COUNT.to_string(), Value::from(0));
    row
}
