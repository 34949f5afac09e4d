//! Shared row and scalar utilities.

use std::cmp::Ordering;

use serde_json::{Map, Value};

/// A flat output row: column name to scalar value.
///
/// The row *sequence* carries the engine's (or the completion step's)
/// ordering; column order inside one row is deterministic but alphabetical.
pub type Row = Map<String, Value>;

/// The string form of a scalar, used for fingerprinting dimension values.
///
/// Strings render without quotes so that a bucket key `"cash"` and a declared
/// choice `"cash"` fingerprint identically; other scalars use their JSON
/// rendering.
pub fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Total order over scalar cells, for sorting an empirically observed
/// dimension universe: null < booleans < numbers < strings, numbers compared
/// as floats, everything else by JSON rendering.
pub fn scalar_cmp(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a)
            .cmp(&rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}
