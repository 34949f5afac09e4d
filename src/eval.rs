//! Resolution of computed columns on flattened rows.
//!
//! Computed expressions name their operands, which may themselves be computed
//! columns, so each row is scanned repeatedly: a pass resolves every computed
//! column whose operands are all present, and the scan repeats until nothing
//! is left. A pass that resolves nothing while unresolved columns remain
//! means a dependency cycle or a permanently missing operand, which is a
//! configuration error rather than something to spin on.

use serde_json::{Number, Value};

use crate::error::{FlattenError, FlattenResult};
use crate::model::expression::{ComputedOp, Expression, NamedExpression};
use crate::model::types::Row;

/// Resolve every computed column on `row`, in place.
pub fn evaluate_row(row: &mut Row, expressions: &[NamedExpression]) -> FlattenResult<()> {
    loop {
        let mut unresolved = Vec::new();
        let mut progressed = false;

        for ne in expressions {
            let Expression::Computed { op, operands } = &ne.expr else {
                continue;
            };
            if row.contains_key(&ne.name) {
                continue;
            }

            if operands.iter().all(|operand| row.contains_key(operand)) {
                let value = compute(*op, operands, row);
                row.insert(ne.name.clone(), value);
                progressed = true;
            } else {
                unresolved.push(ne.name.clone());
            }
        }

        if unresolved.is_empty() {
            return Ok(());
        }
        if !progressed {
            return Err(FlattenError::EvaluationStalled(unresolved));
        }
    }
}

fn compute(op: ComputedOp, operands: &[String], row: &Row) -> Value {
    let numbers: Vec<Option<f64>> = operands
        .iter()
        .map(|operand| row.get(operand).and_then(Value::as_f64))
        .collect();

    let result = match op {
        ComputedOp::Addition => add_or_none(&numbers),
        ComputedOp::Subtraction => sub_or_none(&numbers),
        ComputedOp::Ratio => div_or_none(&numbers),
    };

    match result.and_then(Number::from_f64) {
        Some(number) => Value::Number(number),
        None => Value::Null,
    }
}

/// Sum of all operands; any null operand makes the result null.
fn add_or_none(operands: &[Option<f64>]) -> Option<f64> {
    operands.iter().copied().sum()
}

/// Minuend minus subtrahend; null if either is null.
fn sub_or_none(operands: &[Option<f64>]) -> Option<f64> {
    match operands {
        [Some(minuend), Some(subtrahend)] => Some(minuend - subtrahend),
        _ => None,
    }
}

/// Percentage ratio; a null dividend, or a null or zero divisor, yields null.
fn div_or_none(operands: &[Option<f64>]) -> Option<f64> {
    match operands {
        [Some(dividend), Some(divisor)] if *divisor != 0.0 => {
            Some(100.0 * dividend / divisor)
        }
        _ => None,
    }
}
