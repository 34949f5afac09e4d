//! Destructive leftmost-leaf flattening of a normalized aggregation tree.

use serde_json::Value;

use super::normalize::collapse_nested;
use super::{is_reserved, REVERSE_NESTED_PREFIX};
use crate::model::expression::DOC_COUNT;
use crate::model::types::Row;
use crate::pipeline::FlattenOptions;

/// One step of the traversal path from the `aggregations` root.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Key(String),
    Index(usize),
}

/// Owns one raw engine response for the duration of a flatten.
///
/// The traversal deletes every consumed leaf and every exhausted bucket
/// collection as it goes, so the tree strictly shrinks and the walk
/// terminates; the response cannot be flattened twice. Callers that need to
/// run the same response through the pipeline again must pass a fresh clone.
pub struct ResultTree {
    result: Value,
}

impl ResultTree {
    pub fn new(result: Value) -> Self {
        Self { result }
    }

    /// Turn the response into raw rows: dimension values, metric values and
    /// exploded reverse-nested bundle columns. Computed columns are not
    /// resolved here and no placeholder rows are synthesized.
    ///
    /// A response without an `aggregations` section yields no rows.
    pub fn flatten(mut self, options: &FlattenOptions) -> Vec<Row> {
        let Some(aggregations) = self.result.get_mut("aggregations").map(Value::take) else {
            return Vec::new();
        };
        extract_rows(aggregations, options)
    }
}

/// Lexicographically-first top-level key that names an aggregation rather
/// than entry metadata.
fn first_dimension_key(aggregations: &Value, skip: Option<&str>) -> Option<String> {
    let obj = aggregations.as_object()?;
    obj.keys()
        .filter(|k| !is_reserved(k))
        .find(|k| skip != Some(k.as_str()))
        .cloned()
}

fn extract_rows(aggregations: Value, options: &FlattenOptions) -> Vec<Row> {
    let Some(bootstrap_key) = first_dimension_key(&aggregations, None) else {
        return Vec::new();
    };

    // A metrics-only response has no buckets to walk at all: one row.
    let first = &aggregations[bootstrap_key.as_str()];
    if first.get("buckets").is_none() && first.get("doc_count").is_none() {
        let mut row = Row::new();
        if let Some(obj) = aggregations.as_object() {
            for (key, node) in obj {
                row.insert(
                    key.clone(),
                    node.get("value").cloned().unwrap_or(Value::Null),
                );
            }
        }
        return vec![row];
    }

    let mut aggregations = if options.collapse_nested {
        collapse_nested(aggregations)
    } else {
        aggregations
    };

    // The collapse may have replaced the top-level key set.
    let Some(mut current_key) = first_dimension_key(&aggregations, None) else {
        return Vec::new();
    };

    let mut rows: Vec<Row> = Vec::new();
    let mut partial = Row::new();
    let mut path: Vec<Step> = vec![Step::Key(current_key.clone())];
    let mut depth: usize = 0;

    loop {
        // Consuming a top-level node without buckets (possible when the
        // collapse is skipped) empties the path. Re-bootstrap on whatever
        // top-level aggregations remain, or stop; the tree keeps shrinking
        // either way.
        if path.is_empty() {
            let Some(next_key) = first_dimension_key(&aggregations, None) else {
                break;
            };
            current_key = next_key;
            path.push(Step::Key(current_key.clone()));
        }

        // A node without buckets is a consumed-ready leaf: a bucket entry
        // carrying its metrics.
        if node_at(&aggregations, &path).get("buckets").is_none() {
            let row = make_row(&partial, node_at(&aggregations, &path));
            rows.push(row);

            delete_at(&mut aggregations, &path);
            path.pop(); // the entry marker
            path.pop(); // "buckets"
            depth = depth.saturating_sub(1);
            continue;
        }

        if options.add_others_row {
            let node = node_at_mut(&mut aggregations, &path);
            let others = node
                .as_object_mut()
                .and_then(|obj| obj.remove("sum_other_doc_count"));
            if let Some(others_count) = others {
                let mut row = partial.clone();
                row.insert(current_key.clone(), Value::String("others".to_string()));
                row.insert(DOC_COUNT.to_string(), others_count);
                rows.push(row);
            }
        }

        let buckets_empty = match node_at(&aggregations, &path).get("buckets") {
            Some(Value::Array(entries)) => entries.is_empty(),
            Some(Value::Object(entries)) => entries.is_empty(),
            _ => true,
        };

        if buckets_empty && depth == 0 {
            // Another top-level aggregation may remain to be walked.
            if let Some(next_key) = first_dimension_key(&aggregations, Some(&current_key)) {
                if let Some(obj) = aggregations.as_object_mut() {
                    obj.remove(&current_key);
                }
                partial.remove(&current_key);
                current_key = next_key;
                path = vec![Step::Key(current_key.clone())];
                continue;
            }
            break;
        }

        if buckets_empty {
            // This dimension is exhausted below the root: hand over to a
            // sibling aggregation in the same bucket entry, or backtrack.
            partial.remove(&current_key);

            let entry_path = &path[..path.len() - 1];
            let sibling = node_at(&aggregations, entry_path)
                .as_object()
                .and_then(|obj| {
                    obj.keys()
                        .find(|k| !is_reserved(k) && k.as_str() != current_key)
                        .cloned()
                });

            match sibling {
                Some(next_key) => {
                    let entry = node_at_mut(&mut aggregations, entry_path);
                    if let Some(obj) = entry.as_object_mut() {
                        obj.remove(&current_key);
                    }
                    path.pop();
                    current_key = next_key;
                    path.push(Step::Key(current_key.clone()));
                }
                None => {
                    delete_at(&mut aggregations, entry_path);
                    path.pop(); // the exhausted dimension key
                    path.pop(); // the entry marker
                    path.pop(); // "buckets"
                    depth = depth.saturating_sub(1);
                    current_key = match path.last() {
                        Some(Step::Key(key)) => key.clone(),
                        _ => break,
                    };
                }
            }
            continue;
        }

        // Descend into the first remaining bucket entry. For dict-shaped
        // collections the smallest key is a deterministic traversal choice
        // only; output order still follows the order entries are consumed.
        let (entry_step, bucket_key) = match node_at(&aggregations, &path).get("buckets") {
            Some(Value::Array(entries)) => (
                Step::Index(0),
                entries[0].get("key").cloned().unwrap_or(Value::Null),
            ),
            Some(Value::Object(entries)) => match entries.keys().next() {
                Some(first) => (Step::Key(first.clone()), Value::String(first.clone())),
                None => break,
            },
            _ => break,
        };

        partial.insert(current_key.clone(), bucket_key);
        path.push(Step::Key("buckets".to_string()));
        path.push(entry_step);

        // If the entry introduces a further dimension one level down, make it
        // the current one; otherwise the entry will be consumed as a leaf.
        let deeper = node_at(&aggregations, &path).as_object().and_then(|obj| {
            obj.iter()
                .find(|(k, v)| !is_reserved(k) && v.get("buckets").is_some())
                .map(|(k, _)| k.clone())
        });
        if let Some(next_key) = deeper {
            current_key = next_key;
            path.push(Step::Key(current_key.clone()));
        }
        depth += 1;
    }

    rows
}

/// Build one output row from the partial dimension bindings plus everything
/// the leaf entry carries: its doc_count, its leaf metrics, and its
/// reverse-nested bundles exploded into prefixed columns.
fn make_row(partial: &Row, leaf: &Value) -> Row {
    let mut row = partial.clone();
    let Some(obj) = leaf.as_object() else {
        return row;
    };

    for (key, value) in obj {
        if key.starts_with(REVERSE_NESTED_PREFIX) {
            if let Some(bundle) = value.as_object() {
                for (inner_key, inner_value) in bundle {
                    let cell = match inner_value {
                        Value::Object(metric) => {
                            metric.get("value").cloned().unwrap_or(Value::Null)
                        }
                        other => other.clone(),
                    };
                    row.insert(format!("{key}__{inner_key}"), cell);
                }
            }
        } else if key == DOC_COUNT {
            row.insert(key.clone(), value.clone());
        } else if is_reserved(key) {
            continue;
        } else if let Some(metric) = value.as_object() {
            if let Some(metric_value) = metric.get("value") {
                row.insert(key.clone(), metric_value.clone());
            }
        }
    }

    row
}

fn node_at<'a>(root: &'a Value, path: &[Step]) -> &'a Value {
    let mut node = root;
    for step in path {
        node = match step {
            Step::Key(key) => &node[key.as_str()],
            Step::Index(index) => &node[*index],
        };
    }
    node
}

fn node_at_mut<'a>(root: &'a mut Value, path: &[Step]) -> &'a mut Value {
    let mut node = root;
    for step in path {
        node = match step {
            Step::Key(key) => &mut node[key.as_str()],
            Step::Index(index) => &mut node[*index],
        };
    }
    node
}

fn delete_at(root: &mut Value, path: &[Step]) {
    let Some((last, parent_path)) = path.split_last() else {
        return;
    };
    let parent = node_at_mut(root, parent_path);
    match last {
        Step::Key(key) => {
            if let Some(obj) = parent.as_object_mut() {
                obj.remove(key);
            }
        }
        Step::Index(index) => {
            if let Some(entries) = parent.as_array_mut() {
                if *index < entries.len() {
                    entries.remove(*index);
                }
            }
        }
    }
}
