//! Collapse of transparent "nested object" wrapper levels.
//!
//! A nested aggregation introduces a wrapper node that carries only a
//! `doc_count` plus the child aggregations of the deeper scope. The response
//! declares no schema, so wrappers are recognized purely by shape and merged
//! into their parent before flattening.

use serde_json::{Map, Value};

use super::REVERSE_NESTED_PREFIX;

/// Classify a candidate node as a transparent nested wrapper.
///
/// The rule order matters: bucket collections, bucket/range entries and leaf
/// metrics all resemble wrappers in part, and the `sibling_keys` guard is
/// what keeps keyed-range and filters bucket entries (which carry a
/// `doc_count` but no `key`) from being merged away. Do not reorder.
pub fn is_nested_wrapper(
    node: &Value,
    parent_is_root: bool,
    sibling_keys: Option<&Map<String, Value>>,
) -> bool {
    // Not even a node, or a list of buckets
    let Some(obj) = node.as_object() else {
        return false;
    };

    // Standard aggregation
    if obj.contains_key("buckets") {
        return false;
    }

    // Bucket
    if obj.contains_key("key") {
        return false;
    }

    // Range bucket
    if obj.contains_key("from") || obj.contains_key("to") {
        return false;
    }

    // Nested wrappers have a doc_count
    if !obj.contains_key("doc_count") {
        return false;
    }

    // Can happen with filters aggregations: a keyed bucket entry looks like a
    // wrapper, but its siblings have no doc_count of their own.
    if let Some(siblings) = sibling_keys {
        if !parent_is_root && !siblings.contains_key("doc_count") {
            return false;
        }
    }

    // A wrapper's mapping-valued children must themselves be aggregations or
    // deeper wrappers, never bucket entries.
    for child in obj.values() {
        if let Some(child_obj) = child.as_object() {
            let child_is_wrapper = is_nested_wrapper(child, false, Some(obj));
            if child_obj.contains_key("doc_count") && !child_is_wrapper {
                return false;
            }
        }
    }

    // Node like {"value": 123.456}
    if obj.values().all(|child| !child.is_object()) {
        return false;
    }

    true
}

/// Replace every nested wrapper under `node` by its own children, merged into
/// the parent's key set. Entry point for a whole `aggregations` section.
pub fn collapse_nested(node: Value) -> Value {
    collapse_to_fixpoint(node, true)
}

/// Removing one wrapper can expose a parent that now itself qualifies, so
/// rebuilding repeats until the tree stops changing.
fn collapse_to_fixpoint(mut node: Value, parent_is_root: bool) -> Value {
    loop {
        let collapsed = collapse_once(&node, parent_is_root);
        if collapsed == node {
            return collapsed;
        }
        node = collapsed;
    }
}

fn collapse_once(node: &Value, parent_is_root: bool) -> Value {
    let Some(obj) = node.as_object() else {
        return node.clone();
    };

    let mut rebuilt = Map::new();

    // Reverse-sorted key order makes merge collisions deterministic.
    let mut keys: Vec<&String> = obj.keys().collect();
    keys.sort();
    keys.reverse();

    for key in keys {
        let child = &obj[key.as_str()];

        if key.starts_with(REVERSE_NESTED_PREFIX) {
            rebuilt.insert(key.clone(), child.clone());
        } else if child.is_object() {
            if is_nested_wrapper(child, parent_is_root, Some(obj)) {
                let merged = collapse_to_fixpoint(child.clone(), false);
                if let Some(merged_obj) = merged.as_object() {
                    for (k, v) in merged_obj {
                        rebuilt.insert(k.clone(), v.clone());
                    }
                }
            } else {
                rebuilt.insert(key.clone(), collapse_to_fixpoint(child.clone(), false));
            }
        } else if let Some(entries) = child.as_array() {
            let entries = entries
                .iter()
                .map(|entry| {
                    if entry.is_object() {
                        collapse_to_fixpoint(entry.clone(), false)
                    } else {
                        entry.clone()
                    }
                })
                .collect();
            rebuilt.insert(key.clone(), Value::Array(entries));
        } else {
            rebuilt.insert(key.clone(), child.clone());
        }
    }

    Value::Object(rebuilt)
}
