//! The raw aggregation tree: wrapper collapse and destructive flattening.

pub mod flatten;
pub mod normalize;

pub use flatten::ResultTree;
pub use normalize::{collapse_nested, is_nested_wrapper};

/// Structural keys a bucket entry carries about itself, as opposed to child
/// aggregations.
pub(crate) const RESERVED_KEYS: [&str; 7] = [
    "key",
    "key_as_string",
    "doc_count",
    "from",
    "from_as_string",
    "to",
    "to_as_string",
];

/// Key prefix marking a reverse-nested bundle. Such nodes are never collapsed
/// and are exploded into prefixed columns at flatten time.
pub(crate) const REVERSE_NESTED_PREFIX: &str = "reverse_nested";

pub(crate) fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}
