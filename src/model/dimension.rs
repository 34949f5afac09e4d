//! Requested grouping dimensions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::interval::DateHistogramSpec;
use crate::model::types::string_form;

/// One requested grouping axis.
///
/// `key` names the aggregation in the request and the column in produced
/// rows; `field` is the storage path inside a document (dot-separated when
/// nested) and defaults to `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub key: String,
    pub field: String,
    /// Result-size cap for terms buckets.
    pub size: Option<u64>,
    pub kind: DimensionKind,
}

/// How a dimension partitions documents, and therefore where its universe of
/// legal values comes from. One variant per bucket shape, so a dimension can
/// never carry conflicting choice/range/group declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DimensionKind {
    /// Frequency buckets; the universe is discovered empirically from rows.
    Terms,
    /// Explicit ordered list of legal keys.
    Choices(Vec<Choice>),
    /// Ordered numeric/date range descriptors.
    Ranges(Vec<RangeBucket>),
    /// Interval buckets over a date field; with bounds and a supported
    /// interval the universe is generated arithmetically.
    DateHistogram(DateHistogramSpec),
    /// Named filter predicates: group name to the raw values it covers.
    Filters(Vec<(String, Vec<Value>)>),
    /// A nesting-scope marker; contributes no output column and is skipped
    /// by the completer.
    Nested { path: String },
}

/// A legal dimension value, optionally carrying a display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: Value,
    pub label: Option<String>,
}

impl Choice {
    pub fn plain(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    pub fn labeled(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: Some(label.into()),
        }
    }
}

/// One range descriptor: `{from?, to?, key?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBucket {
    pub from: Option<Value>,
    pub to: Option<Value>,
    pub key: Option<String>,
}

impl RangeBucket {
    /// The bucket key the engine will report: the explicit `key` when one was
    /// declared, otherwise the `{from}-{to}` form the engine synthesizes.
    pub fn derived_key(&self) -> String {
        if let Some(key) = &self.key {
            return key.clone();
        }
        let from = self.from.as_ref().map(string_form).unwrap_or_default();
        let to = self.to.as_ref().map(string_form).unwrap_or_default();
        format!("{from}-{to}")
    }
}

impl Dimension {
    pub fn terms(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
            size: None,
            kind: DimensionKind::Terms,
        }
    }

    pub fn with_choices(key: impl Into<String>, choices: Vec<Choice>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
            size: None,
            kind: DimensionKind::Choices(choices),
        }
    }

    pub fn with_ranges(key: impl Into<String>, ranges: Vec<RangeBucket>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
            size: None,
            kind: DimensionKind::Ranges(ranges),
        }
    }

    pub fn date_histogram(key: impl Into<String>, spec: DateHistogramSpec) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
            size: None,
            kind: DimensionKind::DateHistogram(spec),
        }
    }

    pub fn filters(key: impl Into<String>, groups: Vec<(String, Vec<Value>)>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
            size: None,
            kind: DimensionKind::Filters(groups),
        }
    }

    pub fn nested(key: impl Into<String>, path: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            field: key.clone(),
            key,
            size: None,
            kind: DimensionKind::Nested { path: path.into() },
        }
    }

    /// Override the storage path when it differs from the column key.
    pub fn stored_as(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Cap the number of buckets the engine returns for this dimension.
    pub fn sized(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Whether this dimension only marks a nesting scope and produces no
    /// output column of its own.
    pub fn is_structural(&self) -> bool {
        matches!(self.kind, DimensionKind::Nested { .. })
    }

    /// The universe of legal values declared on this dimension, if any.
    /// `None` means the universe must be observed empirically from rows.
    pub fn declared_universe(&self) -> Option<Vec<Value>> {
        match &self.kind {
            DimensionKind::Choices(choices) => {
                Some(choices.iter().map(|c| c.value.clone()).collect())
            }
            DimensionKind::Ranges(ranges) => Some(
                ranges
                    .iter()
                    .map(|r| Value::String(r.derived_key()))
                    .collect(),
            ),
            DimensionKind::DateHistogram(spec) => spec
                .choice_keys()
                .map(|keys| keys.into_iter().map(Value::from).collect()),
            DimensionKind::Filters(groups) => Some(
                groups
                    .iter()
                    .map(|(name, _)| Value::String(name.clone()))
                    .collect(),
            ),
            DimensionKind::Terms | DimensionKind::Nested { .. } => None,
        }
    }
}
