//! Tag merging and deterministic label ordering.
//!
//! A `TagSet` holds service-wide default tags. Merging per-call tags on
//! top produces a sorted `LabelSet`: names in lexicographic order with
//! values aligned positionally, so the same key set always binds the
//! same label shape.

use std::collections::BTreeMap;

/// Tag mapping as supplied by metric callers.
pub type Tags = BTreeMap<String, String>;

/// Sorted label names with positionally aligned values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    names: Vec<String>,
    values: Vec<String>,
}

impl LabelSet {
    /// Build from a merged tag map.
    pub fn from_tags(tags: &Tags) -> Self {
        let (names, values) = tags.iter().map(|(k, v)| (k.clone(), v.clone())).unzip();
        Self { names, values }
    }

    pub fn names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    pub fn values(&self) -> Vec<&str> {
        self.values.iter().map(String::as_str).collect()
    }

    /// Consume into the owned value tuple.
    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

/// Instance-level default tags.
#[derive(Debug, Clone, Default)]
pub struct TagSet {
    defaults: Tags,
}

impl TagSet {
    pub const fn new(defaults: Tags) -> Self {
        Self { defaults }
    }

    /// Merge call tags over the defaults; call entries win.
    pub fn merge(&self, call: &Tags) -> Tags {
        let mut merged = self.defaults.clone();
        merged.extend(call.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Merge and order into labels.
    pub fn labels(&self, call: &Tags) -> LabelSet {
        LabelSet::from_tags(&self.merge(call))
    }

    pub const fn defaults(&self) -> &Tags {
        &self.defaults
    }
}

/// Convenience constructor for tag maps.
pub fn tags<const N: usize>(pairs: [(&str, &str); N]) -> Tags {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}
