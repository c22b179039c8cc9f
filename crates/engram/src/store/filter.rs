//! Filter types for vector index operations
//!
//! Narrows queries and deletes to records whose metadata matches a set
//! of equality conditions. Conditions are combined with AND logic.

use serde_json::Value;

use crate::store::Metadata;

/// Filter criteria for vector index queries and deletes.
///
/// An empty filter matches every record. Implementations backed by a
/// remote index translate the conditions into their own query language
/// via [`MetadataFilter::conditions`]; in-process indexes can evaluate
/// records directly with [`MetadataFilter::matches`].
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    conditions: Vec<(String, Value)>,
}

impl MetadataFilter {
    /// Create a new empty filter (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key` to equal `value`
    pub fn with_equal(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    /// Require the record to belong to `session_id`
    pub fn for_session(session_id: &str) -> Self {
        Self::new().with_equal("session_id", session_id)
    }

    /// The equality conditions in insertion order
    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Check whether `metadata` satisfies every condition
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }

    /// Check if this filter is empty (no conditions set)
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
