//! Backing-store contracts for the two memory tiers
//!
//! The memory core never talks to a concrete database. The short-term
//! tier requires a volatile key-ordered list store with expiry; the
//! long-term tier requires a vector-similarity index with metadata
//! filtering. Clients implementing these traits are injected at
//! construction time, which is also how the tests substitute the
//! in-memory fakes from [`crate::testing`].

pub mod filter;

pub use filter::MetadataFilter;

use async_trait::async_trait;

use crate::error::Result;

/// Open metadata attached to long-term records: string keys mapping to
/// scalar or string JSON values.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One record as written to the vector index.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Globally unique record id
    pub id: String,
    /// Embedding vector
    pub vector: Vec<f32>,
    /// Metadata stored alongside the vector
    pub metadata: Metadata,
}

/// One ranked match as returned by [`VectorIndex::query`].
///
/// Ordering and score are whatever the index produced; the memory core
/// passes both through unmodified.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    /// Record id of the match
    pub id: String,
    /// Similarity score, semantics defined by the backing index
    pub score: f32,
    /// Metadata stored with the record
    pub metadata: Metadata,
}

/// A volatile key-ordered list store with per-key expiry.
///
/// Every operation is a potentially slow, fallible network call; the
/// implementation is responsible for its own timeouts and for atomic
/// per-key append/trim/expire.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Append a value to the end of the list at `key`, creating the list
    /// if it does not exist.
    async fn append(&self, key: &str, value: String) -> Result<()>;

    /// Trim the list at `key` to its last `keep_last` entries, dropping
    /// the oldest. A missing key is a no-op.
    async fn trim(&self, key: &str, keep_last: usize) -> Result<()>;

    /// Set (or reset) the expiry of `key` to `ttl_secs` seconds from now.
    /// A TTL of zero expires the key immediately.
    async fn set_expiry(&self, key: &str, ttl_secs: u64) -> Result<()>;

    /// Number of entries in the list at `key`; zero for a missing key.
    async fn length(&self, key: &str) -> Result<usize>;

    /// Entries between `start` and `stop` inclusive, in insertion order.
    /// Negative indices count back from the end of the list (`-1` is the
    /// newest entry). Out-of-range indices are clamped.
    async fn range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>>;

    /// Delete the list at `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// A vector-similarity index with metadata filtering.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace one record by id.
    async fn upsert(&self, record: VectorRecord) -> Result<()>;

    /// Return the `top_k` records nearest to `vector` among those whose
    /// metadata satisfies `filter`, ranked most similar first.
    async fn query(
        &self,
        vector: &[f32],
        filter: &MetadataFilter,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>>;

    /// Delete every record whose metadata satisfies `filter`. Deleting
    /// nothing succeeds.
    async fn delete(&self, filter: &MetadataFilter) -> Result<()>;
}
