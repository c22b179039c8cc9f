//! Test utilities - deterministic in-memory fakes for the backing-store
//! contracts
//!
//! These implement the [`crate::store`] and [`crate::embedding`] traits
//! without any external process, so the memory core can be exercised in
//! plain unit tests. The fakes honor the contract details the services
//! depend on (trim, sliding expiry, filtered query/delete), and the
//! failing variants stand in for unavailable backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::embedding::Embedder;
use crate::error::{EngramError, Result};
use crate::store::{ListStore, MetadataFilter, VectorIndex, VectorMatch, VectorRecord};

const MOCK_EMBEDDING_DIMENSIONS: usize = 384;

/// Deterministic embedder for tests.
///
/// Hashes the input text into a seed and expands it into a 384-dim
/// vector in [-1, 1]. Equal texts always embed equally and distinct
/// texts (almost) never collide, which is all the tests need.
#[derive(Debug, Clone, Default)]
pub struct MockEmbedder;

impl MockEmbedder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        let vector = (0..MOCK_EMBEDDING_DIMENSIONS)
            .map(|i| {
                let mut x = seed ^ (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
                x ^= x >> 33;
                x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
                x ^= x >> 33;
                ((x as f32) / (u64::MAX as f32)) * 2.0 - 1.0
            })
            .collect();

        Ok(vector)
    }
}

/// An embedding provider that is always down.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(EngramError::Embedding(
            "embedding provider offline".to_string(),
        ))
    }
}

#[derive(Debug, Default)]
struct ListEntry {
    items: Vec<String>,
    expires_at: Option<Instant>,
}

impl ListEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory [`ListStore`] with real trim and expiry behavior.
///
/// Per-key operations are atomic through the map's entry locking.
/// Expired keys are purged lazily on the next access.
#[derive(Debug, Default)]
pub struct MemoryListStore {
    entries: DashMap<String, ListEntry>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn purge_if_expired(&self, key: &str) {
        self.entries.remove_if(key, |_, entry| entry.is_expired());
    }

    /// The key's current expiry deadline, if one is set. Test hook for
    /// asserting sliding-TTL behavior.
    pub fn expiry_deadline(&self, key: &str) -> Option<Instant> {
        self.entries.get(key).and_then(|entry| entry.expires_at)
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn append(&self, key: &str, value: String) -> Result<()> {
        self.purge_if_expired(key);
        self.entries
            .entry(key.to_string())
            .or_default()
            .items
            .push(value);
        Ok(())
    }

    async fn trim(&self, key: &str, keep_last: usize) -> Result<()> {
        self.purge_if_expired(key);
        if let Some(mut entry) = self.entries.get_mut(key) {
            let len = entry.items.len();
            if len > keep_last {
                entry.items.drain(..len - keep_last);
            }
        }
        Ok(())
    }

    async fn set_expiry(&self, key: &str, ttl_secs: u64) -> Result<()> {
        self.purge_if_expired(key);
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(Instant::now() + Duration::from_secs(ttl_secs));
        }
        Ok(())
    }

    async fn length(&self, key: &str) -> Result<usize> {
        self.purge_if_expired(key);
        Ok(self.entries.get(key).map_or(0, |entry| entry.items.len()))
    }

    async fn range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        self.purge_if_expired(key);
        let Some(entry) = self.entries.get(key) else {
            return Ok(Vec::new());
        };

        let len = entry.items.len() as i64;
        let start = if start < 0 { len + start } else { start }.max(0);
        let stop = if stop < 0 { len + stop } else { stop }.min(len - 1);
        if len == 0 || start > stop {
            return Ok(Vec::new());
        }

        Ok(entry.items[start as usize..=stop as usize].to_vec())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A list store that is always down.
#[derive(Debug, Clone, Default)]
pub struct FailingListStore;

impl FailingListStore {
    fn offline<T>() -> Result<T> {
        Err(EngramError::Store("list store offline".to_string()))
    }
}

#[async_trait]
impl ListStore for FailingListStore {
    async fn append(&self, _key: &str, _value: String) -> Result<()> {
        Self::offline()
    }

    async fn trim(&self, _key: &str, _keep_last: usize) -> Result<()> {
        Self::offline()
    }

    async fn set_expiry(&self, _key: &str, _ttl_secs: u64) -> Result<()> {
        Self::offline()
    }

    async fn length(&self, _key: &str) -> Result<usize> {
        Self::offline()
    }

    async fn range(&self, _key: &str, _start: i64, _stop: i64) -> Result<Vec<String>> {
        Self::offline()
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Self::offline()
    }
}

/// In-memory [`VectorIndex`] scoring by cosine similarity.
///
/// Cosine is this fake's choice, not part of the contract - real indexes
/// define their own score semantics and the memory core passes them
/// through either way. Upserts are counted so tests can assert on the
/// write policy.
#[derive(Debug, Default)]
pub struct MemoryVectorIndex {
    records: DashMap<String, VectorRecord>,
    upserts: AtomicUsize,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of upsert calls received.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        filter: &MetadataFilter,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>> {
        let mut matches: Vec<VectorMatch> = self
            .records
            .iter()
            .filter(|record| filter.matches(&record.metadata))
            .map(|record| VectorMatch {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.vector),
                metadata: record.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        matches.truncate(top_k);

        Ok(matches)
    }

    async fn delete(&self, filter: &MetadataFilter) -> Result<()> {
        self.records
            .retain(|_, record| !filter.matches(&record.metadata));
        Ok(())
    }
}

/// A vector index that is always down.
#[derive(Debug, Clone, Default)]
pub struct FailingVectorIndex;

impl FailingVectorIndex {
    fn offline<T>() -> Result<T> {
        Err(EngramError::Index("vector index offline".to_string()))
    }
}

#[async_trait]
impl VectorIndex for FailingVectorIndex {
    async fn upsert(&self, _record: VectorRecord) -> Result<()> {
        Self::offline()
    }

    async fn query(
        &self,
        _vector: &[f32],
        _filter: &MetadataFilter,
        _top_k: usize,
    ) -> Result<Vec<VectorMatch>> {
        Self::offline()
    }

    async fn delete(&self, _filter: &MetadataFilter) -> Result<()> {
        Self::offline()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_embedding_is_deterministic() {
        let embedder = MockEmbedder::new();
        let emb1 = embedder.embed("hello world").await.unwrap();
        let emb2 = embedder.embed("hello world").await.unwrap();
        assert_eq!(emb1, emb2);
    }

    #[tokio::test]
    async fn mock_embedding_has_correct_dimensions_and_range() {
        let embedder = MockEmbedder::new();
        let emb = embedder.embed("test").await.unwrap();
        assert_eq!(emb.len(), MOCK_EMBEDDING_DIMENSIONS);
        for val in &emb {
            assert!((-1.0..=1.0).contains(val), "Value {val} out of range");
        }
    }

    #[tokio::test]
    async fn mock_embedding_differs_for_different_inputs() {
        let embedder = MockEmbedder::new();
        let emb1 = embedder.embed("hello").await.unwrap();
        let emb2 = embedder.embed("world").await.unwrap();
        assert_ne!(emb1, emb2);
    }

    #[tokio::test]
    async fn list_store_range_supports_negative_indices() {
        let store = MemoryListStore::new();
        for value in ["a", "b", "c", "d"] {
            store.append("k", value.to_string()).await.unwrap();
        }

        assert_eq!(store.range("k", 0, -1).await.unwrap(), ["a", "b", "c", "d"]);
        assert_eq!(store.range("k", -2, -1).await.unwrap(), ["c", "d"]);
        assert_eq!(store.range("k", 1, 2).await.unwrap(), ["b", "c"]);
        // Out-of-range indices clamp instead of failing
        assert_eq!(store.range("k", -10, 100).await.unwrap().len(), 4);
        assert!(store.range("k", 3, 1).await.unwrap().is_empty());
        assert!(store.range("missing", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_store_trim_keeps_newest() {
        let store = MemoryListStore::new();
        for value in ["a", "b", "c", "d"] {
            store.append("k", value.to_string()).await.unwrap();
        }

        store.trim("k", 2).await.unwrap();
        assert_eq!(store.range("k", 0, -1).await.unwrap(), ["c", "d"]);

        // Trimming below the current length is a no-op
        store.trim("k", 10).await.unwrap();
        assert_eq!(store.length("k").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_store_zero_ttl_expires_immediately() {
        let store = MemoryListStore::new();
        store.append("k", "v".to_string()).await.unwrap();
        store.set_expiry("k", 0).await.unwrap();

        assert_eq!(store.length("k").await.unwrap(), 0);
        assert!(store.range("k", 0, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn vector_index_filters_and_ranks() {
        let index = MemoryVectorIndex::new();
        let embedder = MockEmbedder::new();

        for (id, session, text) in [
            ("a:1", "a", "the target text"),
            ("a:2", "a", "something unrelated"),
            ("b:1", "b", "the target text"),
        ] {
            let mut metadata = crate::store::Metadata::new();
            metadata.insert("session_id".to_string(), json!(session));
            index
                .upsert(VectorRecord {
                    id: id.to_string(),
                    vector: embedder.embed(text).await.unwrap(),
                    metadata,
                })
                .await
                .unwrap();
        }

        let query = embedder.embed("the target text").await.unwrap();
        let matches = index
            .query(&query, &MetadataFilter::for_session("a"), 10)
            .await
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a:1");
        assert!(matches[0].score > matches[1].score);
        assert_eq!(index.upsert_count(), 3);
    }

    #[tokio::test]
    async fn vector_index_delete_is_filter_scoped() {
        let index = MemoryVectorIndex::new();

        for (id, session) in [("a:1", "a"), ("b:1", "b")] {
            let mut metadata = crate::store::Metadata::new();
            metadata.insert("session_id".to_string(), json!(session));
            index
                .upsert(VectorRecord {
                    id: id.to_string(),
                    vector: vec![0.5; 8],
                    metadata,
                })
                .await
                .unwrap();
        }

        index.delete(&MetadataFilter::for_session("a")).await.unwrap();
        assert_eq!(index.len(), 1);

        // Deleting an absent session is fine
        index.delete(&MetadataFilter::for_session("a")).await.unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }
}
