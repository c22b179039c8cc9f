//! Long-term memory: the semantic store
//!
//! Stores embeddings of past turns in a vector index, one record per
//! turn, every record tagged with its session id. Retrieval is top-K
//! similarity search restricted to a single session; no session ever
//! sees another session's vectors.

use std::sync::Arc;

use uuid::Uuid;

use crate::embedding::{Embedder, EmbeddingGate};
use crate::error::{EngramError, Result};
use crate::memory::ensure_session_id;
use crate::memory::types::MemoryHit;
use crate::store::{Metadata, MetadataFilter, VectorIndex, VectorRecord};

/// Metadata key under which the raw text is stored with each vector.
const TEXT_KEY: &str = "text";

pub struct LongTermMemory {
    index: Arc<dyn VectorIndex>,
    embedder: EmbeddingGate,
}

impl LongTermMemory {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder: EmbeddingGate::new(embedder),
        }
    }

    /// Store one text with its embedding.
    ///
    /// The session id is merged into the metadata, overwriting any
    /// caller-supplied `session_id` key. Embedding failure fails the
    /// whole operation before anything reaches the index; there is no
    /// partial write. Record ids are `<session_id>:<uuid>`, so repeated
    /// identical text from the same session never collides.
    pub async fn add_memory(
        &self,
        session_id: &str,
        text: &str,
        metadata: Option<Metadata>,
    ) -> Result<()> {
        ensure_session_id(session_id)?;
        if text.is_empty() {
            return Err(EngramError::InvalidInput(
                "text must not be empty".to_string(),
            ));
        }

        let mut metadata = metadata.unwrap_or_default();
        metadata.insert("session_id".to_string(), session_id.into());

        let vector = self.embedder.embed(text).await?;

        metadata.insert(TEXT_KEY.to_string(), text.into());
        let record = VectorRecord {
            id: format!("{session_id}:{}", Uuid::new_v4()),
            vector,
            metadata,
        };

        self.index.upsert(record).await
    }

    /// Return up to `limit` stored texts most similar to `query`,
    /// restricted to `session_id`, in the index's own relevance order
    /// with its scores passed through verbatim.
    pub async fn search_memories(
        &self,
        session_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryHit>> {
        ensure_session_id(session_id)?;
        if query.is_empty() {
            return Err(EngramError::InvalidInput(
                "query must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query).await?;
        let filter = MetadataFilter::for_session(session_id);
        let matches = self.index.query(&vector, &filter, limit).await?;

        let hits = matches
            .into_iter()
            .map(|m| {
                let mut metadata = m.metadata;
                let text = metadata
                    .remove(TEXT_KEY)
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                MemoryHit {
                    text,
                    score: m.score,
                    metadata,
                }
            })
            .collect();

        Ok(hits)
    }

    /// Delete every record belonging to `session_id`. Clearing a session
    /// with no records succeeds.
    pub async fn clear_session(&self, session_id: &str) -> Result<()> {
        ensure_session_id(session_id)?;
        self.index
            .delete(&MetadataFilter::for_session(session_id))
            .await
    }
}
