//! Embedding provider contract and gate
//!
//! The memory core treats embedding generation as a single fallible
//! external call: one text in, one vector out. The gate is the only
//! path callers use, so every provider failure is logged and surfaced
//! the same way.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{EngramError, Result};

/// An external embedding provider. No caching, no batching.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate the embedding vector for `text`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Thin adapter in front of an [`Embedder`].
///
/// Normalizes provider failures: each one is logged and returned as an
/// error, never raised past the caller as anything else.
#[derive(Clone)]
pub struct EmbeddingGate {
    provider: Arc<dyn Embedder>,
}

impl EmbeddingGate {
    pub fn new(provider: Arc<dyn Embedder>) -> Self {
        Self { provider }
    }

    /// Embed one text, logging any provider failure.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider.embed(text).await {
            Ok(vector) if vector.is_empty() => {
                tracing::warn!("embedding provider returned an empty vector");
                Err(EngramError::Embedding(
                    "provider returned an empty vector".to_string(),
                ))
            }
            Ok(vector) => Ok(vector),
            Err(e) => {
                tracing::warn!(error = %e, "embedding generation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyVectorEmbedder;

    #[async_trait]
    impl Embedder for EmptyVectorEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(Vec::new())
        }
    }

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.25; 4])
        }
    }

    #[tokio::test]
    async fn test_gate_passes_vectors_through() {
        let gate = EmbeddingGate::new(Arc::new(FixedEmbedder));
        let vector = gate.embed("hello").await.unwrap();
        assert_eq!(vector, vec![0.25; 4]);
    }

    #[tokio::test]
    async fn test_gate_rejects_empty_vectors() {
        let gate = EmbeddingGate::new(Arc::new(EmptyVectorEmbedder));
        let result = gate.embed("hello").await;
        assert!(matches!(result, Err(EngramError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_gate_surfaces_provider_failure() {
        let gate = EmbeddingGate::new(Arc::new(crate::testing::FailingEmbedder));
        let result = gate.embed("hello").await;
        assert!(matches!(result, Err(EngramError::Embedding(_))));
    }
}
