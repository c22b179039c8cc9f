//! Memory orchestrator: the write/read policy engine
//!
//! Composes the two tiers behind a single add/read/clear API. The
//! orchestrator owns the write policy (which turns reach the long-term
//! store), the partial-failure semantics (best effort, no rollback),
//! and the collapse of internal errors into safe defaults: no error
//! crosses this boundary.

use crate::config::ContextConfig;
use crate::memory::long_term::LongTermMemory;
use crate::memory::short_term::ShortTermMemory;
use crate::memory::types::{ContextBundle, MemoryHit, Message, Role};
use crate::store::Metadata;

pub struct MemoryOrchestrator {
    short_term: ShortTermMemory,
    long_term: LongTermMemory,
    context: ContextConfig,
}

impl MemoryOrchestrator {
    pub fn new(
        short_term: ShortTermMemory,
        long_term: LongTermMemory,
        context: ContextConfig,
    ) -> Self {
        Self {
            short_term,
            long_term,
            context,
        }
    }

    /// Record one turn.
    ///
    /// The turn always goes to the short-term window. It also goes to the
    /// long-term store when it is a user turn with non-blank content:
    /// only things the user actually said are worth semantic recall
    /// later. The result is the AND of the writes that were attempted; a
    /// long-term write skipped by policy never runs and contributes
    /// nothing.
    ///
    /// There is no rollback: `false` means the state may be partially
    /// updated, not that it is unchanged.
    pub async fn add_memory(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        metadata: Option<Metadata>,
    ) -> bool {
        let short_ok = match self.short_term.add_message(session_id, role, content).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "short-term write failed");
                false
            }
        };

        let long_ok = if role == Role::User && !content.trim().is_empty() {
            match self.long_term.add_memory(session_id, content, metadata).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "long-term write failed");
                    false
                }
            }
        } else {
            true
        };

        short_ok && long_ok
    }

    /// The most recent `limit` turns of the session, oldest first.
    /// Read failures collapse to an empty sequence.
    pub async fn get_conversation_history(&self, session_id: &str, limit: usize) -> Vec<Message> {
        match self.short_term.get_messages(session_id, limit).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "history read failed");
                Vec::new()
            }
        }
    }

    /// Up to `limit` past user turns semantically similar to `query`.
    /// Read failures collapse to an empty sequence.
    pub async fn search_long_term_memory(
        &self,
        session_id: &str,
        query: &str,
        limit: usize,
    ) -> Vec<MemoryHit> {
        match self.long_term.search_memories(session_id, query, limit).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "long-term search failed");
                Vec::new()
            }
        }
    }

    /// Assemble the context for a new turn using the configured limits.
    pub async fn build_context(&self, session_id: &str, current_input: &str) -> ContextBundle {
        self.build_context_with_limits(
            session_id,
            current_input,
            self.context.history_limit,
            self.context.relevant_limit,
        )
        .await
    }

    /// Assemble the context for a new turn: recent history plus past
    /// turns relevant to `current_input`.
    ///
    /// The two reads hit unrelated stores and have no data dependency,
    /// so they are issued concurrently; latency is bounded by the slower
    /// of the two. Each side collapses to empty independently — this
    /// operation never fails outwardly.
    pub async fn build_context_with_limits(
        &self,
        session_id: &str,
        current_input: &str,
        history_limit: usize,
        relevant_limit: usize,
    ) -> ContextBundle {
        let (history, relevant) = tokio::join!(
            self.short_term.get_messages(session_id, history_limit),
            self.long_term
                .search_memories(session_id, current_input, relevant_limit),
        );

        let history = history.unwrap_or_else(|e| {
            tracing::warn!(session_id, error = %e, "history read failed during context build");
            Vec::new()
        });
        let relevant_memories = relevant.unwrap_or_else(|e| {
            tracing::warn!(session_id, error = %e, "semantic search failed during context build");
            Vec::new()
        });

        tracing::debug!(
            session_id,
            history = history.len(),
            relevant = relevant_memories.len(),
            "assembled context"
        );

        ContextBundle {
            history,
            relevant_memories,
        }
    }

    /// Clear both tiers for the session. Same best-effort policy as
    /// [`MemoryOrchestrator::add_memory`]: the result is the AND of the
    /// two clears and a failed side is not compensated.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        let short_ok = match self.short_term.clear_session(session_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "short-term clear failed");
                false
            }
        };

        let long_ok = match self.long_term.clear_session(session_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "long-term clear failed");
                false
            }
        };

        short_ok && long_ok
    }
}
