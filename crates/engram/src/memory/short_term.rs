//! Short-term memory: the sliding-window transcript cache
//!
//! Each session owns one bounded list in the volatile store. Writes
//! append, trim the list back to the window size, and refresh the
//! session's expiry, so an idle session ages out as a whole while an
//! active one keeps sliding forward.

use std::sync::Arc;

use crate::config::ShortTermConfig;
use crate::error::{EngramError, Result};
use crate::memory::ensure_session_id;
use crate::memory::types::{Message, Role, StoredMessage};
use crate::store::ListStore;

pub struct ShortTermMemory {
    store: Arc<dyn ListStore>,
    config: ShortTermConfig,
}

impl ShortTermMemory {
    pub fn new(store: Arc<dyn ListStore>, config: ShortTermConfig) -> Self {
        Self { store, config }
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}:{session_id}", self.config.key_prefix)
    }

    /// Append one turn to the session window.
    ///
    /// The record is stamped with the current time, the window is trimmed
    /// to its last `max_window_size` entries, and the session expiry is
    /// reset to the full TTL (sliding, not absolute from first write).
    pub async fn add_message(&self, session_id: &str, role: Role, content: &str) -> Result<()> {
        ensure_session_id(session_id)?;

        let record = StoredMessage::now(role, content);
        let value = serde_json::to_string(&record)
            .map_err(|e| EngramError::Serialization(format!("Failed to encode record: {e}")))?;

        let key = self.key(session_id);
        self.store.append(&key, value).await?;
        self.store.trim(&key, self.config.max_window_size).await?;
        self.store.set_expiry(&key, self.config.ttl_secs).await?;

        tracing::debug!(session_id, role = role.as_str(), "stored transcript record");
        Ok(())
    }

    /// Return the most recent `limit` turns in insertion order (oldest of
    /// the selected window first). A session with no window yields an
    /// empty sequence. Records that fail to decode are skipped.
    pub async fn get_messages(&self, session_id: &str, limit: usize) -> Result<Vec<Message>> {
        ensure_session_id(session_id)?;

        let key = self.key(session_id);
        let length = self.store.length(&key).await?;
        if length == 0 {
            return Ok(Vec::new());
        }

        let start = length.saturating_sub(limit);
        let raw = self.store.range(&key, start as i64, -1).await?;

        let mut messages = Vec::with_capacity(raw.len());
        for entry in raw {
            match serde_json::from_str::<StoredMessage>(&entry) {
                Ok(record) => messages.push(Message::from(record)),
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "skipping unreadable transcript record");
                }
            }
        }

        Ok(messages)
    }

    /// Delete the session's entire window. Clearing a session that has no
    /// window succeeds.
    pub async fn clear_session(&self, session_id: &str) -> Result<()> {
        ensure_session_id(session_id)?;
        self.store.delete(&self.key(session_id)).await
    }
}
