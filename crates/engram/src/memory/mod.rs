pub mod long_term;
pub mod orchestrator;
pub mod short_term;
pub mod types;

pub use long_term::LongTermMemory;
pub use orchestrator::MemoryOrchestrator;
pub use short_term::ShortTermMemory;
pub use types::{ContextBundle, MemoryHit, Message, Role, StoredMessage};

use crate::error::{EngramError, Result};

/// Session ids partition all memory and must be non-empty.
pub(crate) fn ensure_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(EngramError::InvalidInput(
            "session id must not be empty".to_string(),
        ));
    }
    Ok(())
}
