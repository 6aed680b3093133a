//! MemoryStore trait — the narrow contract with the external semantic
//! memory service.
//!
//! The service owns the facts; Hearth keeps no local copy beyond a single
//! request's lifetime. Facts are partitioned by user id, and the adapter
//! layer (`hearth-memory`) is responsible for degrading every failure to
//! "no memory" rather than surfacing it to the conversation.

use crate::error::MemoryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One turn of a recorded exchange, as sent to the memory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptTurn {
    /// "user" or "assistant"
    pub role: String,

    /// The message text
    pub content: String,
}

impl TranscriptTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// The core MemoryStore trait.
///
/// Implementations: remote HTTP service, in-memory (for tests and keyless
/// operation), no-op.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "remote", "in_memory", "noop").
    fn name(&self) -> &str;

    /// Fetch every stored fact for a user.
    async fn get_all(&self, user_id: &str) -> std::result::Result<Vec<String>, MemoryError>;

    /// Fetch a relevance-ranked subset of facts for a query.
    async fn search(
        &self,
        user_id: &str,
        query: &str,
    ) -> std::result::Result<Vec<String>, MemoryError>;

    /// Append an exchange as a two-turn transcript.
    async fn add(
        &self,
        user_id: &str,
        transcript: &[TranscriptTurn],
    ) -> std::result::Result<(), MemoryError>;
}
