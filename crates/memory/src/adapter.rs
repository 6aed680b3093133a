//! The memory adapter — Hearth's resilience boundary against an unreliable
//! third-party dependency.
//!
//! Every call degrades gracefully: fetches return empty sequences on any
//! error and record failures are logged and swallowed. Memory persistence
//! must never fail a conversation turn.

use hearth_core::memory::{MemoryStore, TranscriptTurn};
use std::sync::Arc;
use tracing::{debug, warn};

/// Caps and error tolerance around a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryAdapter {
    store: Arc<dyn MemoryStore>,
    fact_limit: usize,
    relevant_limit: usize,
}

impl MemoryAdapter {
    /// Wrap a store with the default caps (10 stored facts, 3 relevant).
    pub fn new(store: Arc<dyn MemoryStore>) -> Self {
        Self {
            store,
            fact_limit: 10,
            relevant_limit: 3,
        }
    }

    pub fn with_limits(mut self, fact_limit: usize, relevant_limit: usize) -> Self {
        self.fact_limit = fact_limit;
        self.relevant_limit = relevant_limit;
        self
    }

    /// All stored facts for a user, capped. Empty on any error.
    pub async fn fetch_all(&self, user_id: &str) -> Vec<String> {
        match self.store.get_all(user_id).await {
            Ok(mut facts) => {
                facts.truncate(self.fact_limit);
                facts
            }
            Err(e) => {
                warn!(user_id, store = self.store.name(), "Memory fetch failed: {e}");
                Vec::new()
            }
        }
    }

    /// Query-relevant facts for a user, capped. Empty on any error.
    pub async fn fetch_relevant(&self, user_id: &str, query: &str) -> Vec<String> {
        match self.store.search(user_id, query).await {
            Ok(mut facts) => {
                facts.truncate(self.relevant_limit);
                facts
            }
            Err(e) => {
                warn!(user_id, store = self.store.name(), "Memory search failed: {e}");
                Vec::new()
            }
        }
    }

    /// Record an exchange as a two-turn transcript.
    ///
    /// The write completes within the call (the store's own timeout bounds
    /// it), so a caller that returns afterwards never loses it. Failures are
    /// logged and swallowed; recording must not fail a conversation turn.
    pub async fn record(&self, user_id: &str, user_text: &str, assistant_text: &str) {
        let transcript = vec![
            TranscriptTurn::user(user_text),
            TranscriptTurn::assistant(assistant_text),
        ];
        match self.store.add(user_id, &transcript).await {
            Ok(()) => debug!(user_id, "Exchange recorded to memory"),
            Err(e) => warn!(user_id, "Failed to store memory: {e}"),
        }
    }
}
