//! No-op store — disables memory entirely.

use async_trait::async_trait;
use hearth_core::error::MemoryError;
use hearth_core::memory::{MemoryStore, TranscriptTurn};

/// A memory store that remembers nothing.
pub struct NoopStore;

#[async_trait]
impl MemoryStore for NoopStore {
    fn name(&self) -> &str {
        "noop"
    }

    async fn get_all(&self, _user_id: &str) -> Result<Vec<String>, MemoryError> {
        Ok(Vec::new())
    }

    async fn search(&self, _user_id: &str, _query: &str) -> Result<Vec<String>, MemoryError> {
        Ok(Vec::new())
    }

    async fn add(&self, _user_id: &str, _transcript: &[TranscriptTurn]) -> Result<(), MemoryError> {
        Ok(())
    }
}
