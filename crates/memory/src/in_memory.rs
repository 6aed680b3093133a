//! In-memory store — per-user fact partitions for tests and keyless runs.
//!
//! Mimics the remote service's behavior closely enough for the pipeline to
//! run end-to-end: `add` distills each transcript turn into one fact line,
//! `search` ranks by naive keyword overlap.

use async_trait::async_trait;
use hearth_core::error::MemoryError;
use hearth_core::memory::{MemoryStore, TranscriptTurn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct InMemoryStore {
    partitions: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            partitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a user's partition with facts (test helper).
    pub async fn seed(&self, user_id: &str, facts: &[&str]) {
        let mut parts = self.partitions.write().await;
        let entry = parts.entry(user_id.to_string()).or_default();
        entry.extend(facts.iter().map(|f| f.to_string()));
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get_all(&self, user_id: &str) -> Result<Vec<String>, MemoryError> {
        let parts = self.partitions.read().await;
        Ok(parts.get(user_id).cloned().unwrap_or_default())
    }

    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<String>, MemoryError> {
        let parts = self.partitions.read().await;
        let Some(facts) = parts.get(user_id) else {
            return Ok(Vec::new());
        };

        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect();

        let mut scored: Vec<(usize, &String)> = facts
            .iter()
            .map(|fact| {
                let lower = fact.to_lowercase();
                let hits = terms.iter().filter(|t| lower.contains(*t)).count();
                (hits, fact)
            })
            .filter(|(hits, _)| *hits > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().map(|(_, f)| f.clone()).collect())
    }

    async fn add(&self, user_id: &str, transcript: &[TranscriptTurn]) -> Result<(), MemoryError> {
        let mut parts = self.partitions.write().await;
        let entry = parts.entry(user_id.to_string()).or_default();
        for turn in transcript {
            entry.push(format!("{}: {}", turn.role, turn.content));
        }
        Ok(())
    }
}
