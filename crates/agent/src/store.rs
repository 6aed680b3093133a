//! Conversation checkpoint store.
//!
//! The turn runner is handed a store per invocation instead of relying on a
//! process-wide checkpointer; the store owns nothing but the message list
//! and context map per thread.

use async_trait::async_trait;
use hearth_core::error::Error;
use hearth_core::message::{Conversation, ThreadId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keyed by thread identifier.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load the conversation for a thread, if one was checkpointed.
    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Conversation>, Error>;

    /// Checkpoint a conversation under its thread id.
    async fn save(&self, conversation: &Conversation) -> Result<(), Error>;
}

/// In-process store backed by a map. One entry per thread.
pub struct InMemoryConversationStore {
    threads: Arc<RwLock<HashMap<ThreadId, Conversation>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self {
            threads: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, thread_id: &ThreadId) -> Result<Option<Conversation>, Error> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), Error> {
        self.threads
            .write()
            .await
            .insert(conversation.thread_id.clone(), conversation.clone());
        Ok(())
    }
}
