//! The conversation turn runner for Hearth.
//!
//! One inbound user message is processed start-to-finish: resolve the user,
//! snapshot context, fetch memories, compose the system prompt, then walk
//! the chat → tool-call → chat cycle until the model produces a final
//! answer. Conversations are checkpointed through an explicit
//! [`store::ConversationStore`] handed in per turn — no hidden global state.

pub mod prompt;
pub mod session;
pub mod store;
pub mod turn;

pub use prompt::PromptComposer;
pub use session::{DEFAULT_USER_ID, SessionConfig, resolve_user_id};
pub use store::{ConversationStore, InMemoryConversationStore};
pub use turn::{TurnRunner, TurnState};
