//! # Hearth Core
//!
//! Domain types, traits, and error definitions for the Hearth assistant
//! runtime. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! Every external collaborator (LLM provider, web-search tool, semantic
//! memory service, conversation store) is defined as a trait here, with
//! implementations in their respective crates. All crates depend inward
//! on core.

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use memory::{MemoryStore, TranscriptTurn};
pub use message::{Conversation, Message, Role, ThreadId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
