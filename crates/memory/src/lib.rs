//! Semantic memory for Hearth.
//!
//! `RemoteMemoryStore` talks to the external memory service; `MemoryAdapter`
//! is the resilience boundary that every caller goes through — it caps how
//! many facts reach the prompt and degrades every failure to "no memory".

pub mod adapter;
pub mod in_memory;
pub mod noop;
pub mod remote;

pub use adapter::MemoryAdapter;
pub use in_memory::InMemoryStore;
pub use noop::NoopStore;
pub use remote::RemoteMemoryStore;
