//! LLM provider implementations for Hearth.
//!
//! One implementation covers every backend Hearth talks to: the
//! OpenAI-compatible chat-completions surface, which Gemini, OpenAI,
//! OpenRouter, and Ollama all expose.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
