//! Session/User resolution — maps inbound request metadata and thread
//! identifiers to the stable user identity used as the memory partition key.
//!
//! Precedence: an explicit user id in request metadata wins; otherwise a
//! `user_<token>` pattern embedded in the thread id is extracted; otherwise
//! the fixed default identity. Pure function, no external calls.

use hearth_core::message::ThreadId;

/// The identity used when nothing else resolves.
pub const DEFAULT_USER_ID: &str = "default_user";

/// One conversation's session scope: the thread plus the resolved user.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub thread_id: ThreadId,
    pub user_id: String,
}

impl SessionConfig {
    /// Resolve a session from request metadata and a thread id.
    pub fn resolve(metadata_user_id: Option<&str>, thread_id: ThreadId) -> Self {
        let user_id = resolve_user_id(metadata_user_id, &thread_id.0);
        Self { thread_id, user_id }
    }
}

/// Resolve the user identity for a request.
///
/// The thread-id heuristic is legacy behavior kept for compatibility with
/// existing memory partitions: any thread id containing `user_` is split on
/// underscores and the second segment becomes the token, so incidental
/// `user_` substrings collide. Do not model new identity flows on this.
pub fn resolve_user_id(metadata_user_id: Option<&str>, thread_id: &str) -> String {
    if let Some(user_id) = metadata_user_id {
        if !user_id.is_empty() && user_id != DEFAULT_USER_ID {
            return user_id.to_string();
        }
    }

    if thread_id.contains("user_") {
        let parts: Vec<&str> = thread_id.split('_').collect();
        if parts.len() >= 2 {
            return format!("user_{}", parts[1]);
        }
    }

    DEFAULT_USER_ID.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_user_id_wins() {
        assert_eq!(
            resolve_user_id(Some("user_42"), "user_mike_001"),
            "user_42"
        );
    }

    #[test]
    fn default_metadata_falls_through_to_thread() {
        assert_eq!(
            resolve_user_id(Some(DEFAULT_USER_ID), "user_mike_001"),
            "user_mike"
        );
    }

    #[test]
    fn thread_pattern_extracts_token() {
        assert_eq!(resolve_user_id(None, "user_mike_001"), "user_mike");
    }

    #[test]
    fn plain_thread_id_resolves_to_default() {
        assert_eq!(resolve_user_id(None, "abc123"), DEFAULT_USER_ID);
    }

    #[test]
    fn empty_metadata_ignored() {
        assert_eq!(resolve_user_id(Some(""), "abc123"), DEFAULT_USER_ID);
    }

    #[test]
    fn legacy_collision_behavior_preserved() {
        // "user_" appearing mid-thread-id still triggers extraction;
        // the token is the second underscore-separated segment.
        assert_eq!(resolve_user_id(None, "chat_user_99"), "user_user");
    }

    #[test]
    fn session_config_resolution() {
        let session = SessionConfig::resolve(None, ThreadId::from("user_dana_7"));
        assert_eq!(session.user_id, "user_dana");
        assert_eq!(session.thread_id.0, "user_dana_7");
    }
}
