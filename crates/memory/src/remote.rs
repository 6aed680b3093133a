//! HTTP client for the external semantic-memory service (mem0-style API).
//!
//! The service's response shapes vary across versions: a fact list may come
//! back as a bare JSON array, or wrapped in an object under `results` or
//! `memories`. Individual entries may be plain strings or objects carrying
//! the text under `memory` or `text`. `normalize_facts` flattens all of
//! these into one sequence of fact strings.

use async_trait::async_trait;
use hearth_core::error::MemoryError;
use hearth_core::memory::{MemoryStore, TranscriptTurn};
use serde_json::Value;
use tracing::debug;

/// Bounded timeout so a slow memory service cannot stall a turn.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

/// Client for a remote mem0-style memory service.
pub struct RemoteMemoryStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RemoteMemoryStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.api_key)
    }
}

#[async_trait]
impl MemoryStore for RemoteMemoryStore {
    fn name(&self) -> &str {
        "remote"
    }

    async fn get_all(&self, user_id: &str) -> Result<Vec<String>, MemoryError> {
        let url = format!("{}/memories/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("user_id", user_id)])
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| MemoryError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MemoryError::QueryFailed(format!(
                "get_all returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| MemoryError::MalformedResponse(e.to_string()))?;

        let facts = normalize_facts(&body);
        debug!(user_id, count = facts.len(), "Fetched stored facts");
        Ok(facts)
    }

    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<String>, MemoryError> {
        let url = format!("{}/memories/search/", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "query": query, "user_id": user_id }))
            .send()
            .await
            .map_err(|e| MemoryError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MemoryError::QueryFailed(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| MemoryError::MalformedResponse(e.to_string()))?;

        Ok(normalize_facts(&body))
    }

    async fn add(&self, user_id: &str, transcript: &[TranscriptTurn]) -> Result<(), MemoryError> {
        let url = format!("{}/memories/", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&serde_json::json!({ "messages": transcript, "user_id": user_id }))
            .send()
            .await
            .map_err(|e| MemoryError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MemoryError::WriteFailed(format!(
                "add returned status {}",
                response.status()
            )));
        }

        debug!(user_id, turns = transcript.len(), "Recorded exchange");
        Ok(())
    }
}

/// Flatten any of the observed response shapes into a sequence of facts.
///
/// Accepted shapes: a bare array, `{"results": [...]}`, `{"memories": [...]}`.
/// Entries may be strings or objects with a `memory` or `text` field; other
/// objects are rendered as their JSON text rather than dropped. Anything
/// unrecognized yields an empty sequence.
pub fn normalize_facts(body: &Value) -> Vec<String> {
    let list = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("results").or_else(|| map.get("memories")) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    list.iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj
                .get("memory")
                .or_else(|| obj.get("text"))
                .and_then(Value::as_str)
                .map(String::from)
                .or_else(|| Some(entry.to_string())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_bare_list() {
        let body = json!([{"memory": "likes hiking"}, {"memory": "has two kids"}]);
        assert_eq!(normalize_facts(&body), vec!["likes hiking", "has two kids"]);
    }

    #[test]
    fn normalize_results_wrapper() {
        let body = json!({"results": [{"memory": "likes hiking"}]});
        assert_eq!(normalize_facts(&body), vec!["likes hiking"]);
    }

    #[test]
    fn normalize_memories_wrapper() {
        let body = json!({"memories": [{"memory": "likes hiking"}]});
        assert_eq!(normalize_facts(&body), vec!["likes hiking"]);
    }

    #[test]
    fn all_three_shapes_agree() {
        let entries = json!([{"memory": "a"}, {"memory": "b"}]);
        let bare = normalize_facts(&entries);
        let results = normalize_facts(&json!({"results": entries}));
        let memories = normalize_facts(&json!({"memories": entries}));
        assert_eq!(bare, results);
        assert_eq!(results, memories);
    }

    #[test]
    fn text_field_fallback() {
        let body = json!([{"text": "prefers tea"}]);
        assert_eq!(normalize_facts(&body), vec!["prefers tea"]);
    }

    #[test]
    fn plain_string_entries() {
        let body = json!(["fact one", "fact two"]);
        assert_eq!(normalize_facts(&body), vec!["fact one", "fact two"]);
    }

    #[test]
    fn unrecognized_object_rendered_as_json() {
        let body = json!([{"id": 7}]);
        let facts = normalize_facts(&body);
        assert_eq!(facts.len(), 1);
        assert!(facts[0].contains("7"));
    }

    #[test]
    fn malformed_shapes_yield_empty() {
        assert!(normalize_facts(&json!("not a list")).is_empty());
        assert!(normalize_facts(&json!(42)).is_empty());
        assert!(normalize_facts(&json!({"unexpected": true})).is_empty());
        assert!(normalize_facts(&json!(null)).is_empty());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let store = RemoteMemoryStore::new("https://api.mem0.ai/v1/", "key");
        assert_eq!(store.base_url, "https://api.mem0.ai/v1");
    }

    #[tokio::test]
    async fn unreachable_service_returns_error() {
        let store = RemoteMemoryStore::new("http://127.0.0.1:9/v1", "key");
        let err = store.get_all("user_1").await.unwrap_err();
        assert!(matches!(err, MemoryError::Unreachable(_)));
    }
}
