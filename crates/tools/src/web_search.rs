//! Web search tool backed by the Tavily search API.
//!
//! Results surfaced to the model are capped (3 by default) regardless of
//! what the model asks for.

use async_trait::async_trait;
use hearth_core::error::ToolError;
use hearth_core::tool::{Tool, ToolResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

const SEARCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub struct WebSearchTool {
    api_url: String,
    api_key: String,
    max_results: usize,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, max_results: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            max_results,
            client,
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ToolError> {
        let body = serde_json::json!({
            "query": query,
            "max_results": self.max_results,
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::Timeout {
                        tool_name: "web_search".into(),
                        timeout_secs: SEARCH_TIMEOUT.as_secs(),
                    }
                } else {
                    ToolError::ExecutionFailed {
                        tool_name: "web_search".into(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: format!("search API returned status {}", response.status()),
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason: format!("malformed search response: {e}"),
        })?;

        let mut results = parsed.results;
        results.truncate(self.max_results);
        debug!(query, count = results.len(), "Web search completed");
        Ok(results)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information: weather, news, local events, \
         recipes, or any topic. Returns relevant results with titles, URLs, and content."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;

        let results = self.search(query).await?;
        let output = serde_json::to_string_pretty(&results).unwrap_or_default();

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output,
        })
    }
}

/// One search hit as surfaced to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> WebSearchTool {
        WebSearchTool::new("https://api.tavily.com/search", "tvly-test", 3)
    }

    #[test]
    fn tool_definition() {
        let def = tool().to_definition();
        assert_eq!(def.name, "web_search");
        assert!(!def.description.is_empty());
        assert!(def.parameters["required"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("query")));
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let err = tool().execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_execution_failure() {
        let tool = WebSearchTool::new("http://127.0.0.1:9/search", "key", 3);
        let err = tool
            .execute(serde_json::json!({"query": "weather"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[test]
    fn response_parsing_caps_handled_by_truncate() {
        let raw = serde_json::json!({
            "results": [
                {"title": "A", "url": "https://a", "content": "aa"},
                {"title": "B", "url": "https://b", "content": "bb"},
                {"title": "C", "url": "https://c", "content": "cc"},
                {"title": "D", "url": "https://d", "content": "dd"}
            ]
        });
        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        let mut results = parsed.results;
        results.truncate(3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "A");
    }
}
