//! Built-in tool implementations for Hearth.
//!
//! Tools are capability-gated: the registry builder only registers a tool
//! when its key is configured, so the turn runner sees an empty registry
//! (and sends no tool schema) when search is off.

pub mod web_search;

pub use web_search::WebSearchTool;

use hearth_config::AppConfig;
use hearth_core::tool::ToolRegistry;

/// Build the tool registry from resolved capabilities.
pub fn registry_from_config(config: &AppConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    if let Some(key) = &config.search.api_key {
        registry.register(Box::new(WebSearchTool::new(
            &config.search.api_url,
            key,
            config.search.max_results,
        )));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_empty_without_search_key() {
        let config = AppConfig::default();
        let registry = registry_from_config(&config);
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_has_web_search_with_key() {
        let mut config = AppConfig::default();
        config.search.api_key = Some("tvly-test".into());
        let registry = registry_from_config(&config);
        assert!(registry.get("web_search").is_some());
    }
}
