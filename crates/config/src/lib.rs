//! Configuration loading, validation, and management for Hearth.
//!
//! Loads configuration from `~/.hearth/config.toml` with environment
//! variable overrides. Capability flags (web search, remote memory) are
//! resolved once at startup from the presence of the relevant API keys, so
//! one pipeline serves every feature combination.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.hearth/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// LLM provider API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible chat endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Semantic memory service configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// User store configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Turn runner configuration
    #[serde(default)]
    pub turn: TurnConfig,
}

fn default_api_url() -> String {
    // Gemini's OpenAI-compatible surface; any compatible endpoint works
    "https://generativelanguage.googleapis.com/v1beta/openai".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("search", &self.search)
            .field("memory", &self.memory)
            .field("auth", &self.auth)
            .field("turn", &self.turn)
            .finish()
    }
}

/// Web search (Tavily-compatible) settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API key; search capability is off when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Search API endpoint
    #[serde(default = "default_search_url")]
    pub api_url: String,

    /// Results surfaced to the model per call
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
}

fn default_search_url() -> String {
    "https://api.tavily.com/search".into()
}
fn default_search_max_results() -> usize {
    3
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_search_url(),
            max_results: default_search_max_results(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

/// Remote semantic memory service settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Memory service API key; memory capability is off when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Memory service base URL
    #[serde(default = "default_memory_url")]
    pub api_url: String,

    /// Stored facts surfaced to the prompt
    #[serde(default = "default_fact_limit")]
    pub fact_limit: usize,

    /// Query-relevant facts surfaced to the prompt
    #[serde(default = "default_relevant_limit")]
    pub relevant_limit: usize,
}

fn default_memory_url() -> String {
    "https://api.mem0.ai/v1".into()
}
fn default_fact_limit() -> usize {
    10
}
fn default_relevant_limit() -> usize {
    3
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_memory_url(),
            fact_limit: default_fact_limit(),
            relevant_limit: default_relevant_limit(),
        }
    }
}

impl std::fmt::Debug for MemoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("fact_limit", &self.fact_limit)
            .field("relevant_limit", &self.relevant_limit)
            .finish()
    }
}

/// User store settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// SQLite database URL for the user store
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Secret used to sign access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,

    /// Access token lifetime in minutes
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

fn default_database_url() -> String {
    "sqlite://hearth_users.db".into()
}
fn default_token_ttl_minutes() -> i64 {
    30
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            jwt_secret: None,
            token_ttl_minutes: default_token_ttl_minutes(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &redact(&self.jwt_secret))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

/// Turn runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnConfig {
    /// Maximum chat → tool → chat hops per turn
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
}

fn default_max_hops() -> u32 {
    5
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.hearth/config.toml).
    ///
    /// Environment variables override file values:
    /// - `HEARTH_API_KEY` / `GEMINI_API_KEY` — provider key
    /// - `HEARTH_MODEL` — model
    /// - `TAVILY_API_KEY` — search key
    /// - `MEM0_API_KEY` — memory service key
    /// - `DATABASE_URL` — user store
    /// - `HEARTH_JWT_SECRET` — token signing secret
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("HEARTH_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }
        if let Ok(model) = std::env::var("HEARTH_MODEL") {
            config.default_model = model;
        }
        if config.search.api_key.is_none() {
            config.search.api_key = std::env::var("TAVILY_API_KEY").ok();
        }
        if config.memory.api_key.is_none() {
            config.memory.api_key = std::env::var("MEM0_API_KEY").ok();
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.auth.database_url = url;
        }
        if config.auth.jwt_secret.is_none() {
            config.auth.jwt_secret = std::env::var("HEARTH_JWT_SECRET").ok();
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".hearth")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.turn.max_hops == 0 {
            return Err(ConfigError::ValidationError(
                "turn.max_hops must be at least 1".into(),
            ));
        }
        if self.memory.fact_limit == 0 {
            return Err(ConfigError::ValidationError(
                "memory.fact_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether the web-search capability is on.
    pub fn search_enabled(&self) -> bool {
        self.search.api_key.is_some()
    }

    /// Whether the remote-memory capability is on.
    pub fn memory_enabled(&self) -> bool {
        self.memory.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            search: SearchConfig::default(),
            memory: MemoryConfig::default(),
            auth: AuthConfig::default(),
            turn: TurnConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_model, "gemini-2.5-flash");
        assert_eq!(config.turn.max_hops, 5);
        assert_eq!(config.memory.fact_limit, 10);
        assert_eq!(config.memory.relevant_limit, 3);
        assert_eq!(config.search.max_results, 3);
    }

    #[test]
    fn capabilities_off_without_keys() {
        let config = AppConfig::default();
        assert!(!config.search_enabled());
        assert!(!config.memory_enabled());
    }

    #[test]
    fn capabilities_on_with_keys() {
        let mut config = AppConfig::default();
        config.search.api_key = Some("tvly-test".into());
        config.memory.api_key = Some("m0-test".into());
        assert!(config.search_enabled());
        assert!(config.memory_enabled());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.turn.max_hops, config.turn.max_hops);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_hop_ceiling_rejected() {
        let mut config = AppConfig::default();
        config.turn.max_hops = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_model, "gemini-2.5-flash");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "default_model = \"gemini-2.0-flash\"\n\n[turn]\nmax_hops = 8"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_model, "gemini-2.0-flash");
        assert_eq!(config.turn.max_hops, 8);
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.api_key = Some("super-secret".into());
        let dump = format!("{config:?}");
        assert!(!dump.contains("super-secret"));
        assert!(dump.contains("[REDACTED]"));
    }
}
