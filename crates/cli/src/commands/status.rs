//! `hearth status` — Show configuration, capability flags, and provider
//! reachability.

use hearth_config::AppConfig;
use hearth_core::provider::Provider;
use hearth_providers::OpenAiCompatProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("Hearth Status");
    println!("=============");
    println!("  Config dir:  {}", AppConfig::config_dir().display());
    println!("  Model:       {}", config.default_model);
    println!("  Endpoint:    {}", config.api_url);
    println!("  Temperature: {}", config.default_temperature);
    println!("  Hop ceiling: {}", config.turn.max_hops);
    match &config.api_key {
        Some(key) => {
            let provider = OpenAiCompatProvider::new("gemini", &config.api_url, key);
            let reachability = match provider.health_check().await {
                Ok(true) => "key configured, endpoint reachable".to_string(),
                Ok(false) => "key configured, endpoint rejected the key".to_string(),
                Err(e) => format!("key configured, endpoint unreachable ({e})"),
            };
            println!("  Provider:    {reachability}");
        }
        None => println!("  Provider:    NO KEY"),
    }
    println!(
        "  Search:      {}",
        if config.search_enabled() { "enabled" } else { "disabled (no TAVILY_API_KEY)" }
    );
    println!(
        "  Memory:      {}",
        if config.memory_enabled() { "remote" } else { "session-only (no MEM0_API_KEY)" }
    );
    println!("  User store:  {}", config.auth.database_url);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found at {}", config_path.display());
    } else {
        println!("\n  No config file; running on defaults and environment variables");
    }

    Ok(())
}
