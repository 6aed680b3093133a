//! `hearth chat` — Interactive or single-message conversation mode.
//!
//! In-session commands:
//! - `quit` / `exit` / `q` — leave
//! - `new`    — start a fresh conversation thread (same user)
//! - `resume` — switch back to the previously checkpointed thread
//! - `memory` — dump the stored facts for the current user
//! - `debug`  — dump the current system instruction and thread state

use hearth_agent::{ConversationStore, InMemoryConversationStore, TurnRunner, resolve_user_id};
use hearth_config::AppConfig;
use hearth_core::memory::MemoryStore;
use hearth_core::message::{Conversation, Role, ThreadId};
use hearth_memory::{InMemoryStore, MemoryAdapter, RemoteMemoryStore};
use hearth_providers::OpenAiCompatProvider;
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    user: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    HEARTH_API_KEY=...   (generic)");
        eprintln!("    GEMINI_API_KEY=...   (Gemini)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    // --- Pipeline wiring ---
    let provider = Arc::new(OpenAiCompatProvider::new("gemini", &config.api_url, api_key));

    let store: Arc<dyn MemoryStore> = match &config.memory.api_key {
        Some(key) => Arc::new(RemoteMemoryStore::new(&config.memory.api_url, key)),
        None => Arc::new(InMemoryStore::new()),
    };
    let memory = MemoryAdapter::new(Arc::clone(&store))
        .with_limits(config.memory.fact_limit, config.memory.relevant_limit);

    let tools = Arc::new(hearth_tools::registry_from_config(&config));
    let search_on = !tools.is_empty();

    let runner = TurnRunner::new(provider, &config.default_model, tools, memory.clone())
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens)
        .with_max_hops(config.turn.max_hops);

    let thread_id = ThreadId::new();
    let user_id = resolve_user_id(user.as_deref(), &thread_id.0);
    let mut conv = Conversation::new(thread_id, user_id.clone());

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let response = runner.run_turn(&mut conv, &msg).await?;
        eprint!("\r             \r");
        println!("{response}");
        return Ok(());
    }

    // Interactive mode
    let checkpoints = InMemoryConversationStore::new();
    let mut previous_thread: Option<ThreadId> = None;

    println!();
    println!("  Hearth — family assistant");
    println!();
    println!("  Model:    {}", config.default_model);
    println!("  User:     {user_id}");
    println!("  Search:   {}", if search_on { "on" } else { "off" });
    println!(
        "  Memory:   {}",
        if config.memory_enabled() { "remote" } else { "session-only" }
    );
    println!();
    println!("  Type a message, or: quit | new | resume | memory | debug");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Ok(Some(line)) = lines.next_line().await {
        let input = line.trim();
        match input {
            "" => {}
            "quit" | "exit" | "q" => break,
            "new" => {
                checkpoints.save(&conv).await?;
                previous_thread = Some(conv.thread_id.clone());
                conv = Conversation::new(ThreadId::new(), user_id.clone());
                println!("  Started a new conversation ({})", conv.thread_id);
            }
            "resume" => match &previous_thread {
                Some(thread) => match checkpoints.load(thread).await? {
                    Some(saved) => {
                        checkpoints.save(&conv).await?;
                        previous_thread = Some(conv.thread_id.clone());
                        conv = saved;
                        println!(
                            "  Resumed conversation ({}, {} messages)",
                            conv.thread_id,
                            conv.messages.len()
                        );
                    }
                    None => println!("  No checkpoint for {thread}"),
                },
                None => println!("  No previous conversation to resume"),
            },
            "memory" => {
                let facts = memory.fetch_all(&conv.user_id).await;
                if facts.is_empty() {
                    println!("  No stored facts for {}", conv.user_id);
                } else {
                    println!("  Stored facts for {}:", conv.user_id);
                    for fact in facts {
                        println!("    - {fact}");
                    }
                }
            }
            "debug" => {
                println!("  Thread:   {}", conv.thread_id);
                println!("  User:     {}", conv.user_id);
                println!("  Messages: {}", conv.messages.len());
                match conv.messages.first() {
                    Some(m) if m.role == Role::System => {
                        println!("  System instruction:");
                        for line in m.content.lines() {
                            println!("    {line}");
                        }
                    }
                    _ => println!("  No system instruction yet (no turns run)"),
                }
            }
            _ => {
                eprint!("  ...");
                match runner.run_turn(&mut conv, input).await {
                    Ok(response) => {
                        eprint!("\r     \r");
                        println!();
                        for line in response.lines() {
                            println!("  Hearth > {line}");
                        }
                        println!();
                        checkpoints.save(&conv).await?;
                    }
                    Err(e) => {
                        eprint!("\r     \r");
                        eprintln!("  [Error] {e}");
                        println!();
                    }
                }
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}
