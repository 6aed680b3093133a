//! Hearth CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Interactive conversation or single-message mode
//! - `user`   — Account management (create, login, deactivate)
//! - `status` — Show configuration and capability flags

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "hearth",
    about = "Hearth — context-aware family assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Act as this user id (otherwise resolved from the thread)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: commands::user::UserCommand,
    },

    /// Show configuration and capabilities
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Chat { message, user } => commands::chat::run(message, user).await?,
        Commands::User { command } => commands::user::run(command).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
