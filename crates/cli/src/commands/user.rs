//! `hearth user` — Account management.

use clap::Subcommand;
use hearth_auth::{NewUser, TokenSigner, UserStore};
use hearth_config::AppConfig;

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create an account
    Create {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Check credentials and print an access token
    Login {
        /// Email or username
        identifier: String,

        #[arg(long)]
        password: String,
    },

    /// Deactivate an account (soft delete; memories are retained)
    Deactivate {
        /// The account id
        id: String,
    },
}

pub async fn run(command: UserCommand) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = UserStore::new(&config.auth.database_url).await?;

    match command {
        UserCommand::Create {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let created = store
                .create_user(NewUser {
                    email,
                    username,
                    password,
                    first_name,
                    last_name,
                })
                .await?;

            match created {
                Some(user) => {
                    println!("  Created account {}", user.username);
                    println!("  Id:         {}", user.id);
                    println!("  Memory key: {}", user.mem0_user_id);
                }
                None => {
                    eprintln!("  That email or username is already taken.");
                    return Err("duplicate account".into());
                }
            }
        }

        UserCommand::Login {
            identifier,
            password,
        } => {
            let user = store.authenticate(&identifier, &password).await?;
            println!("  Welcome back, {}", user.username);

            match &config.auth.jwt_secret {
                Some(secret) => {
                    let signer = TokenSigner::new(secret, config.auth.token_ttl_minutes);
                    let token = signer.issue(&user.id)?;
                    println!("  Token ({}m): {token}", config.auth.token_ttl_minutes);
                }
                None => {
                    println!("  No HEARTH_JWT_SECRET configured; skipping token issuance.");
                }
            }
        }

        UserCommand::Deactivate { id } => {
            if store.delete_user(&id).await? {
                println!("  Account {id} deactivated. Stored memories are retained.");
            } else {
                eprintln!("  No active account with id {id}.");
                return Err("account not found".into());
            }
        }
    }

    Ok(())
}
