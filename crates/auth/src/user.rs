//! The SQLite user store.
//!
//! One `users` table. Accounts are soft-deleted (`is_active = 0`, row
//! retained) so the memory partition key survives deactivation. That key,
//! `mem0_user_id`, is derived from the account id at insert time and is
//! never updated afterwards.

use crate::password;
use chrono::{DateTime, Utc};
use hearth_core::error::AuthError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// A user account. `password_hash` never leaves this module.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_verified: bool,
    /// Memory partition key, `"user_" + id`. Assigned once, immutable.
    pub mem0_user_id: String,
    pub preferences: serde_json::Value,
}

/// Fields required to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Profile fields that can change after creation. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferences: Option<serde_json::Value>,
}

pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Open (or create) the user database at a SQLite URL.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database in tests.
    pub async fn new(database_url: &str) -> Result<Self, AuthError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AuthError::Storage(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("User store initialized at {database_url}");
        Ok(store)
    }

    /// Wrap an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, AuthError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                email         TEXT UNIQUE NOT NULL,
                username      TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                first_name    TEXT,
                last_name     TEXT,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL,
                last_login    TEXT,
                is_active     INTEGER NOT NULL DEFAULT 1,
                is_verified   INTEGER NOT NULL DEFAULT 0,
                mem0_user_id  TEXT UNIQUE NOT NULL,
                preferences   TEXT NOT NULL DEFAULT '{}'
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("users table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("email index: {e}")))?;

        debug!("User store migrations complete");
        Ok(())
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, AuthError> {
        let col = |e: sqlx::Error, name: &str| AuthError::Storage(format!("{name} column: {e}"));

        let created_at_str: String = row.try_get("created_at").map_err(|e| col(e, "created_at"))?;
        let updated_at_str: String = row.try_get("updated_at").map_err(|e| col(e, "updated_at"))?;
        let last_login_str: Option<String> =
            row.try_get("last_login").map_err(|e| col(e, "last_login"))?;
        let preferences_json: String =
            row.try_get("preferences").map_err(|e| col(e, "preferences"))?;

        // A row with an unparseable timestamp is corrupt; report it rather
        // than substituting a fabricated time
        let parse_ts = |s: &str, name: &str| {
            chrono::DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| AuthError::Storage(format!("{name} timestamp: {e}")))
        };

        Ok(User {
            id: row.try_get("id").map_err(|e| col(e, "id"))?,
            email: row.try_get("email").map_err(|e| col(e, "email"))?,
            username: row.try_get("username").map_err(|e| col(e, "username"))?,
            first_name: row.try_get("first_name").map_err(|e| col(e, "first_name"))?,
            last_name: row.try_get("last_name").map_err(|e| col(e, "last_name"))?,
            created_at: parse_ts(&created_at_str, "created_at")?,
            updated_at: parse_ts(&updated_at_str, "updated_at")?,
            last_login: last_login_str
                .as_deref()
                .map(|s| parse_ts(s, "last_login"))
                .transpose()?,
            is_active: row.try_get::<i64, _>("is_active").map_err(|e| col(e, "is_active"))? != 0,
            is_verified: row
                .try_get::<i64, _>("is_verified")
                .map_err(|e| col(e, "is_verified"))?
                != 0,
            mem0_user_id: row
                .try_get("mem0_user_id")
                .map_err(|e| col(e, "mem0_user_id"))?,
            preferences: serde_json::from_str(&preferences_json).unwrap_or_default(),
        })
    }

    /// Create an account.
    ///
    /// Returns `Ok(None)` when the email or username is already taken; no
    /// row is written in that case.
    pub async fn create_user(&self, new: NewUser) -> Result<Option<User>, AuthError> {
        let id = Uuid::new_v4().to_string();
        let mem0_user_id = format!("user_{id}");
        let password_hash = password::hash_password(&new.password);
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            INSERT INTO users
                (id, email, username, password_hash, first_name, last_name,
                 created_at, updated_at, mem0_user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&new.email)
        .bind(&new.username)
        .bind(&password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&now)
        .bind(&mem0_user_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(user_id = %id, "User created");
                self.get_by_id(&id).await
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                debug!(email = %new.email, "Duplicate email or username, user not created");
                Ok(None)
            }
            Err(e) => Err(AuthError::Storage(format!("INSERT failed: {e}"))),
        }
    }

    /// Fetch an account by id, active or not.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("SELECT by id: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_user(r)?)),
            None => Ok(None),
        }
    }

    /// Check credentials for an active account and stamp `last_login`.
    ///
    /// The identifier matches either email or username. Unknown account,
    /// wrong password, and deactivated account are indistinguishable to the
    /// caller.
    pub async fn authenticate(&self, identifier: &str, pass: &str) -> Result<User, AuthError> {
        let row = sqlx::query(
            "SELECT * FROM users WHERE (email = ?1 OR username = ?1) AND is_active = 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("SELECT for auth: {e}")))?;

        let Some(row) = row else {
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Storage(format!("password_hash column: {e}")))?;
        if !password::verify_password(pass, &stored_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let mut user = Self::row_to_user(&row)?;
        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
            .bind(now.to_rfc3339())
            .bind(&user.id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::Storage(format!("last_login stamp: {e}")))?;
        user.last_login = Some(now);

        debug!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    /// Apply profile edits. Returns the updated account, or `None` when the
    /// id does not exist.
    pub async fn update_user(
        &self,
        id: &str,
        update: UserUpdate,
    ) -> Result<Option<User>, AuthError> {
        let Some(current) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let first_name = update.first_name.or(current.first_name);
        let last_name = update.last_name.or(current.last_name);
        let preferences = update.preferences.unwrap_or(current.preferences);
        let preferences_json = serde_json::to_string(&preferences)
            .map_err(|e| AuthError::Storage(format!("preferences serialization: {e}")))?;

        sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?1, last_name = ?2, preferences = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&first_name)
        .bind(&last_name)
        .bind(&preferences_json)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("UPDATE failed: {e}")))?;

        self.get_by_id(id).await
    }

    /// Soft-delete an account. The row stays so the memory partition key
    /// keeps resolving; the account just can no longer authenticate.
    pub async fn delete_user(&self, id: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE users SET is_active = 0, updated_at = ?1 WHERE id = ?2 AND is_active = 1",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(format!("Soft delete failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}
