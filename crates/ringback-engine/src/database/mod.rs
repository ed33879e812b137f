//! Queue store: the single shared mutable resource of the engine.
//!
//! Every component reads and writes queue state through [`QueueDatabase`];
//! nothing bypasses it. Writes are single atomic statements, so no
//! multi-statement transactions are needed anywhere in the engine.

pub mod blacklist;
pub mod entries;
pub mod members;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

pub use entries::{CallbackCandidate, QueueEntryRow};
pub use members::{MemberUpdate, QueueMemberRow, UpsertMember};

/// Async queue store over a pooled SQLite database.
#[derive(Clone)]
pub struct QueueDatabase {
    pool: SqlitePool,
}

impl QueueDatabase {
    /// Open (creating if missing) the store at `path` and initialize the
    /// schema.
    pub async fn new(path: &str, max_connections: u32) -> Result<Self> {
        info!("🗄️ Opening callback queue database at {}", path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.initialize_schema().await?;

        Ok(database)
    }

    /// Create an in-memory store for testing.
    ///
    /// Pinned to a single connection: each pooled connection to `:memory:`
    /// would otherwise get its own empty database.
    pub async fn new_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let database = Self { pool };
        database.initialize_schema().await?;

        Ok(database)
    }

    /// Create the tables and indexes if they do not exist yet.
    async fn initialize_schema(&self) -> Result<()> {
        debug!("📋 Creating callback queue schema");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS queue (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 uid TEXT NOT NULL UNIQUE,
                 callback INTEGER NOT NULL DEFAULT 0,
                 callerid TEXT,
                 number TEXT,
                 room TEXT,
                 queue_name TEXT NOT NULL,
                 count INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL DEFAULT (datetime('now'))
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS queue_members (
                 agent TEXT NOT NULL,
                 queue_name TEXT NOT NULL,
                 name TEXT,
                 location TEXT NOT NULL,
                 penalty INTEGER NOT NULL DEFAULT 0,
                 calls_taken INTEGER NOT NULL DEFAULT 0,
                 last_call INTEGER NOT NULL DEFAULT 0,
                 status INTEGER NOT NULL DEFAULT 0,
                 paused INTEGER NOT NULL DEFAULT 0,
                 timestamp TEXT NOT NULL,
                 UNIQUE (queue_name, location)
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS callback_blacklist (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 number TEXT NOT NULL UNIQUE
             )",
        )
        .execute(&self.pool)
        .await?;

        // Call records are written by the record-keeping side of the system;
        // the engine only joins against them for ticket/DNID correlation.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                 uid TEXT NOT NULL UNIQUE,
                 ticket TEXT,
                 caller_dnid TEXT
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_queue_callback
                 ON queue (queue_name, callback)",
        )
        .execute(&self.pool)
        .await?;

        debug!("✅ Callback queue schema ready");
        Ok(())
    }

    /// The underlying pool, for the externally managed tables (blacklist,
    /// records) and for test setup.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute a health check query
    pub async fn health_check(&self) -> Result<bool> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(e) => {
                error!("❌ Database health check failed: {}", e);
                Ok(false)
            }
        }
    }
}
