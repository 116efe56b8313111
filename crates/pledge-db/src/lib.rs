//! # pledge-db
//!
//! Storage layer for pledgewatch community notes.
//!
//! This crate provides:
//! - Connection pool management
//! - [`PgNoteRepository`], the PostgreSQL note repository
//! - [`MemoryNoteRepository`], an in-process repository with identical semantics
//!
//! ## Example
//!
//! ```rust,ignore
//! use pledge_db::{Database, NoteClassification, NoteDraft, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/pledgewatch").await?;
//!
//!     let note = db.notes.create(NoteDraft {
//!         promise_id: 42,
//!         author_id: 7,
//!         summary: "Funding was approved".to_string(),
//!         content: "The council vote passed 9-2.".to_string(),
//!         sources: vec!["https://example.org/minutes".to_string()],
//!         classification: NoteClassification::PromiseKept,
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod memory;
pub mod notes;
pub mod pool;

// Always compiled so integration tests (in tests/) can use the fixtures
pub mod test_fixtures;

// Re-export core types
pub use pledge_core::*;

pub use memory::MemoryNoteRepository;
pub use notes::PgNoteRepository;
pub use pool::{connect_pool, pool_health, PoolConfig, PoolHealth};

/// Database context: the pool plus the repositories built on it.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = connect_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Current pool usage.
    pub fn pool_health(&self) -> PoolHealth {
        pool_health(&self.pool)
    }
}
