//! # parley-store
//!
//! Durable store for users and messages.
//!
//! ## Overview
//!
//! Implements the repository traits defined in `parley-core` twice:
//!
//! - PostgreSQL via SQLx (pool, migrations, `FromRow` models, entity mappers)
//! - An in-memory `DashMap` store for development and tests
//!
//! [`open`] picks one according to [`StorageConfig`] and hands back trait objects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parley_common::AppConfig;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_env()?;
//!     let repos = parley_store::open(&config.storage).await?;
//!     let users = repos.users.list_all().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use parley_common::{StorageBackend, StorageConfig};
use parley_core::{MessageRepository, UserRepository};
use tracing::info;

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::InMemoryStore;
pub use pool::{create_pool, run_migrations, PgPool, PoolOptions};
pub use repositories::{PgMessageRepository, PgUserRepository};

/// The repositories the rest of the process is written against
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub messages: Arc<dyn MessageRepository>,
}

impl Repositories {
    /// Both traits served by one in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            messages: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            messages: Arc::new(PgMessageRepository::new(pool)),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// Errors opening the configured store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("DATABASE_URL is required for the postgres backend")]
    MissingDatabaseConfig,

    #[error("Failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Failed to apply migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Open the store selected by configuration, applying migrations for Postgres
pub async fn open(config: &StorageConfig) -> Result<Repositories, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory store");
            Ok(Repositories::in_memory())
        }
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or(StoreError::MissingDatabaseConfig)?;
            let pool = create_pool(database, &PoolOptions::default()).await?;
            run_migrations(&pool).await?;
            info!(max_connections = database.max_connections, "Connected to PostgreSQL");
            Ok(Repositories::postgres(pool))
        }
    }
}
