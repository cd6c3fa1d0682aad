//! Database operations for the EcoPonto `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `items` - Collectible item categories (static reference data)
//! - `points` - Registered collection points
//! - `point_items` - Many-to-many association between points and items
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p ecoponto-cli -- migrate
//! ```

pub mod items;
pub mod points;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use items::ItemRepository;
pub use points::{PointFilter, PointRepository};

/// Errors produced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The requested row does not exist.
    #[error("not found")]
    NotFound,

    /// A submitted item id references no catalog item. Detected as a
    /// foreign key violation inside the create transaction, after rollback.
    #[error("unknown item id in submission")]
    UnknownItem,

    /// A stored value failed domain validation on read.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
