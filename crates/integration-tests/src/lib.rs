//! Integration tests for EcoPonto.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations + seed
//! cargo run -p ecoponto-cli -- migrate
//! cargo run -p ecoponto-cli -- seed items
//!
//! # Start the server
//! cargo run -p ecoponto-server
//!
//! # Run the ignored integration tests
//! cargo test -p ecoponto-integration-tests -- --ignored
//! ```
//!
//! The tests talk to the API over HTTP and verify persistence directly
//! against the database, so both must be reachable:
//!
//! - `ECOPONTO_BASE_URL` (default `http://localhost:3333`)
//! - `ECOPONTO_DATABASE_URL` or `DATABASE_URL`

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("ECOPONTO_BASE_URL").unwrap_or_else(|_| "http://localhost:3333".to_string())
}

/// Connect to the test database for direct row assertions.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection fails; the
/// integration tests cannot run without one.
pub async fn test_pool() -> PgPool {
    let database_url = std::env::var("ECOPONTO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .expect("ECOPONTO_DATABASE_URL or DATABASE_URL must be set");

    PgPool::connect(database_url.expose_secret())
        .await
        .expect("Failed to connect to test database")
}

/// Count the point rows with the given name.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn count_points_named(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM points WHERE name = $1")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("Failed to count points")
}

/// Count the association rows for one point.
///
/// # Panics
///
/// Panics if the query fails.
pub async fn count_point_items(pool: &PgPool, point_id: i32) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM point_items WHERE point_id = $1")
        .bind(point_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count point items")
}
