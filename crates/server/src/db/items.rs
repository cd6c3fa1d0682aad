//! Item catalog repository.

use sqlx::PgPool;

use ecoponto_core::ItemId;

use super::RepositoryError;
use crate::models::Item;

/// Row shape shared by every `items` query.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i32,
    title: String,
    image: String,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            title: row.title,
            image: row.image,
        }
    }
}

/// Repository for the collectible item catalog.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the full item catalog, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Item>, RepositoryError> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r"
            SELECT id, title, image
            FROM items
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }
}
