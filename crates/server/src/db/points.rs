//! Point repository: persistence for collection points and their item
//! associations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use ecoponto_core::{Coordinates, Email, ItemId, Phone, PointId, Uf};

use super::RepositoryError;
use crate::models::{Item, NewPoint, Point, PointWithItems};

/// Row shape shared by every `points` query.
#[derive(Debug, sqlx::FromRow)]
struct PointRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    image: Option<String>,
    uf: String,
    city: String,
    lat: f64,
    lon: f64,
    created_at: DateTime<Utc>,
}

impl PointRow {
    /// Convert a row into the domain type, re-validating stored values.
    fn into_domain(self) -> Result<Point, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = self
            .phone
            .as_deref()
            .map(Phone::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;
        let uf = Uf::parse(&self.uf)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid uf in database: {e}")))?;
        let position = Coordinates::new(self.lat, self.lon).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid coordinates in database: {e}"))
        })?;

        Ok(Point {
            id: PointId::new(self.id),
            name: self.name,
            email,
            phone,
            image: self.image,
            uf,
            city: self.city,
            position,
            created_at: self.created_at,
        })
    }
}

const SELECT_POINT: &str = r"
    SELECT id, name, email, phone, image, uf, city, lat, lon, created_at
    FROM points
";

/// Criteria for listing points. Any subset may be set.
#[derive(Debug, Clone, Default)]
pub struct PointFilter {
    /// Restrict to a state.
    pub uf: Option<Uf>,
    /// Restrict to a city (exact match).
    pub city: Option<String>,
    /// Restrict to points accepting any of these items.
    pub items: Option<Vec<ItemId>>,
}

/// Repository for collection point database operations.
pub struct PointRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PointRepository<'a> {
    /// Create a new point repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a point together with its item associations.
    ///
    /// Both inserts ride in one transaction: a failure inserting any
    /// `point_items` row rolls back the point insert, so either the point
    /// and all N associations exist afterwards or nothing does.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::UnknownItem` if an item id references no
    /// catalog item, `RepositoryError::Database` for other failures.
    pub async fn create(
        &self,
        new: &NewPoint,
        items: &[ItemId],
    ) -> Result<Point, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: PointRow = sqlx::query_as(
            r"
            INSERT INTO points (name, email, phone, image, uf, city, lat, lon)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, phone, image, uf, city, lat, lon, created_at
            ",
        )
        .bind(&new.name)
        .bind(new.email.as_str())
        .bind(new.phone.as_ref().map(Phone::as_str))
        .bind(new.image.as_deref())
        .bind(new.uf.as_str())
        .bind(&new.city)
        .bind(new.position.lat)
        .bind(new.position.lon)
        .fetch_one(&mut *tx)
        .await?;

        for item_id in items {
            sqlx::query(
                r"
                INSERT INTO point_items (point_id, item_id)
                VALUES ($1, $2)
                ",
            )
            .bind(row.id)
            .bind(item_id.as_i32())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    // Dropping the transaction rolls back the point insert.
                    return RepositoryError::UnknownItem;
                }
                RepositoryError::Database(e)
            })?;
        }

        tx.commit().await?;

        row.into_domain()
    }

    /// List points matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn list(&self, filter: &PointFilter) -> Result<Vec<Point>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_POINT);
        query.push(" WHERE TRUE");

        if let Some(uf) = filter.uf {
            query.push(" AND uf = ").push_bind(uf.as_str().to_owned());
        }
        if let Some(city) = &filter.city {
            query.push(" AND city = ").push_bind(city.clone());
        }
        if let Some(items) = &filter.items {
            let ids: Vec<i32> = items.iter().map(ItemId::as_i32).collect();
            query
                .push(" AND id IN (SELECT point_id FROM point_items WHERE item_id = ANY(")
                .push_bind(ids)
                .push("))");
        }
        query.push(" ORDER BY id ASC");

        let rows: Vec<PointRow> = query.build_query_as().fetch_all(self.pool).await?;

        rows.into_iter().map(PointRow::into_domain).collect()
    }

    /// Fetch one point by id with its associated items expanded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such point exists.
    pub async fn get_with_items(&self, id: PointId) -> Result<PointWithItems, RepositoryError> {
        let row: Option<PointRow> = sqlx::query_as(&format!("{SELECT_POINT} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        let point = row.ok_or(RepositoryError::NotFound)?.into_domain()?;

        #[derive(sqlx::FromRow)]
        struct ItemRow {
            id: i32,
            title: String,
            image: String,
        }

        let item_rows: Vec<ItemRow> = sqlx::query_as(
            r"
            SELECT i.id, i.title, i.image
            FROM items i
            JOIN point_items pi ON pi.item_id = i.id
            WHERE pi.point_id = $1
            ORDER BY i.id ASC
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(|r| Item {
                id: ItemId::new(r.id),
                title: r.title,
                image: r.image,
            })
            .collect();

        Ok(PointWithItems { point, items })
    }
}
