//! Collection point domain types.

use chrono::{DateTime, Utc};

use ecoponto_core::{Coordinates, Email, Phone, PointId, Uf};

use super::Item;

/// A registered waste-collection point (domain type).
#[derive(Debug, Clone)]
pub struct Point {
    /// Unique point ID.
    pub id: PointId,
    /// Display name of the collection point.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Contact phone, if provided.
    pub phone: Option<Phone>,
    /// Stored photo filename, if a photo was uploaded.
    pub image: Option<String>,
    /// Two-letter state code.
    pub uf: Uf,
    /// City name within the state.
    pub city: String,
    /// Map position.
    pub position: Coordinates,
    /// When the point was registered.
    pub created_at: DateTime<Utc>,
}

/// Fields of a point about to be persisted (no ID yet).
#[derive(Debug, Clone)]
pub struct NewPoint {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub image: Option<String>,
    pub uf: Uf,
    pub city: String,
    pub position: Coordinates,
}

/// A point expanded with the item categories it accepts.
#[derive(Debug, Clone)]
pub struct PointWithItems {
    pub point: Point,
    pub items: Vec<Item>,
}
