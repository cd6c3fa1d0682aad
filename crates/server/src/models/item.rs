//! Collectible item category domain type.

use ecoponto_core::ItemId;

/// A category of recyclable/collectible material (domain type).
///
/// Static reference data seeded by the CLI; read-only from the
/// registration workflow's perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Unique item ID.
    pub id: ItemId,
    /// Display title (e.g. "Pilhas e Baterias").
    pub title: String,
    /// Icon filename under the uploads path.
    pub image: String,
}
