//! Item catalog route handlers.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Serialize;

use ecoponto_core::ItemId;

use crate::db::ItemRepository;
use crate::error::Result;
use crate::models::Item;
use crate::routes::image_url;
use crate::state::AppState;

/// Wire shape of a catalog item.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub title: String,
    /// Absolute URL for the item icon, built from the serving host.
    pub image_url: String,
}

impl ItemResponse {
    pub(crate) fn from_item(item: Item, headers: &HeaderMap, state: &AppState) -> Self {
        let image_url = image_url(headers, state.config(), &item.image);
        Self {
            id: item.id,
            title: item.title,
            image_url,
        }
    }
}

/// `GET /items` - list the full item catalog.
#[tracing::instrument(skip_all)]
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<ItemResponse>>> {
    let items = ItemRepository::new(state.pool()).list_all().await?;

    let serialized = items
        .into_iter()
        .map(|item| ItemResponse::from_item(item, &headers, &state))
        .collect();

    Ok(Json(serialized))
}
