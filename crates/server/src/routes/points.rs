//! Collection point route handlers.
//!
//! `POST /points` is the server half of the registration workflow: it
//! parses one multipart submission, validates every field (aggregating
//! failures), stores the optional image, and persists the point plus its
//! item associations in a single transaction.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use ecoponto_core::{ItemId, PointId, Uf};

use crate::db::{PointFilter, PointRepository};
use crate::error::{AppError, Result};
use crate::models::{NewPoint, Point};
use crate::routes::{image_url, items::ItemResponse};
use crate::state::AppState;
use crate::validation::{PointForm, ValidationErrors, validate_point_form};

/// Wire shape of a point summary (listing).
#[derive(Debug, Serialize)]
pub struct PointSummaryResponse {
    pub id: PointId,
    pub name: String,
    pub image_url: Option<String>,
    pub uf: Uf,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

/// Wire shape of a point detail (creation response and `GET /points/{id}`).
#[derive(Debug, Serialize)]
pub struct PointResponse {
    pub id: PointId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub uf: Uf,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub items: Vec<ItemResponse>,
}

fn summary_response(point: Point, headers: &HeaderMap, state: &AppState) -> PointSummaryResponse {
    let image_url = point
        .image
        .as_deref()
        .map(|filename| image_url(headers, state.config(), filename));

    PointSummaryResponse {
        id: point.id,
        name: point.name,
        image_url,
        uf: point.uf,
        city: point.city,
        lat: point.position.lat,
        lon: point.position.lon,
    }
}

fn detail_response(
    point: Point,
    items: Vec<ItemResponse>,
    headers: &HeaderMap,
    state: &AppState,
) -> PointResponse {
    let image_url = point
        .image
        .as_deref()
        .map(|filename| image_url(headers, state.config(), filename));

    PointResponse {
        id: point.id,
        name: point.name,
        email: point.email.into_inner(),
        phone: point.phone.map(ecoponto_core::Phone::into_inner),
        image_url,
        uf: point.uf,
        city: point.city,
        lat: point.position.lat,
        lon: point.position.lon,
        items,
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Query parameters for `GET /points`.
#[derive(Debug, Deserialize, Default)]
pub struct PointListQuery {
    pub uf: Option<String>,
    pub city: Option<String>,
    pub items: Option<String>,
}

/// Parse the listing criteria, treating empty strings as omitted (the
/// browse clients send `?uf=&city=&items=` for blank filters).
fn parse_filter(query: &PointListQuery) -> std::result::Result<PointFilter, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut filter = PointFilter::default();

    if let Some(raw) = query.uf.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        match Uf::parse(raw) {
            Ok(uf) => filter.uf = Some(uf),
            Err(e) => errors.push("uf", e.to_string()),
        }
    }

    if let Some(city) = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        filter.city = Some(city.to_owned());
    }

    if let Some(raw) = query
        .items
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let mut ids = Vec::new();
        for part in raw.split(',') {
            match part.trim().parse::<i32>() {
                Ok(id) => ids.push(ItemId::new(id)),
                Err(_) => {
                    errors.push("items", "items must be a comma-delimited list of integer ids");
                    break;
                }
            }
        }
        if !ids.is_empty() {
            filter.items = Some(ids);
        }
    }

    if errors.is_empty() { Ok(filter) } else { Err(errors) }
}

/// `GET /points` - list points filtered by state, city and accepted items.
#[tracing::instrument(skip(state, headers))]
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PointListQuery>,
) -> Result<Json<Vec<PointSummaryResponse>>> {
    let filter = parse_filter(&query)?;

    let points = PointRepository::new(state.pool()).list(&filter).await?;

    let serialized = points
        .into_iter()
        .map(|point| summary_response(point, &headers, &state))
        .collect();

    Ok(Json(serialized))
}

/// `GET /points/{id}` - one point with its associated items expanded.
#[tracing::instrument(skip(state, headers))]
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<Json<PointResponse>> {
    let with_items = PointRepository::new(state.pool())
        .get_with_items(PointId::new(id))
        .await?;

    let items = with_items
        .items
        .into_iter()
        .map(|item| ItemResponse::from_item(item, &headers, &state))
        .collect();

    Ok(Json(detail_response(
        with_items.point,
        items,
        &headers,
        &state,
    )))
}

// =============================================================================
// Creation
// =============================================================================

/// The optional image part of a submission, buffered until validation
/// passes.
struct PickedImage {
    filename: String,
    bytes: Vec<u8>,
}

/// Collect the text fields and the optional image part from a multipart
/// body.
async fn collect_form(
    multipart: &mut Multipart,
) -> Result<(PointForm, Option<PickedImage>)> {
    let mut form = PointForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" {
            let filename = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read image part: {e}")))?;
            image = Some(PickedImage {
                filename,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read field {name}: {e}")))?;

        match name.as_str() {
            "name" => form.name = Some(value),
            "email" => form.email = Some(value),
            "phone" => form.phone = Some(value),
            "uf" => form.uf = Some(value),
            "city" => form.city = Some(value),
            "lat" => form.lat = Some(value),
            "lon" => form.lon = Some(value),
            "items" => form.items = Some(value),
            // Unknown fields are ignored rather than rejected.
            _ => {}
        }
    }

    Ok((form, image))
}

/// `POST /points` - register a collection point.
///
/// Validation failures return `400` with every failing field enumerated.
/// The image is only stored after validation passes, and the point plus
/// its item associations are inserted in one transaction.
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<PointResponse>)> {
    let (form, image) = collect_form(&mut multipart).await?;

    let validated = validate_point_form(&form)?;

    // Upload failure aborts the submission; no point row is created.
    let stored_image = match image {
        Some(picked) => Some(
            state
                .uploads()
                .save(&picked.filename, &picked.bytes)
                .await?,
        ),
        None => None,
    };

    let new_point = NewPoint {
        name: validated.name,
        email: validated.email,
        phone: validated.phone,
        image: stored_image,
        uf: validated.uf,
        city: validated.city,
        position: validated.position,
    };

    let point = PointRepository::new(state.pool())
        .create(&new_point, &validated.items)
        .await?;

    tracing::info!(point_id = %point.id, city = %point.city, "registered collection point");

    let items = PointRepository::new(state.pool())
        .get_with_items(point.id)
        .await?
        .items
        .into_iter()
        .map(|item| ItemResponse::from_item(item, &headers, &state))
        .collect();

    let response = detail_response(point, items, &headers, &state);
    Ok((StatusCode::CREATED, Json(response)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_empty_strings_are_omitted() {
        let query = PointListQuery {
            uf: Some(String::new()),
            city: Some(String::new()),
            items: Some(String::new()),
        };
        let filter = parse_filter(&query).unwrap();
        assert!(filter.uf.is_none());
        assert!(filter.city.is_none());
        assert!(filter.items.is_none());
    }

    #[test]
    fn test_parse_filter_full() {
        let query = PointListQuery {
            uf: Some("sp".to_owned()),
            city: Some("São Paulo".to_owned()),
            items: Some("1,2".to_owned()),
        };
        let filter = parse_filter(&query).unwrap();
        assert_eq!(filter.uf.unwrap().as_str(), "SP");
        assert_eq!(filter.city.as_deref(), Some("São Paulo"));
        assert_eq!(
            filter.items.unwrap(),
            vec![ItemId::new(1), ItemId::new(2)]
        );
    }

    #[test]
    fn test_parse_filter_rejects_malformed_items() {
        let query = PointListQuery {
            items: Some("1,abc".to_owned()),
            ..PointListQuery::default()
        };
        let errors = parse_filter(&query).unwrap_err();
        assert_eq!(errors.fields(), vec!["items"]);
    }

    #[test]
    fn test_parse_filter_rejects_long_uf() {
        let query = PointListQuery {
            uf: Some("SPO".to_owned()),
            ..PointListQuery::default()
        };
        let errors = parse_filter(&query).unwrap_err();
        assert_eq!(errors.fields(), vec!["uf"]);
    }
}
