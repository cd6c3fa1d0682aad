//! Typed client for the EcoPonto REST API.
//!
//! Covers the item catalog, point browsing, and the multipart submission
//! assembled by the registration workflow.

use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

use ecoponto_core::{Coordinates, Email, ItemId, Phone, PointId, Uf};

use crate::config::ClientConfig;

/// Errors that can occur when calling the EcoPonto API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),
}

/// One catalog item as served by `GET /items`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    pub image_url: String,
}

/// One point as served by `GET /points`.
#[derive(Debug, Clone, Deserialize)]
pub struct PointSummary {
    pub id: PointId,
    pub name: String,
    pub image_url: Option<String>,
    pub uf: Uf,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

/// One point with expanded items, as served by `GET /points/{id}` and
/// `POST /points`.
#[derive(Debug, Clone, Deserialize)]
pub struct PointDetail {
    pub id: PointId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub uf: Uf,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub items: Vec<CatalogItem>,
}

/// Browse criteria for `GET /points`. Any subset may be set.
#[derive(Debug, Clone, Default)]
pub struct BrowseFilter {
    pub uf: Option<Uf>,
    pub city: Option<String>,
    pub items: Vec<ItemId>,
}

/// An image chosen by the user, held client-side until submission.
#[derive(Clone)]
pub struct PickedImage {
    /// Original filename reported by the picker.
    pub filename: String,
    /// MIME type, when the picker reports one.
    pub content_type: Option<String>,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PickedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickedImage")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// A validated submission ready to be posted as multipart form data.
#[derive(Debug, Clone)]
pub struct PointSubmission {
    pub name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub uf: Uf,
    pub city: String,
    pub position: Coordinates,
    pub items: Vec<ItemId>,
    pub image: Option<PickedImage>,
}

/// HTTP client for the EcoPonto REST API.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch the item catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn list_items(&self) -> Result<Vec<CatalogItem>, ApiError> {
        let url = format!("{}/items", self.base_url);
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    /// List points matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is malformed.
    pub async fn list_points(&self, filter: &BrowseFilter) -> Result<Vec<PointSummary>, ApiError> {
        let url = format!("{}/points", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&browse_query(filter))
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch one point with its items expanded.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails, including a 404 for an
    /// unknown id.
    pub async fn get_point(&self, id: PointId) -> Result<PointDetail, ApiError> {
        let url = format!("{}/points/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    /// Submit a registration as one multipart POST.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with the server's aggregated field errors
    /// on `400`, or `ApiError::Http` on transport failure. The caller
    /// never retries automatically.
    pub async fn create_point(&self, submission: &PointSubmission) -> Result<PointDetail, ApiError> {
        let url = format!("{}/points", self.base_url);
        let form = submission_form(submission);

        let response = self.client.post(&url).multipart(form).send().await?;
        decode(response).await
    }
}

/// Decode a response, mapping non-success statuses to `ApiError::Api`
/// with the body preserved for display.
async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Build the query pairs for a browse request, omitting unset criteria.
fn browse_query(filter: &BrowseFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(uf) = filter.uf {
        query.push(("uf", uf.as_str().to_owned()));
    }
    if let Some(city) = &filter.city {
        query.push(("city", city.clone()));
    }
    if !filter.items.is_empty() {
        query.push(("items", items_field(&filter.items)));
    }
    query
}

/// Serialize selected item ids as the comma-delimited wire format.
fn items_field(items: &[ItemId]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Assemble the multipart form for a submission.
fn submission_form(submission: &PointSubmission) -> multipart::Form {
    let mut form = multipart::Form::new()
        .text("name", submission.name.clone())
        .text("email", submission.email.as_str().to_owned())
        .text("uf", submission.uf.as_str().to_owned())
        .text("city", submission.city.clone())
        .text("lat", submission.position.lat.to_string())
        .text("lon", submission.position.lon.to_string())
        .text("items", items_field(&submission.items));

    if let Some(phone) = &submission.phone {
        form = form.text("phone", phone.as_str().to_owned());
    }

    if let Some(image) = &submission.image {
        let part = multipart::Part::bytes(image.bytes.clone()).file_name(image.filename.clone());
        let part = match &image.content_type {
            Some(content_type) => part.mime_str(content_type).unwrap_or_else(|_| {
                tracing::warn!(%content_type, "ignoring unparseable image content type");
                multipart::Part::bytes(image.bytes.clone()).file_name(image.filename.clone())
            }),
            None => part,
        };
        form = form.part("image", part);
    }

    form
}
