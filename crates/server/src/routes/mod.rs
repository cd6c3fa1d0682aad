//! HTTP route handlers for the EcoPonto API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (verifies database)
//!
//! # Item catalog
//! GET  /items              - List collectible item categories
//!
//! # Collection points
//! GET  /points             - List points filtered by uf/city/items
//! GET  /points/{id}        - Point detail with expanded items
//! POST /points             - Register a point (multipart, optional image)
//!
//! # Static
//! GET  /uploads/*          - Uploaded photos and item icons (ServeDir)
//! ```

pub mod items;
pub mod points;

use axum::{
    Router,
    http::{HeaderMap, header},
    routing::get,
};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Create the point routes router.
pub fn point_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(points::index).post(points::create))
        .route("/{id}", get(points::show))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(items::index))
        .nest("/points", point_routes())
}

/// Build the absolute URL for a stored image.
///
/// Uses the serving host at request time, like the original clients
/// expect, falling back to the configured base URL when the request
/// carries no `Host` header.
pub(crate) fn image_url(headers: &HeaderMap, config: &ServerConfig, filename: &str) -> String {
    let base = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| format!("http://{host}"))
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| format!("http://{}", config.socket_addr()));

    format!("{}/uploads/{filename}", base.trim_end_matches('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::path::PathBuf;

    fn test_config(base_url: Option<&str>) -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3333,
            base_url: base_url.map(str::to_owned),
            upload_dir: PathBuf::from("uploads/points"),
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_image_url_uses_request_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "api.example.com:3333".parse().unwrap());

        let url = image_url(&headers, &test_config(None), "lamp.svg");
        assert_eq!(url, "http://api.example.com:3333/uploads/lamp.svg");
    }

    #[test]
    fn test_image_url_falls_back_to_config() {
        let headers = HeaderMap::new();
        let url = image_url(
            &headers,
            &test_config(Some("http://ecoponto.example/")),
            "lamp.svg",
        );
        assert_eq!(url, "http://ecoponto.example/uploads/lamp.svg");
    }

    #[test]
    fn test_image_url_last_resort_is_bind_address() {
        let headers = HeaderMap::new();
        let url = image_url(&headers, &test_config(None), "lamp.svg");
        assert_eq!(url, "http://127.0.0.1:3333/uploads/lamp.svg");
    }
}
