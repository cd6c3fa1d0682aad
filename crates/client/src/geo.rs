//! GeoLookup client: state/city directory and postal-code resolver.
//!
//! Wraps two external read-only services: an IBGE-shaped localidades
//! directory (states, cities per state) and a ViaCEP-shaped postal-code
//! resolver. Both are treated as available-but-unreliable; every call is
//! fallible and callers degrade to manual entry on failure.
//!
//! Directory responses are semi-static, so they are cached with a TTL.

use std::sync::Arc;

use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;

use ecoponto_core::Uf;

use crate::config::ClientConfig;

/// Errors that can occur when querying the geography services.
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("geography service error: status {status}")]
    Api { status: u16 },

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Postal code is not eight digits.
    #[error("postal code must have exactly eight digits")]
    InvalidPostalCode,

    /// Postal code resolved to nothing.
    #[error("postal code not found: {0}")]
    PostalCodeNotFound(String),
}

/// One state entry from the directory.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UfEntry {
    /// Two-letter state code.
    pub sigla: Uf,
    /// Full state name.
    pub nome: String,
}

/// The state+city pair a postal code resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    pub uf: Uf,
    pub city: String,
}

/// Read-only geography directory seam.
///
/// Implemented by [`GeoClient`] for the real services and by test doubles
/// in reducer/pipeline tests.
#[allow(async_fn_in_trait)]
pub trait GeoDirectory {
    /// Full state list.
    async fn states(&self) -> Result<Vec<UfEntry>, GeoError>;

    /// City names for one state.
    async fn cities(&self, uf: Uf) -> Result<Vec<String>, GeoError>;

    /// Resolve a postal code to its state and city.
    async fn postal_lookup(&self, cep: &str) -> Result<PostalAddress, GeoError>;
}

/// HTTP client for the geography services, with TTL caching of the
/// directory responses.
#[derive(Clone)]
pub struct GeoClient {
    client: reqwest::Client,
    ibge_base_url: String,
    viacep_base_url: String,
    states_cache: Cache<(), Arc<Vec<UfEntry>>>,
    cities_cache: Cache<Uf, Arc<Vec<String>>>,
}

impl GeoClient {
    /// Create a new geography client.
    ///
    /// # Errors
    ///
    /// Returns `GeoError::Http` if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            ibge_base_url: config.ibge_base_url.trim_end_matches('/').to_owned(),
            viacep_base_url: config.viacep_base_url.trim_end_matches('/').to_owned(),
            states_cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(config.geo_cache_ttl)
                .build(),
            cities_cache: Cache::builder()
                .max_capacity(64)
                .time_to_live(config.geo_cache_ttl)
                .build(),
        })
    }

    async fn fetch_states(&self) -> Result<Vec<UfEntry>, GeoError> {
        let url = format!("{}/localidades/estados?orderBy=nome", self.ibge_base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Api {
                status: status.as_u16(),
            });
        }

        response
            .json::<Vec<UfEntry>>()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))
    }

    async fn fetch_cities(&self, uf: Uf) -> Result<Vec<String>, GeoError> {
        #[derive(Deserialize)]
        struct CityEntry {
            nome: String,
        }

        let url = format!("{}/localidades/estados/{uf}/municipios", self.ibge_base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Api {
                status: status.as_u16(),
            });
        }

        let entries = response
            .json::<Vec<CityEntry>>()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))?;

        Ok(entries.into_iter().map(|c| c.nome).collect())
    }
}

impl GeoDirectory for GeoClient {
    async fn states(&self) -> Result<Vec<UfEntry>, GeoError> {
        if let Some(cached) = self.states_cache.get(&()).await {
            return Ok(cached.as_ref().clone());
        }

        let states = self.fetch_states().await?;
        self.states_cache
            .insert((), Arc::new(states.clone()))
            .await;
        Ok(states)
    }

    async fn cities(&self, uf: Uf) -> Result<Vec<String>, GeoError> {
        if let Some(cached) = self.cities_cache.get(&uf).await {
            return Ok(cached.as_ref().clone());
        }

        let cities = self.fetch_cities(uf).await?;
        self.cities_cache
            .insert(uf, Arc::new(cities.clone()))
            .await;
        Ok(cities)
    }

    async fn postal_lookup(&self, cep: &str) -> Result<PostalAddress, GeoError> {
        #[derive(Deserialize)]
        struct ViaCepResponse {
            #[serde(default)]
            erro: bool,
            uf: Option<String>,
            localidade: Option<String>,
        }

        let cep = normalize_cep(cep)?;
        let url = format!("{}/ws/{cep}/json/", self.viacep_base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Api {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<ViaCepResponse>()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))?;

        if body.erro {
            return Err(GeoError::PostalCodeNotFound(cep));
        }

        let (Some(uf_raw), Some(city)) = (body.uf, body.localidade) else {
            return Err(GeoError::Parse("postal response missing uf/localidade".to_owned()));
        };

        let uf = Uf::parse(&uf_raw)
            .map_err(|e| GeoError::Parse(format!("postal response uf invalid: {e}")))?;

        Ok(PostalAddress { uf, city })
    }
}

/// Strip separators from a postal code and require exactly eight digits.
fn normalize_cep(cep: &str) -> Result<String, GeoError> {
    let digits: String = cep.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 8 {
        Ok(digits)
    } else {
        Err(GeoError::InvalidPostalCode)
    }
}
