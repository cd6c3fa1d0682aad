//! Client configuration.

use std::time::Duration;

/// Endpoints and timeouts for the client library.
///
/// The geography services default to the public Brazilian directories the
/// original deployment used; tests and other deployments point these at
/// their own hosts.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the EcoPonto REST API.
    pub api_base_url: String,
    /// Base URL of the state/city directory (IBGE localidades API shape).
    pub ibge_base_url: String,
    /// Base URL of the postal-code resolver (ViaCEP shape).
    pub viacep_base_url: String,
    /// Per-request timeout for every HTTP call.
    pub http_timeout: Duration,
    /// How long directory responses stay cached.
    pub geo_cache_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3333".to_owned(),
            ibge_base_url: "https://servicodados.ibge.gov.br/api/v1".to_owned(),
            viacep_base_url: "https://viacep.com.br".to_owned(),
            http_timeout: Duration::from_secs(10),
            geo_cache_ttl: Duration::from_secs(60 * 60),
        }
    }
}
