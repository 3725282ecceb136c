//! Hosted table store client.
//!
//! Talks to the PostgREST tables behind the site's hosted database. The
//! review and visitor clients are thin typed layers over this one.
//!
//! ### Protocol
//!
//! - **Endpoint**: `{base_url}/rest/v1/{table}`
//! - **Authentication**: anon key in both the `apikey` and
//!   `Authorization: Bearer` headers.
//! - **Filters**: PostgREST query operators (`approved=eq.true`, `id=eq.7`,
//!   `order=created_at.desc`).
//! - **Writes** ask for `Prefer: return=representation` so the stored rows
//!   come back in the response body.

pub mod error;

pub use error::StoreError;

use std::sync::Arc;
use std::time::{Duration, Instant};

use kiteshell_core::AppConfig;
use reqwest::{Method, StatusCode, header};
use serde::de::DeserializeOwned;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const REST_PATH: &str = "rest/v1";

/// Store client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://<project>.supabase.co`.
    pub base_url: String,
    /// Anonymous API key.
    pub api_key: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    pub user_agent: String,
}

impl StoreConfig {
    /// Build from the application config.
    ///
    /// Fails when the store URL or key is not configured.
    pub fn from_app(app: &AppConfig) -> Result<Self, StoreError> {
        let (base_url, api_key) = app
            .require_supabase()
            .map_err(|e| StoreError::MissingConfig(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: app.user_agent.clone(),
        })
    }
}

/// Authenticated PostgREST client shared by the table clients.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    config: StoreConfig,
}

impl StoreClient {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        if config.api_key.is_empty() {
            return Err(StoreError::MissingConfig("supabase_key is empty".into()));
        }
        if config.base_url.is_empty() {
            return Err(StoreError::MissingConfig("supabase_url is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| StoreError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn from_app(app: &AppConfig) -> Result<Self, StoreError> {
        Self::new(StoreConfig::from_app(app)?)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Build an authenticated request against a table endpoint.
    pub(crate) fn request(&self, table: &str, method: Method, query: &[(&str, String)]) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.config.base_url, REST_PATH, table);

        self.http
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(header::ACCEPT, "application/json")
            .query(query)
    }

    /// Send a request and decode its JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self, builder: reqwest::RequestBuilder,
    ) -> Result<T, StoreError> {
        let start = Instant::now();
        let response = builder.send().await?;

        let status = response.status();
        tracing::debug!(%status, elapsed_ms = start.elapsed().as_millis() as u64, "store response");
        check_status(status)?;

        let bytes = response.bytes().await.map_err(|e| StoreError::Network(Arc::new(e)))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Parse(e.to_string()))
    }
}

/// `id=eq.{id}` filter.
pub(crate) fn id_filter(id: i64) -> (&'static str, String) {
    ("id", format!("eq.{id}"))
}

fn check_status(status: StatusCode) -> Result<(), StoreError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::AuthError);
    }
    if status.is_client_error() || status.is_server_error() {
        return Err(StoreError::HttpError { status: status.as_u16() });
    }
    Ok(())
}
