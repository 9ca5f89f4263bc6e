//! Shared HTTP client for the Opentube API.
//!
//! Provides a minimal client with optional Bearer auth, generic GET/DELETE and
//! multipart helpers, and domain methods (upload, list, get, delete). Every
//! request passes through a circuit breaker: transport failures trip it, and
//! while it is open requests fail fast with [`ClientError::CircuitOpen`]
//! instead of piling onto an unreachable backend.

pub mod api;

use opentube_core::breaker::{CircuitBreaker, CircuitBreakerConfig};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Errors surfaced by the API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The circuit breaker is open; the request was not sent.
    #[error("circuit open: requests to the API are suspended")]
    CircuitOpen,

    /// Connection, timeout, or body decoding failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid file path: {0}")]
    InvalidPath(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// HTTP client for the Opentube API with optional Bearer auth.
///
/// Cloning is cheap; clones share the underlying connection pool and the
/// circuit breaker, so one backend gets one breaker.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    breaker: Arc<Mutex<CircuitBreaker>>,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self, ClientError> {
        Self::with_breaker(base_url, token, CircuitBreakerConfig::default())
    }

    /// Build a client with a custom breaker configuration.
    pub fn with_breaker(
        base_url: String,
        token: Option<String>,
        breaker: CircuitBreakerConfig,
    ) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            breaker: Arc::new(Mutex::new(CircuitBreaker::new(breaker))),
        })
    }

    /// Create a client from environment: OPENTUBE_API_URL (or API_URL) and
    /// OPENTUBE_API_TOKEN (or API_TOKEN). The token is optional; the read
    /// routes are public.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("OPENTUBE_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let token = std::env::var("OPENTUBE_API_TOKEN")
            .or_else(|_| std::env::var("API_TOKEN"))
            .ok();

        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    fn ensure_allowed(&self) -> Result<(), ClientError> {
        if self.breaker.lock().unwrap().should_allow(Instant::now()) {
            Ok(())
        } else {
            Err(ClientError::CircuitOpen)
        }
    }

    /// Send a request through the breaker. Only transport failures count
    /// against it; an HTTP error status is still an answer from the backend.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        self.ensure_allowed()?;

        match request.send().await {
            Ok(response) => {
                self.breaker.lock().unwrap().record_success();
                Ok(response)
            }
            Err(err) => {
                self.breaker.lock().unwrap().record_failure(Instant::now());
                Err(ClientError::Http(err))
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        let mut request = self.apply_auth(self.client.get(&url));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.post(&url).multipart(form));

        let response = self.execute(request).await?;
        Self::read_json(response).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let url = self.build_url(path);
        let request = self.apply_auth(self.client.delete(&url));

        let response = self.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

// Re-export the types callers need alongside the client.
pub use opentube_core::breaker::CircuitBreakerConfig as BreakerConfig;
pub use opentube_core::models::{AssetRecord, Visibility};
