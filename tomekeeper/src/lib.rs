//! Minimal Tomekeeper character-service client.
//!
//! This crate provides the async boundary between the character builder
//! and the remote character record:
//! - Option-list retrieval for pending choices
//! - Per-choice selection commits
//! - Endpoint normalization for stored resource references

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Versioned prefix the service embeds in stored endpoint references.
const API_PREFIX: &str = "/api/v2";

/// Errors that can occur when talking to the service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A nested reference inside a raw option record, e.g. the skill a
/// proficiency option grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

/// An option record as the service returns it.
///
/// Older endpoints return flat `{id, name}` records; proficiency
/// endpoints nest the payload under `skill` or `proficiency_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOption {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub skill: Option<NamedRef>,
    pub proficiency_type: Option<NamedRef>,
}

/// Envelope for option-list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    pub data: Vec<RawOption>,
}

/// Async boundary to the character service.
///
/// The engine core only ever talks to the service through this trait,
/// so tests can substitute a scripted client.
#[async_trait]
pub trait ChoiceClient: Send + Sync {
    /// Retrieve the option list behind a stored endpoint reference.
    async fn fetch_options(&self, endpoint: &str) -> Result<Vec<RawOption>, Error>;

    /// Commit the final selection for one pending choice.
    async fn commit_choice(&self, choice_id: &str, selected: &[String]) -> Result<(), Error>;
}

/// Strip the versioned API prefix from a stored endpoint reference.
///
/// The service stores `options_endpoint` values like
/// `/api/v2/languages/?exclude=common`; the configured base URL already
/// carries the prefix, so it must not appear twice.
pub fn normalize_endpoint(endpoint: &str) -> &str {
    endpoint.strip_prefix(API_PREFIX).unwrap_or(endpoint)
}

/// Tomekeeper API client.
#[derive(Clone)]
pub struct TomekeeperClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TomekeeperClient {
    /// Create a new client for the given base URL and access token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .connect_timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Create a client from the TOMEKEEPER_URL and TOMEKEEPER_TOKEN
    /// environment variables.
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("TOMEKEEPER_URL")
            .map_err(|_| Error::Config("TOMEKEEPER_URL not set".to_string()))?;
        let token = std::env::var("TOMEKEEPER_TOKEN")
            .map_err(|_| Error::Config("TOMEKEEPER_TOKEN not set".to_string()))?;
        Ok(Self::new(base_url, token))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .map_err(|e| Error::Config(format!("Invalid token: {e}")))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl ChoiceClient for TomekeeperClient {
    async fn fetch_options(&self, endpoint: &str) -> Result<Vec<RawOption>, Error> {
        let url = format!("{}{}", self.base_url, normalize_endpoint(endpoint));
        let headers = self.build_headers()?;

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let envelope: FetchResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(envelope.data)
    }

    async fn commit_choice(&self, choice_id: &str, selected: &[String]) -> Result<(), Error> {
        let url = format!("{}/characters/choices/{choice_id}/", self.base_url);
        let headers = self.build_headers()?;
        let body = serde_json::json!({ "selected": selected });

        let response = self
            .client
            .put(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        Ok(())
    }
}
