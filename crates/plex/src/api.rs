//! REST client for the media server HTTP endpoints.
//!
//! Every request carries the access token as the `X-Plex-Token` query
//! parameter, asks for JSON, and is bounded by the configured timeout.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;

use crate::library::{ItemsResponse, LibrarySection, SectionsResponse};
use crate::sessions::{PlaybackSession, SessionsResponse};

/// Default bound on every outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for one media server.
#[derive(Debug, Clone)]
pub struct PlexConfig {
    /// Base URL, e.g. `https://192.168.1.10:32400`.
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
    /// Accept self-signed certificates (typical for LAN servers).
    pub accept_invalid_certs: bool,
}

/// Errors from the media server REST layer.
#[derive(Debug, thiserror::Error)]
pub enum PlexError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned an unexpected status code.
    #[error("Media server error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// No server URL / token has been configured.
    #[error("Media server is not configured")]
    NotConfigured,
}

/// HTTP client for a single media server.
pub struct PlexApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl PlexApi {
    /// Create a client for the configured server.
    pub fn new(config: &PlexConfig) -> Result<Self, PlexError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Fetch the live session table (`GET /status/sessions`).
    pub async fn sessions(&self) -> Result<Vec<PlaybackSession>, PlexError> {
        let response = self.get("/status/sessions").send().await?;
        let parsed: SessionsResponse = Self::parse_response(response).await?;
        Ok(parsed.into_sessions())
    }

    /// Terminate a session, showing `reason` to the viewer.
    ///
    /// Only a `200 OK` counts as success.
    pub async fn terminate_session(&self, session_id: &str, reason: &str) -> Result<(), PlexError> {
        let request = self.terminate_request(session_id, reason)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PlexError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// List library sections (`GET /library/sections`).
    pub async fn library_sections(&self) -> Result<Vec<LibrarySection>, PlexError> {
        let response = self.get("/library/sections").send().await?;
        let parsed: SectionsResponse = Self::parse_response(response).await?;
        Ok(parsed.into_sections())
    }

    /// Whether the section with `section_key` holds an item titled `title`.
    pub async fn section_contains(&self, section_key: &str, title: &str) -> Result<bool, PlexError> {
        let response = self
            .get(&format!("/library/sections/{section_key}/all"))
            .query(&[("title", title)])
            .send()
            .await?;
        let parsed: ItemsResponse = Self::parse_response(response).await?;
        Ok(parsed.contains_title(title))
    }

    /// Find the first section holding `title`.
    ///
    /// Sections that fail to answer are skipped.
    pub async fn library_for_title(&self, title: &str) -> Result<Option<String>, PlexError> {
        for section in self.library_sections().await? {
            match self.section_contains(&section.key, title).await {
                Ok(true) => return Ok(Some(section.title)),
                Ok(false) => {}
                Err(e) => {
                    tracing::debug!(section = %section.title, error = %e, "Section search failed");
                }
            }
        }
        Ok(None)
    }

    /// Build the termination request without sending it.
    pub fn terminate_request(&self, session_id: &str, reason: &str) -> Result<reqwest::Request, PlexError> {
        Ok(self
            .get("/status/sessions/terminate")
            .query(&[("sessionId", session_id), ("reason", reason)])
            .build()?)
    }

    // ---- private helpers ----

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{path}", self.base_url))
            .query(&[("X-Plex-Token", self.token.as_str())])
    }

    /// Ensure the response has a success status code.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, PlexError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PlexError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PlexError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
