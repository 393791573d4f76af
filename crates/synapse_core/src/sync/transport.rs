//! HTTP transport seam for the remote endpoint.

use super::SyncError;
use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const USER_AGENT: &str = concat!("synapse/", env!("CARGO_PKG_VERSION"));

/// Raw HTTP outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON body and returns the raw response.
///
/// Implementations map connection-level failures to `SyncError::Network`.
pub trait RemoteTransport {
    fn post_json(&self, url: &str, body: String) -> Result<TransportResponse, SyncError>;
}

/// Blocking `reqwest` transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| SyncError::Network(format!("failed to build http client: {err}")))?;
        Ok(Self { client })
    }
}

impl RemoteTransport for HttpTransport {
    fn post_json(&self, url: &str, body: String) -> Result<TransportResponse, SyncError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| SyncError::Network(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| SyncError::Network(format!("failed to read response body: {err}")))?;
        debug!(
            "event=sync_http module=sync status_code={} body_len={}",
            status,
            body.len()
        );
        Ok(TransportResponse { status, body })
    }
}
