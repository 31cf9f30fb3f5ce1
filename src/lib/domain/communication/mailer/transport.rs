//! HTTP transport used by API-based providers

use std::{collections::HashMap, fmt, time::Duration};

use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use serde_json::Value;
use thiserror::Error;

/// The default time allowed for a provider call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur before a provider responds
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportFailure {
    /// The provider did not respond in time
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider could not be reached
    #[error("connection failed: {0}")]
    Connection(String),
}

/// A JSON `POST` to a provider API
#[derive(Clone, PartialEq)]
pub struct TransportRequest {
    /// The full URL
    pub url: String,

    /// Extra request headers
    pub headers: Vec<(String, String)>,

    /// The JSON body
    pub body: Value,

    /// How long to wait for the response
    pub timeout: Duration,
}

impl TransportRequest {
    /// Creates a JSON `POST` request
    pub fn post(url: impl Into<String>, body: Value, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
            timeout,
        }
    }

    /// Adds a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds an `Authorization: Bearer` header
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {token}"))
    }
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "********")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect::<Vec<_>>();

        f.debug_struct("TransportRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// A provider API response, whatever its status
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
    /// The HTTP status code
    pub status: u16,

    /// Response headers, keyed by lowercase name
    pub headers: HashMap<String, String>,

    /// The raw response body
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Gets a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parses the body as JSON, giving [`Value::Null`] for an empty body and
    /// [`None`] for anything that isn't JSON
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return Some(Value::Null);
        }

        serde_json::from_str(&self.body).ok()
    }
}

/// Sends JSON requests to provider APIs
#[async_trait]
pub trait HttpTransport: Clone + Send + Sync + 'static {
    /// Submits a request, returning the response whatever its status.
    ///
    /// # Returns
    /// - [`Ok`] with the [`TransportResponse`] when the provider responded.
    /// - [`Err`] with a [`TransportFailure`] when it could not be reached or
    ///   did not respond within the request's timeout.
    async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure>;
}

#[cfg(test)]
mock! {
    pub HttpTransport {}

    impl Clone for HttpTransport {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl HttpTransport for HttpTransport {
        async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure>;
    }
}

/// Submits a request, failing with [`TransportFailure::Timeout`] once the
/// request's timeout has passed, whatever the transport does
pub async fn submit_with_timeout<T>(
    transport: &T,
    request: TransportRequest,
) -> Result<TransportResponse, TransportFailure>
where
    T: HttpTransport,
{
    let timeout = request.timeout;

    tokio::time::timeout(timeout, transport.submit(request))
        .await
        .map_err(|_| TransportFailure::Timeout(timeout))?
}
