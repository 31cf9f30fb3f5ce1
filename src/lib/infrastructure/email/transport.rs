//! reqwest-backed HTTP transport

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::communication::mailer::{
    HttpTransport, TransportFailure, TransportRequest, TransportResponse,
};

/// Sends provider requests with a shared [`reqwest::Client`]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with its own connection pool
    pub fn new() -> Self {
        Self::default()
    }
}

fn failure(err: reqwest::Error, timeout: Duration) -> TransportFailure {
    debug!("reqwest::Error: {:?}", err);

    if err.is_timeout() {
        TransportFailure::Timeout(timeout)
    } else {
        TransportFailure::Connection(err.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn submit(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure> {
        let timeout = request.timeout;

        let mut builder = self
            .client
            .post(&request.url)
            .timeout(timeout)
            .json(&request.body);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|err| failure(err, timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        let body = response.text().await.map_err(|err| failure(err, timeout))?;

        debug!(url = request.url, status, "provider responded");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    #[tokio::test]
    async fn test_submit_returns_any_status() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("Authorization", "Bearer token"))
            .and(body_json(json!({"hello": "world"})))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("X-Request-Id", "abc")
                    .set_body_string(r#"{"error":"bad"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = TransportRequest::post(
            format!("{}/send", server.uri()),
            json!({"hello": "world"}),
            Duration::from_secs(5),
        )
        .bearer("token");

        let response = ReqwestTransport::new().submit(request).await?;

        assert_eq!(response.status, 400);
        assert_eq!(response.header("x-request-id"), Some("abc"));
        assert_eq!(response.body, r#"{"error":"bad"}"#);

        Ok(())
    }

    #[tokio::test]
    async fn test_slow_response_times_out() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let request = TransportRequest::post(server.uri(), json!({}), Duration::from_millis(100));

        let result = ReqwestTransport::new().submit(request).await;

        assert_eq!(
            result,
            Err(TransportFailure::Timeout(Duration::from_millis(100)))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_connection_failure() -> TestResult {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let address = listener.local_addr()?;
        drop(listener);

        let request = TransportRequest::post(
            format!("http://{address}/send"),
            json!({}),
            Duration::from_secs(5),
        );

        let result = ReqwestTransport::new().submit(request).await;

        assert!(matches!(result, Err(TransportFailure::Connection(_))));

        Ok(())
    }
}
