//! Gmail mailer

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::json;
use tracing::warn;

use crate::domain::communication::{
    attachments::ResolvedAttachment,
    emails::Email,
    mailer::{
        submit_with_timeout, Credentials, CredentialsError, CredentialsSupplier, HttpTransport,
        Mailer, Provider, SendError, SendResult, TransportRequest,
    },
};

use super::message;

/// The public Gmail API
pub const GMAIL_BASE_URL: &str = "https://gmail.googleapis.com";

/// Sends email through the Gmail API as the authenticated user
#[derive(Clone, Debug)]
pub struct GmailMailer<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    transport: Arc<T>,
    credentials: C,
    base_url: String,
    timeout: Duration,
}

impl<T, C> GmailMailer<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    /// Creates a Gmail mailer calling the API at `base_url`
    pub fn new(transport: Arc<T>, credentials: C, base_url: &str, timeout: Duration) -> Self {
        Self {
            transport,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn access_token(&self) -> Result<String, SendError> {
        match self.credentials.credentials_for(Provider::Gmail)? {
            Credentials::AccessToken(token) => Ok(token),
            other => Err(CredentialsError::Unsupported {
                provider: Provider::Gmail,
                found: other.kind(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl<T, C> Mailer for GmailMailer<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    fn provider(&self) -> Provider {
        Provider::Gmail
    }

    async fn send(
        &self,
        email: &Email,
        attachments: &[ResolvedAttachment],
    ) -> Result<SendResult, SendError> {
        let built = message::build(email, attachments, true)?;
        let access_token = self.access_token()?;

        let request = TransportRequest::post(
            format!("{}/gmail/v1/users/me/messages/send", self.base_url),
            json!({"raw": URL_SAFE_NO_PAD.encode(built.message.formatted())}),
            self.timeout,
        )
        .bearer(&access_token);

        let response = submit_with_timeout(self.transport.as_ref(), request).await?;

        if !response.is_success() {
            let err = SendError::from_http_status(response.status, response.body);
            warn!(status = response.status, error = %err, "Gmail did not accept the email");

            return Err(err);
        }

        let raw_response = response
            .json()
            .filter(|body| body.get("id").and_then(|id| id.as_str()).is_some())
            .ok_or_else(|| {
                SendError::rejected("Gmail response has no message id").with_raw(&response.body)
            })?;

        Ok(SendResult {
            provider: Provider::Gmail,
            provider_message_id: raw_response["id"].as_str().unwrap_or_default().to_string(),
            raw_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use testresult::TestResult;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        domain::communication::{
            attachments::{resolve, Attachment},
            emails::{Body, Content, Mailbox},
            mailer::StaticCredentials,
        },
        infrastructure::email::ReqwestTransport,
    };

    use super::*;

    fn email() -> TestResult<Email> {
        Ok(Email::new(
            Mailbox::parse(Some("Alice"), "alice@gmail.com")?,
            vec![Mailbox::parse(Some("Bob"), "bob@example.com")?],
            "Hello world",
            Content::Body(Body::text("Hi Bob")),
        )?
        .with_bcc(vec![Mailbox::parse(None, "audit@example.com")?]))
    }

    fn mailer(
        server: &MockServer,
        credentials: Credentials,
    ) -> GmailMailer<ReqwestTransport, StaticCredentials> {
        GmailMailer::new(
            Arc::new(ReqwestTransport::new()),
            StaticCredentials::new(credentials),
            &server.uri(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_send_posts_raw_message() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/gmail/v1/users/me/messages/send"))
            .and(header("Authorization", "Bearer ya29.token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "18c1", "threadId": "18c1", "labelIds": ["SENT"]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let attachments = vec![resolve(&Attachment::new("report.csv", "a,b\n1,2\n", None))?];

        let result = mailer(&server, Credentials::AccessToken("ya29.token".to_string()))
            .send(&email()?, &attachments)
            .await?;

        assert_eq!(result.provider, Provider::Gmail);
        assert_eq!(result.provider_message_id, "18c1");
        assert_eq!(result.raw_response["labelIds"][0], "SENT");

        let requests = server.received_requests().await.unwrap_or_default();
        let body: Value = serde_json::from_slice(&requests[0].body)?;
        let raw = body["raw"].as_str().unwrap_or_default();
        let message = String::from_utf8(URL_SAFE_NO_PAD.decode(raw)?)?;

        assert!(message.contains("Subject: Hello world"));
        assert!(message.contains("Bcc: audit@example.com"));
        assert!(message.contains("Hi Bob"));
        assert!(message.contains("text/csv"));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_alternative_body() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/gmail/v1/users/me/messages/send"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "18c2"})))
            .expect(1)
            .mount(&server)
            .await;

        let email = email()?.with_rendered(
            "Hello world".to_string(),
            Body::alternative("<p>Hi Bob</p>", "Hi Bob"),
        );

        mailer(&server, Credentials::AccessToken("ya29.token".to_string()))
            .send(&email, &[])
            .await?;

        let requests = server.received_requests().await.unwrap_or_default();
        let body: Value = serde_json::from_slice(&requests[0].body)?;
        let raw = body["raw"].as_str().unwrap_or_default();
        let message = String::from_utf8(URL_SAFE_NO_PAD.decode(raw)?)?;

        assert!(message.contains("multipart/alternative"));
        assert!(message.contains("text/plain"));
        assert!(message.contains("<p>Hi Bob</p>"));

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_token_is_an_auth_error() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": 401, "status": "UNAUTHENTICATED"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = mailer(&server, Credentials::AccessToken("expired".to_string()))
            .send(&email()?, &[])
            .await;

        match result {
            Err(err @ SendError::Auth { .. }) => {
                assert!(err.raw_payload().unwrap_or_default().contains("UNAUTHENTICATED"))
            }
            other => panic!("expected an auth error, got {other:?}"),
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_response_without_id_is_rejected() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"threadId": "1"})))
            .mount(&server)
            .await;

        let result = mailer(&server, Credentials::AccessToken("ya29.token".to_string()))
            .send(&email()?, &[])
            .await;

        assert!(matches!(result, Err(SendError::Rejected { raw: Some(_), .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_api_key_is_unsupported() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = mailer(&server, Credentials::ApiKey("SG.key".to_string()))
            .send(&email()?, &[])
            .await;

        assert!(matches!(result, Err(SendError::Auth { .. })));

        Ok(())
    }
}
