//! SendGrid mailer

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::domain::communication::{
    attachments::ResolvedAttachment,
    emails::{Email, Mailbox},
    mailer::{
        rendered_body, submit_with_timeout, Credentials, CredentialsError, CredentialsSupplier,
        HttpTransport, Mailer, Provider, SendError, SendResult, TransportRequest,
    },
};

/// The public SendGrid API
pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

/// Sends email through SendGrid's v3 mail send API
#[derive(Clone, Debug)]
pub struct SendGridMailer<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    transport: Arc<T>,
    credentials: C,
    base_url: String,
    timeout: Duration,
}

impl<T, C> SendGridMailer<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    /// Creates a SendGrid mailer calling the API at `base_url`
    pub fn new(transport: Arc<T>, credentials: C, base_url: &str, timeout: Duration) -> Self {
        Self {
            transport,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn api_key(&self) -> Result<String, SendError> {
        match self.credentials.credentials_for(Provider::SendGrid)? {
            Credentials::ApiKey(key) => Ok(key),
            other => Err(CredentialsError::Unsupported {
                provider: Provider::SendGrid,
                found: other.kind(),
            }
            .into()),
        }
    }
}

fn address(mailbox: &Mailbox) -> Value {
    let mut address = Map::new();

    address.insert("email".into(), mailbox.address().as_str().into());

    if let Some(name) = mailbox.name() {
        address.insert("name".into(), name.into());
    }

    Value::Object(address)
}

fn addresses(mailboxes: &[Mailbox]) -> Value {
    mailboxes.iter().map(address).collect()
}

/// Builds the mail send request body
pub fn payload(email: &Email, attachments: &[ResolvedAttachment]) -> Result<Value, SendError> {
    let body = rendered_body(email)?;

    let mut personalization = Map::new();
    personalization.insert("to".into(), addresses(email.to()));

    if !email.cc().is_empty() {
        personalization.insert("cc".into(), addresses(email.cc()));
    }

    if !email.bcc().is_empty() {
        personalization.insert("bcc".into(), addresses(email.bcc()));
    }

    let mut payload = json!({
        "personalizations": [personalization],
        "from": address(email.from()),
        "subject": email.subject(),
        "content": body
            .parts()
            .into_iter()
            .map(|(kind, value)| json!({"type": kind.mime_type(), "value": value}))
            .collect::<Vec<_>>(),
    });

    if !attachments.is_empty() {
        payload["attachments"] = attachments
            .iter()
            .map(|attachment| {
                json!({
                    "content": attachment.encoded_content,
                    "filename": attachment.filename,
                    "type": attachment.mime_type,
                    "disposition": "attachment",
                })
            })
            .collect();
    }

    Ok(payload)
}

#[async_trait]
impl<T, C> Mailer for SendGridMailer<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    fn provider(&self) -> Provider {
        Provider::SendGrid
    }

    async fn send(
        &self,
        email: &Email,
        attachments: &[ResolvedAttachment],
    ) -> Result<SendResult, SendError> {
        let payload = payload(email, attachments)?;
        let api_key = self.api_key()?;

        let request = TransportRequest::post(
            format!("{}/v3/mail/send", self.base_url),
            payload,
            self.timeout,
        )
        .bearer(&api_key);

        let response = submit_with_timeout(self.transport.as_ref(), request).await?;

        if !response.is_success() {
            let err = SendError::from_http_status(response.status, response.body);
            warn!(status = response.status, error = %err, "SendGrid did not accept the email");

            return Err(err);
        }

        let message_id = response.header("x-message-id").map(String::from);

        let (provider_message_id, raw_response) = match (message_id, response.json()) {
            (Some(id), Some(raw_response)) => (id, raw_response),
            (Some(id), None) => {
                debug!(status = response.status, "SendGrid accepted the email with a non-JSON body");
                (id, Value::String(response.body))
            }
            (None, Some(raw_response)) => {
                warn!(status = response.status, "SendGrid response has no X-Message-Id");
                (String::new(), raw_response)
            }
            (None, None) => {
                return Err(SendError::rejected("unexpected response body from SendGrid")
                    .with_raw(&response.body));
            }
        };

        Ok(SendResult {
            provider: Provider::SendGrid,
            provider_message_id,
            raw_response,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::{
        domain::communication::{
            attachments::{resolve, Attachment},
            emails::{Body, Content},
            mailer::{tests::MockCredentialsSupplier, StaticCredentials},
        },
        infrastructure::email::ReqwestTransport,
    };

    use super::*;

    fn email() -> TestResult<Email> {
        Ok(Email::new(
            Mailbox::parse(Some("Alice"), "alice@example.com")?,
            vec![Mailbox::parse(Some("A"), "a@x.com")?],
            "Hello world",
            Content::Body(Body::html("<p>Hi</p>")),
        )?
        .with_bcc(vec![Mailbox::parse(None, "audit@example.com")?]))
    }

    fn mailer(
        server: &MockServer,
        timeout: Duration,
    ) -> SendGridMailer<ReqwestTransport, StaticCredentials> {
        SendGridMailer::new(
            Arc::new(ReqwestTransport::new()),
            StaticCredentials::new(Credentials::ApiKey("SG.key".to_string())),
            &server.uri(),
            timeout,
        )
    }

    #[test]
    fn test_payload() -> TestResult {
        let attachments = vec![resolve(&Attachment::new("report.csv", "a,b\n1,2\n", None))?];

        let payload = payload(&email()?, &attachments)?;

        assert_eq!(
            payload,
            json!({
                "personalizations": [{
                    "to": [{"email": "a@x.com", "name": "A"}],
                    "bcc": [{"email": "audit@example.com"}]
                }],
                "from": {"email": "alice@example.com", "name": "Alice"},
                "subject": "Hello world",
                "content": [{"type": "text/html", "value": "<p>Hi</p>"}],
                "attachments": [{
                    "content": "YSxiCjEsMgo=",
                    "filename": "report.csv",
                    "type": "text/csv",
                    "disposition": "attachment"
                }]
            })
        );

        Ok(())
    }

    #[test]
    fn test_payload_lists_plain_text_before_html() -> TestResult {
        let email = email()?.with_rendered(
            "Hello world".to_string(),
            Body::alternative("<p>Hi</p>", "Hi"),
        );

        let payload = payload(&email, &[])?;

        assert_eq!(
            payload["content"],
            json!([
                {"type": "text/plain", "value": "Hi"},
                {"type": "text/html", "value": "<p>Hi</p>"}
            ])
        );
        assert!(payload.get("attachments").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_send_success() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("Authorization", "Bearer SG.key"))
            .respond_with(ResponseTemplate::new(202).insert_header("X-Message-Id", "sg-123"))
            .expect(1)
            .mount(&server)
            .await;

        let result = mailer(&server, Duration::from_secs(5))
            .send(&email()?, &[])
            .await?;

        assert_eq!(result.provider, Provider::SendGrid);
        assert_eq!(result.provider_message_id, "sg-123");
        assert_eq!(result.raw_response, Value::Null);

        Ok(())
    }

    #[tokio::test]
    async fn test_send_classifies_failures() -> TestResult {
        let cases = [
            (401, "auth"),
            (403, "auth"),
            (400, "rejected"),
            (413, "rejected"),
            (429, "transport"),
            (500, "transport"),
            (503, "transport"),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;

            Mock::given(method("POST"))
                .respond_with(
                    ResponseTemplate::new(status).set_body_string(r#"{"errors":[{"message":"nope"}]}"#),
                )
                .expect(1)
                .mount(&server)
                .await;

            let err = match mailer(&server, Duration::from_secs(5)).send(&email()?, &[]).await {
                Err(err) => err,
                Ok(result) => panic!("status {status} should fail, got {result:?}"),
            };

            let kind = match err {
                SendError::Auth { .. } => "auth",
                SendError::Rejected { .. } => "rejected",
                SendError::Transport { .. } => "transport",
            };

            assert_eq!(kind, expected, "status {status}");
            assert_eq!(err.raw_payload(), Some(r#"{"errors":[{"message":"nope"}]}"#));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_send_timeout_is_a_transport_error() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_delay(Duration::from_secs(2)))
            .expect(2)
            .mount(&server)
            .await;

        let mailer = mailer(&server, Duration::from_millis(100));
        let email = email()?;

        for _ in 0..2 {
            let result = mailer.send(&email, &[]).await;

            assert!(matches!(&result, Err(err) if err.is_retryable()));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_api_key_is_an_auth_error() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .expect(0)
            .mount(&server)
            .await;

        let mut credentials = MockCredentialsSupplier::new();

        credentials
            .expect_credentials_for()
            .returning(|provider| Err(CredentialsError::Missing(provider)));

        let mailer = SendGridMailer::new(
            Arc::new(ReqwestTransport::new()),
            credentials,
            &server.uri(),
            Duration::from_secs(5),
        );

        let result = mailer.send(&email()?, &[]).await;

        assert!(matches!(result, Err(SendError::Auth { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_json_success_body_with_message_id_is_accepted() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(202)
                    .insert_header("X-Message-Id", "sg-456")
                    .set_body_string("Accepted"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = mailer(&server, Duration::from_secs(5))
            .send(&email()?, &[])
            .await?;

        assert_eq!(result.provider_message_id, "sg-456");
        assert_eq!(result.raw_response, Value::String("Accepted".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_rejected() -> TestResult {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let result = mailer(&server, Duration::from_secs(5))
            .send(&email()?, &[])
            .await;

        assert!(matches!(
            &result,
            Err(SendError::Rejected { raw: Some(raw), .. }) if raw == "<html>proxy</html>"
        ));

        Ok(())
    }
}
