//! SMTP mailer

use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use lettre::{
    transport::smtp::{
        authentication::Credentials as SmtpCredentials,
        client::{Tls, TlsParameters},
        Error as SmtpError,
    },
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::communication::{
    attachments::ResolvedAttachment,
    emails::Email,
    mailer::{
        Credentials, CredentialsError, CredentialsSupplier, Mailer, Provider, SendError,
        SendResult,
    },
};

use super::message;

/// SMTP relay configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct SmtpConfig {
    /// The SMTP host
    #[arg(long = "smtp-host", env = "SMTP_HOST", default_value = "localhost")]
    pub host: String,

    /// The SMTP port
    #[arg(long = "smtp-port", env = "SMTP_PORT", default_value_t = 587)]
    pub port: u16,

    /// Upgrade the connection with STARTTLS rather than connecting over TLS
    #[arg(
        long = "smtp-starttls",
        env = "SMTP_STARTTLS",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub starttls: bool,

    /// Verify the relay's TLS certificate
    #[arg(
        long = "smtp-verify-tls",
        env = "SMTP_VERIFY_TLS",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub verify_tls: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Security {
    StartTls,
    Wrapper,
    #[cfg(test)]
    Plaintext,
}

/// Sends email through an SMTP relay
#[derive(Clone, Debug)]
pub struct SmtpMailer<C>
where
    C: CredentialsSupplier,
{
    config: SmtpConfig,
    security: Security,
    credentials: C,
    timeout: Duration,
}

impl<C> SmtpMailer<C>
where
    C: CredentialsSupplier,
{
    /// Creates an SMTP mailer
    pub fn new(config: SmtpConfig, credentials: C, timeout: Duration) -> Self {
        let security = if config.starttls {
            Security::StartTls
        } else {
            Security::Wrapper
        };

        Self {
            config,
            security,
            credentials,
            timeout,
        }
    }

    fn login(&self) -> Result<SmtpCredentials, SendError> {
        match self.credentials.credentials_for(Provider::Smtp)? {
            Credentials::Login { username, password } => Ok(SmtpCredentials::new(username, password)),
            other => Err(CredentialsError::Unsupported {
                provider: Provider::Smtp,
                found: other.kind(),
            }
            .into()),
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, SendError> {
        let tls = || {
            TlsParameters::builder(self.config.host.clone())
                .dangerous_accept_invalid_certs(!self.config.verify_tls)
                .build()
                .map_err(|err| SendError::transport(format!("invalid TLS parameters: {err}")))
        };

        let tls = match self.security {
            Security::StartTls => Tls::Required(tls()?),
            Security::Wrapper => Tls::Wrapper(tls()?),
            #[cfg(test)]
            Security::Plaintext => Tls::None,
        };

        Ok(
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
                .port(self.config.port)
                .tls(tls)
                .timeout(Some(self.timeout))
                .credentials(self.login()?)
                .build(),
        )
    }
}

/// Classifies an SMTP failure from its reply code.
///
/// Authentication codes (530, 534, 535) and failed authentication
/// negotiation are authentication failures, other permanent failures are
/// rejections, and everything else can be retried.
fn classify(code: Option<u16>, permanent: bool, message: String) -> SendError {
    let negotiation_failed = code.is_none() && message.to_lowercase().contains("authentication");

    match code {
        Some(530 | 534 | 535) => SendError::auth(message),
        _ if negotiation_failed => SendError::auth(message),
        _ if permanent => SendError::rejected(message),
        _ => SendError::transport(message),
    }
}

impl From<SmtpError> for SendError {
    fn from(err: SmtpError) -> Self {
        debug!("lettre::transport::smtp::Error: {:?}", err);

        classify(err.status().map(u16::from), err.is_permanent(), err.to_string())
    }
}

#[async_trait]
impl<C> Mailer for SmtpMailer<C>
where
    C: CredentialsSupplier,
{
    fn provider(&self) -> Provider {
        Provider::Smtp
    }

    async fn send(
        &self,
        email: &Email,
        attachments: &[ResolvedAttachment],
    ) -> Result<SendResult, SendError> {
        let built = message::build(email, attachments, false)?;
        let transport = self.transport()?;

        let response = tokio::time::timeout(self.timeout, transport.send(built.message))
            .await
            .map_err(|_| SendError::transport(format!("request timed out after {:?}", self.timeout)))?
            .map_err(|err| {
                let err = SendError::from(err);
                warn!(error = %err, "SMTP relay did not accept the email");
                err
            })?;

        Ok(SendResult {
            provider: Provider::Smtp,
            provider_message_id: built.message_id,
            raw_response: json!({
                "code": response.code().to_string(),
                "message": response.message().collect::<Vec<_>>(),
            }),
        })
    }
}
