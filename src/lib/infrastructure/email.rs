//! Email provider adapters

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use clap::Parser;

use crate::domain::communication::{
    attachments::ResolvedAttachment,
    emails::Email,
    mailer::{CredentialsSupplier, HttpTransport, Mailer, Provider, SendError, SendResult},
};

mod credentials;
mod gmail;
mod message;
mod sendgrid;
mod smtp;
mod transport;

pub use credentials::CredentialsConfig;
pub use gmail::{GmailMailer, GMAIL_BASE_URL};
pub use message::{build as build_mime_message, MimeMessage};
pub use sendgrid::{payload as sendgrid_payload, SendGridMailer, SENDGRID_BASE_URL};
pub use smtp::{SmtpConfig, SmtpMailer};
pub use transport::ReqwestTransport;

/// Mailer configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct MailerConfig {
    /// The provider to send through: sendgrid, gmail or smtp
    #[arg(long, env = "MAIL_PROVIDER", default_value = "sendgrid")]
    pub provider: Provider,

    /// How long a provider call may take, in seconds
    #[arg(long, env = "MAIL_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// The SendGrid API base URL
    #[arg(long, env = "SENDGRID_BASE_URL", default_value = SENDGRID_BASE_URL)]
    pub sendgrid_base_url: String,

    /// The Gmail API base URL
    #[arg(long, env = "GMAIL_BASE_URL", default_value = GMAIL_BASE_URL)]
    pub gmail_base_url: String,

    /// The SMTP relay
    #[clap(flatten)]
    pub smtp: SmtpConfig,
}

impl MailerConfig {
    /// How long a provider call may take
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The configured provider's mailer
#[derive(Clone, Debug)]
pub enum ProviderAdapter<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    /// SendGrid
    SendGrid(SendGridMailer<T, C>),

    /// Gmail
    Gmail(GmailMailer<T, C>),

    /// SMTP
    Smtp(SmtpMailer<C>),
}

impl<T, C> ProviderAdapter<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    /// Creates the mailer for the configured provider
    pub fn from_config(config: &MailerConfig, transport: Arc<T>, credentials: C) -> Self {
        let timeout = config.timeout();

        match config.provider {
            Provider::SendGrid => Self::SendGrid(SendGridMailer::new(
                transport,
                credentials,
                &config.sendgrid_base_url,
                timeout,
            )),
            Provider::Gmail => Self::Gmail(GmailMailer::new(
                transport,
                credentials,
                &config.gmail_base_url,
                timeout,
            )),
            Provider::Smtp => Self::Smtp(SmtpMailer::new(config.smtp.clone(), credentials, timeout)),
        }
    }
}

#[async_trait]
impl<T, C> Mailer for ProviderAdapter<T, C>
where
    T: HttpTransport,
    C: CredentialsSupplier,
{
    fn provider(&self) -> Provider {
        match self {
            Self::SendGrid(mailer) => mailer.provider(),
            Self::Gmail(mailer) => mailer.provider(),
            Self::Smtp(mailer) => mailer.provider(),
        }
    }

    async fn send(
        &self,
        email: &Email,
        attachments: &[ResolvedAttachment],
    ) -> Result<SendResult, SendError> {
        match self {
            Self::SendGrid(mailer) => mailer.send(email, attachments).await,
            Self::Gmail(mailer) => mailer.send(email, attachments).await,
            Self::Smtp(mailer) => mailer.send(email, attachments).await,
        }
    }
}
