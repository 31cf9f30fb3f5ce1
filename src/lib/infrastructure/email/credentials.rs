//! Credentials from the environment

use std::fmt;

use clap::Parser;

use crate::domain::communication::mailer::{
    Credentials, CredentialsError, CredentialsSupplier, Provider,
};

/// Provider credentials, read from the command line or the environment
#[derive(Clone, Default, PartialEq, Eq, Parser)]
pub struct CredentialsConfig {
    /// The SendGrid API key
    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true)]
    pub sendgrid_api_key: Option<String>,

    /// The Gmail OAuth access token
    #[arg(long, env = "GMAIL_ACCESS_TOKEN", hide_env_values = true)]
    pub gmail_access_token: Option<String>,

    /// The SMTP username
    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    /// The SMTP password
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

impl CredentialsSupplier for CredentialsConfig {
    fn credentials_for(&self, provider: Provider) -> Result<Credentials, CredentialsError> {
        let credentials = match provider {
            Provider::SendGrid => present(&self.sendgrid_api_key).map(Credentials::ApiKey),
            Provider::Gmail => present(&self.gmail_access_token).map(Credentials::AccessToken),
            Provider::Smtp => match (present(&self.smtp_user), present(&self.smtp_password)) {
                (Some(username), Some(password)) => Some(Credentials::Login { username, password }),
                _ => None,
            },
        };

        credentials.ok_or(CredentialsError::Missing(provider))
    }
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "********");

        f.debug_struct("CredentialsConfig")
            .field("sendgrid_api_key", &redacted(&self.sendgrid_api_key))
            .field("gmail_access_token", &redacted(&self.gmail_access_token))
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &redacted(&self.smtp_password))
            .finish()
    }
}
