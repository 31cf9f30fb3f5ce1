//! Provider credentials

use std::fmt;

#[cfg(test)]
use mockall::mock;
use thiserror::Error;

use super::Provider;

/// Errors that can occur when credentials are requested
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    /// Nothing is configured for the provider
    #[error("no credentials configured for {0}")]
    Missing(Provider),

    /// The configured credentials are not the kind the provider needs
    #[error("{provider} cannot authenticate with {found}")]
    Unsupported {
        /// The provider asking
        provider: Provider,

        /// The kind of credentials that were found
        found: &'static str,
    },
}

/// A secret used to authenticate with a provider
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// An API key sent as a bearer token
    ApiKey(String),

    /// An OAuth access token sent as a bearer token
    AccessToken(String),

    /// A username and password
    Login {
        /// The username
        username: String,

        /// The password
        password: String,
    },
}

impl Credentials {
    /// The token to send in an `Authorization: Bearer` header, if these
    /// credentials are a token
    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            Self::ApiKey(token) | Self::AccessToken(token) => Some(token),
            Self::Login { .. } => None,
        }
    }

    /// A short name for the kind of credentials
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "an API key",
            Self::AccessToken(_) => "an access token",
            Self::Login { .. } => "a login",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "ApiKey(********)"),
            Self::AccessToken(_) => write!(f, "AccessToken(********)"),
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"********")
                .finish(),
        }
    }
}

/// Supplies credentials for providers
pub trait CredentialsSupplier: Clone + Send + Sync + 'static {
    /// Gets the credentials to use with `provider`
    fn credentials_for(&self, provider: Provider) -> Result<Credentials, CredentialsError>;
}

#[cfg(test)]
mock! {
    pub CredentialsSupplier {}

    impl Clone for CredentialsSupplier {
        fn clone(&self) -> Self;
    }

    impl CredentialsSupplier for CredentialsSupplier {
        fn credentials_for(&self, provider: Provider) -> Result<Credentials, CredentialsError>;
    }
}

/// Supplies the same credentials to every provider
#[derive(Clone, Debug)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    /// Creates a supplier handing out `credentials`
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

impl CredentialsSupplier for StaticCredentials {
    fn credentials_for(&self, _provider: Provider) -> Result<Credentials, CredentialsError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let api_key = Credentials::ApiKey("SG.secret".to_string());
        let login = Credentials::Login {
            username: "mailer".to_string(),
            password: "hunter2".to_string(),
        };

        assert_eq!(format!("{api_key:?}"), "ApiKey(********)");
        assert!(!format!("{login:?}").contains("hunter2"));
        assert!(format!("{login:?}").contains("mailer"));
        assert!(!format!("{:?}", StaticCredentials::new(api_key)).contains("SG.secret"));
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(
            Credentials::AccessToken("ya29".to_string()).bearer_token(),
            Some("ya29")
        );
        assert_eq!(
            Credentials::Login {
                username: "u".to_string(),
                password: "p".to_string()
            }
            .bearer_token(),
            None
        );
    }
}
