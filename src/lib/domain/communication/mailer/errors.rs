//! Mailer errors

use lettre::{address::AddressError, error::Error as MessageError};
use thiserror::Error;
use tracing::debug;

use super::{CredentialsError, TransportFailure};

/// Errors that can occur when a provider is asked to send an email
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The provider could not be reached in time, or was temporarily
    /// unavailable. Sending the same email again may succeed.
    #[error("transport error: {message}")]
    Transport {
        /// What went wrong
        message: String,

        /// The provider's response, when there was one
        raw: Option<String>,
    },

    /// The provider refused the email
    #[error("rejected by provider: {message}")]
    Rejected {
        /// What went wrong
        message: String,

        /// The provider's response, when there was one
        raw: Option<String>,
    },

    /// The provider refused the credentials
    #[error("authentication failed: {message}")]
    Auth {
        /// What went wrong
        message: String,

        /// The provider's response, when there was one
        raw: Option<String>,
    },
}

impl SendError {
    /// A transport error without a provider response
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            raw: None,
        }
    }

    /// A rejection without a provider response
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
            raw: None,
        }
    }

    /// An authentication failure without a provider response
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            raw: None,
        }
    }

    /// Attaches the provider's response
    pub fn with_raw(mut self, payload: impl Into<String>) -> Self {
        match &mut self {
            Self::Transport { raw, .. } | Self::Rejected { raw, .. } | Self::Auth { raw, .. } => {
                *raw = Some(payload.into())
            }
        }

        self
    }

    /// Classifies an unsuccessful HTTP response from a provider API.
    ///
    /// 401 and 403 are authentication failures, 408, 429 and 5xx are
    /// transport errors, and every other status is a rejection.
    pub fn from_http_status(status: u16, raw: impl Into<String>) -> Self {
        let message = format!("provider responded with status {status}");

        let error = match status {
            401 | 403 => Self::auth(message),
            408 | 429 | 500..=599 => Self::transport(message),
            _ => Self::rejected(message),
        };

        error.with_raw(raw)
    }

    /// What went wrong
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. }
            | Self::Rejected { message, .. }
            | Self::Auth { message, .. } => message,
        }
    }

    /// The provider's response, when there was one
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::Transport { raw, .. } | Self::Rejected { raw, .. } | Self::Auth { raw, .. } => {
                raw.as_deref()
            }
        }
    }

    /// Whether sending the same email again may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<TransportFailure> for SendError {
    fn from(err: TransportFailure) -> Self {
        debug!("TransportFailure: {:?}", err);

        SendError::transport(err.to_string())
    }
}

impl From<CredentialsError> for SendError {
    fn from(err: CredentialsError) -> Self {
        debug!("CredentialsError: {:?}", err);

        SendError::auth(err.to_string())
    }
}

impl From<AddressError> for SendError {
    fn from(err: AddressError) -> Self {
        debug!("AddressError: {:?}", err);

        SendError::rejected(format!("invalid address: {err}"))
    }
}

impl From<MessageError> for SendError {
    fn from(err: MessageError) -> Self {
        debug!("lettre::error::Error: {:?}", err);

        SendError::rejected(format!("could not build message: {err}"))
    }
}
