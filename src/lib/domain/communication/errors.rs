//! Dispatch errors

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::{
    attachments::InvalidAttachmentError, emails::ValidationError, mailer::SendError,
    templates::TemplateError,
};

/// The kind of a dispatch failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The email is malformed
    Validation,

    /// An attachment cannot be sent
    InvalidAttachment,

    /// No template exists for the key
    TemplateNotFound,

    /// The template could not be rendered
    InvalidTemplate,

    /// The provider could not be reached in time
    Transport,

    /// The provider refused the email
    Rejected,

    /// The provider refused the credentials, or there were none
    Auth,
}

impl ErrorKind {
    /// The kind's serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::InvalidAttachment => "invalid_attachment",
            Self::TemplateNotFound => "template_not_found",
            Self::InvalidTemplate => "invalid_template",
            Self::Transport => "transport",
            Self::Rejected => "rejected",
            Self::Auth => "auth",
        }
    }
}

/// Errors that can occur while dispatching an email
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The email is malformed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An attachment cannot be sent
    #[error(transparent)]
    InvalidAttachment(InvalidAttachmentError),

    /// The template could not be found or rendered
    #[error(transparent)]
    Template(TemplateError),

    /// The provider did not accept the email
    #[error(transparent)]
    Send(SendError),
}

impl DispatchError {
    /// The kind of failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidAttachment(_) => ErrorKind::InvalidAttachment,
            Self::Template(err) if err.is_not_found() => ErrorKind::TemplateNotFound,
            Self::Template(_) => ErrorKind::InvalidTemplate,
            Self::Send(SendError::Transport { .. }) => ErrorKind::Transport,
            Self::Send(SendError::Rejected { .. }) => ErrorKind::Rejected,
            Self::Send(SendError::Auth { .. }) => ErrorKind::Auth,
        }
    }

    /// Whether dispatching the same email again may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Send(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// The provider's response, when there was one
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::Send(err) => err.raw_payload(),
            _ => None,
        }
    }
}

impl From<InvalidAttachmentError> for DispatchError {
    fn from(err: InvalidAttachmentError) -> Self {
        debug!("InvalidAttachmentError: {:?}", err);

        DispatchError::InvalidAttachment(err)
    }
}

impl From<TemplateError> for DispatchError {
    fn from(err: TemplateError) -> Self {
        debug!("TemplateError: {:?}", err);

        DispatchError::Template(err)
    }
}

impl From<SendError> for DispatchError {
    fn from(err: SendError) -> Self {
        debug!("SendError: {:?}", err);

        DispatchError::Send(err)
    }
}
