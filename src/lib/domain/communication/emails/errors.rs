//! Email validation errors

use thiserror::Error;

use crate::domain::communication::{
    email_addresses::EmailAddressError, templates::LocaleError,
};

use super::ContentKind;

/// Errors raised when an email is malformed. Such emails are never sent.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The JSON document is not an email document
    #[error("malformed email document: {0}")]
    MalformedDocument(String),

    /// The email has no `to` recipient
    #[error("at least one recipient is required")]
    NoRecipients,

    /// One of the addresses is invalid
    #[error("invalid {field} address: {source}")]
    InvalidAddress {
        /// Which participant field holds the address
        field: &'static str,

        /// Why the address is invalid
        #[source]
        source: EmailAddressError,
    },

    /// Neither a body nor a template was given
    #[error("either a body or a template is required")]
    MissingContent,

    /// Both a body and a template were given
    #[error("a body and a template cannot both be given")]
    AmbiguousContent,

    /// A body gives the same part both as `content` and by name
    #[error("body gives its {} part twice", .kind.mime_type())]
    ConflictingBody {
        /// The kind of the part given twice
        kind: ContentKind,
    },

    /// The locale could not be parsed
    #[error(transparent)]
    InvalidLocale(#[from] LocaleError),

    /// An attachment's content is not base64
    #[error("content of attachment \"{filename}\" is not valid base64")]
    InvalidAttachmentEncoding {
        /// Name of the attached file
        filename: String,
    },

    /// A template variable has a value that cannot be substituted
    #[error("template variable \"{name}\" must be a string, a number or a boolean")]
    InvalidVariable {
        /// Name of the variable
        name: String,
    },
}
