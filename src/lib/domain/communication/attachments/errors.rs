//! Attachment errors

use thiserror::Error;

/// Errors raised while preparing an attachment
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidAttachmentError {
    /// The attachment has no content
    #[error("attachment \"{filename}\" is empty")]
    EmptyContent {
        /// Name of the attached file
        filename: String,
    },

    /// The attachment could not be read from disk
    #[error("attachment \"{path}\" could not be read: {reason}")]
    Unreadable {
        /// Path of the attached file
        path: String,

        /// Underlying I/O error
        reason: String,
    },
}
