//! Attachment models

use std::path::Path;

use tracing::debug;

use super::InvalidAttachmentError;

/// A file attached to an email, as supplied by the caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content: Vec<u8>,
    declared_mime_type: Option<String>,
}

impl Attachment {
    /// Creates an attachment from its raw content
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<Vec<u8>>,
        declared_mime_type: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            declared_mime_type,
        }
    }

    /// Reads an attachment from disk, naming it after the file
    pub fn from_path(
        path: impl AsRef<Path>,
        declared_mime_type: Option<String>,
    ) -> Result<Self, InvalidAttachmentError> {
        let path = path.as_ref();

        debug!(path = %path.display(), "reading attachment");

        let content = std::fs::read(path).map_err(|err| InvalidAttachmentError::Unreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(filename, content, declared_mime_type))
    }

    /// The name of the attached file
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The raw bytes of the attached file
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The MIME type given by the caller, if any
    pub fn declared_mime_type(&self) -> Option<&str> {
        self.declared_mime_type.as_deref()
    }
}

/// An attachment with its MIME type determined and its content encoded for
/// transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAttachment {
    /// The name of the attached file
    pub filename: String,

    /// The resolved MIME type
    pub mime_type: String,

    /// The content, base64 encoded with the standard alphabet and padding
    pub encoded_content: String,
}
