//! Attachment resolution

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use super::{
    mime_types::{mime_type_for_filename, DEFAULT_MIME_TYPE},
    Attachment, InvalidAttachmentError, ResolvedAttachment,
};

/// One way of finding the MIME type of an attachment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionStep {
    /// The type the caller declared, when present and not blank
    Declared,

    /// The type registered for the filename's extension
    Extension,

    /// [`DEFAULT_MIME_TYPE`]
    Default,
}

/// The order in which MIME type resolution steps are tried
pub const RESOLUTION_ORDER: [ResolutionStep; 3] = [
    ResolutionStep::Declared,
    ResolutionStep::Extension,
    ResolutionStep::Default,
];

impl ResolutionStep {
    /// Applies this step to an attachment
    pub fn apply<'a>(&self, attachment: &'a Attachment) -> Option<&'a str> {
        match self {
            Self::Declared => attachment
                .declared_mime_type()
                .map(str::trim)
                .filter(|mime_type| !mime_type.is_empty()),
            Self::Extension => mime_type_for_filename(attachment.filename()),
            Self::Default => Some(DEFAULT_MIME_TYPE),
        }
    }
}

/// Determines the MIME type of an attachment by walking [`RESOLUTION_ORDER`]
pub fn resolve_mime_type(attachment: &Attachment) -> (&str, ResolutionStep) {
    RESOLUTION_ORDER
        .iter()
        .find_map(|step| step.apply(attachment).map(|mime_type| (mime_type, *step)))
        .unwrap_or((DEFAULT_MIME_TYPE, ResolutionStep::Default))
}

/// Resolves the MIME type of an attachment and encodes its content as base64
pub fn resolve(attachment: &Attachment) -> Result<ResolvedAttachment, InvalidAttachmentError> {
    if attachment.content().is_empty() {
        return Err(InvalidAttachmentError::EmptyContent {
            filename: attachment.filename().to_string(),
        });
    }

    let (mime_type, step) = resolve_mime_type(attachment);

    debug!(
        filename = attachment.filename(),
        mime_type,
        ?step,
        "resolved attachment"
    );

    Ok(ResolvedAttachment {
        filename: attachment.filename().to_string(),
        mime_type: mime_type.to_string(),
        encoded_content: STANDARD.encode(attachment.content()),
    })
}

/// Resolves every attachment in order, stopping at the first invalid one
pub fn resolve_all(
    attachments: &[Attachment],
) -> Result<Vec<ResolvedAttachment>, InvalidAttachmentError> {
    attachments.iter().map(resolve).collect()
}
