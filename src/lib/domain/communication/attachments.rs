//! Attachments module.

mod attachment;
mod errors;
mod mime_types;
mod resolver;

pub use attachment::{Attachment, ResolvedAttachment};
pub use errors::InvalidAttachmentError;
pub use mime_types::{mime_type_for_filename, DEFAULT_MIME_TYPE};
pub use resolver::{resolve, resolve_all, resolve_mime_type, ResolutionStep, RESOLUTION_ORDER};
