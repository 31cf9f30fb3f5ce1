//! Emails: the model, its JSON form and the dispatch service

mod email;
mod errors;
mod ingest;
mod mailbox;
mod service;
mod subject;

pub use email::{Body, Content, ContentKind, Email, TemplateReference};
pub use errors::ValidationError;
pub use ingest::{
    parse, parse_value, AttachmentDocument, BodyDocument, EmailDocument, MailboxDocument,
    TemplateDocument,
};
pub use mailbox::Mailbox;
pub use service::{EmailService, EmailServiceImpl};
pub use subject::sanitize;
