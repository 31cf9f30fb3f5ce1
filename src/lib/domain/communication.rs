//! Composing and sending email

pub mod attachments;
pub mod email_addresses;
pub mod emails;
pub mod errors;
pub mod mailer;
pub mod templates;
