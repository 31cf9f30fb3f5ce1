//! JSON email documents
//!
//! An email document looks like:
//!
//! ```json
//! {
//!   "from": {"name": "Alice", "address": "alice@example.com"},
//!   "to": [{"name": "Bob", "address": "bob@example.com"}],
//!   "cc": [],
//!   "bcc": [],
//!   "subject": "Quarterly report",
//!   "template": {"key": "report", "variables": {"quarter": "Q3"}},
//!   "attachments": [{"filename": "report.csv", "content": "YSxi", "mimeType": "text/csv"}],
//!   "locale": "eng-US"
//! }
//! ```
//!
//! Exactly one of `body` and `template` must be present. A body is either
//! `{"kind": "html" | "text", "content": "..."}` or `{"html": "...", "text": "..."}`
//! with at least one of the two parts. Unknown fields are ignored.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::communication::{
    attachments::Attachment, email_addresses::EmailAddressError, templates::Locale,
};

use super::{Body, Content, ContentKind, Email, Mailbox, TemplateReference, ValidationError};

/// A participant in an email document
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MailboxDocument {
    /// Display name
    #[schema(example = "Bob")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    /// Email address, also accepted as `email_address`
    #[schema(example = "bob@example.com")]
    #[serde(alias = "email_address")]
    address: String,
}

/// A body ready to be sent
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct BodyDocument {
    /// What `content` is written in, `html` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<ContentKind>,

    /// The content of a single part body
    #[schema(example = "<p>Hello Bob</p>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    /// The HTML part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html: Option<String>,

    /// The plain text part
    #[schema(example = "Hello Bob")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// A template to render as the body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TemplateDocument {
    /// The template key
    #[schema(example = "welcome")]
    key: String,

    /// Placeholder values: strings, numbers or booleans
    #[schema(value_type = Object)]
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    variables: BTreeMap<String, Value>,
}

/// An attached file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDocument {
    /// The file's name
    #[schema(example = "report.csv")]
    filename: String,

    /// The file's content, base64 encoded
    #[schema(example = "bW9udGgsdG90YWwK")]
    content: String,

    /// The file's MIME type, guessed from the filename when absent. Also
    /// accepted as `mime_type`.
    #[schema(example = "text/csv")]
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
}

/// A JSON email document. Exactly one of `body` and `template` is required.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailDocument {
    /// The author
    from: MailboxDocument,

    /// Primary recipients, at least one
    to: Vec<MailboxDocument>,

    /// Carbon copy recipients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cc: Option<Vec<MailboxDocument>>,

    /// Blind carbon copy recipients
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<MailboxDocument>>,

    /// The subject, sanitized before sending. When blank, a template's
    /// `<title>` is used.
    #[schema(example = "Welcome aboard")]
    subject: String,

    /// A body ready to be sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<BodyDocument>,

    /// A template to render
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<TemplateDocument>,

    /// Attached files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<AttachmentDocument>>,

    /// The locale to render the template in, such as `eng` or `fra-FR`
    #[schema(example = "eng-US")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
}

/// Parses a JSON email document
pub fn parse(json: &str) -> Result<Email, ValidationError> {
    let document: EmailDocument = serde_json::from_str(json)
        .map_err(|err| ValidationError::MalformedDocument(err.to_string()))?;

    document.try_into()
}

/// Parses an already decoded JSON email document
pub fn parse_value(value: Value) -> Result<Email, ValidationError> {
    let document: EmailDocument = serde_json::from_value(value)
        .map_err(|err| ValidationError::MalformedDocument(err.to_string()))?;

    document.try_into()
}

impl Email {
    /// Parses a JSON email document
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        parse(json)
    }

    /// Serializes the email as a JSON email document
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(EmailDocument::from(self))
    }
}

fn mailbox(field: &'static str, document: MailboxDocument) -> Result<Mailbox, ValidationError> {
    Mailbox::parse(document.name.as_deref(), &document.address)
        .map_err(|source: EmailAddressError| ValidationError::InvalidAddress { field, source })
}

fn mailboxes(
    field: &'static str,
    documents: Option<Vec<MailboxDocument>>,
) -> Result<Vec<Mailbox>, ValidationError> {
    documents
        .unwrap_or_default()
        .into_iter()
        .map(|document| mailbox(field, document))
        .collect()
}

fn variable(name: String, value: Value) -> Result<(String, String), ValidationError> {
    let value = match value {
        Value::String(value) => value,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return Err(ValidationError::InvalidVariable { name }),
    };

    Ok((name, value))
}

fn body(document: BodyDocument) -> Result<Body, ValidationError> {
    let BodyDocument {
        kind,
        content,
        mut html,
        mut text,
    } = document;

    if let Some(content) = content {
        let kind = kind.unwrap_or_default();
        let part = match kind {
            ContentKind::Html => &mut html,
            ContentKind::Text => &mut text,
        };

        if part.is_some() {
            return Err(ValidationError::ConflictingBody { kind });
        }

        *part = Some(content);
    }

    Body::from_parts(html, text).ok_or(ValidationError::MissingContent)
}

fn content(
    body: Option<BodyDocument>,
    template: Option<TemplateDocument>,
) -> Result<Content, ValidationError> {
    match (body, template) {
        (Some(document), None) => Ok(Content::Body(self::body(document)?)),
        (None, Some(template)) => Ok(Content::Template(TemplateReference {
            key: template.key,
            variables: template
                .variables
                .into_iter()
                .map(|(name, value)| variable(name, value))
                .collect::<Result<_, _>>()?,
        })),
        (Some(_), Some(_)) => Err(ValidationError::AmbiguousContent),
        (None, None) => Err(ValidationError::MissingContent),
    }
}

fn attachment(document: AttachmentDocument) -> Result<Attachment, ValidationError> {
    let content = STANDARD.decode(document.content.trim()).map_err(|err| {
        debug!(filename = document.filename, %err, "attachment is not base64");

        ValidationError::InvalidAttachmentEncoding {
            filename: document.filename.clone(),
        }
    })?;

    Ok(Attachment::new(document.filename, content, document.mime_type))
}

impl TryFrom<EmailDocument> for Email {
    type Error = ValidationError;

    fn try_from(document: EmailDocument) -> Result<Self, Self::Error> {
        let from = mailbox("from", document.from)?;
        let to = mailboxes("to", Some(document.to))?;
        let cc = mailboxes("cc", document.cc)?;
        let bcc = mailboxes("bcc", document.bcc)?;
        let content = content(document.body, document.template)?;
        let attachments = document
            .attachments
            .unwrap_or_default()
            .into_iter()
            .map(attachment)
            .collect::<Result<Vec<_>, _>>()?;

        let email = Email::new(from, to, document.subject, content)?
            .with_cc(cc)
            .with_bcc(bcc)
            .with_attachments(attachments);

        Ok(match document.locale {
            Some(locale) => email.with_locale(Locale::new(&locale)?),
            None => email,
        })
    }
}

impl From<&Mailbox> for MailboxDocument {
    fn from(mailbox: &Mailbox) -> Self {
        Self {
            name: mailbox.name().map(String::from),
            address: mailbox.address().to_string(),
        }
    }
}

impl From<&Body> for BodyDocument {
    fn from(body: &Body) -> Self {
        match body {
            Body::Alternative { html, text } => Self {
                html: Some(html.clone()),
                text: Some(text.clone()),
                ..Self::default()
            },
            single => Self {
                kind: Some(single.kind()),
                content: Some(single.content().to_string()),
                ..Self::default()
            },
        }
    }
}

fn mailbox_documents(mailboxes: &[Mailbox]) -> Option<Vec<MailboxDocument>> {
    (!mailboxes.is_empty()).then(|| mailboxes.iter().map(MailboxDocument::from).collect())
}

impl From<&Email> for EmailDocument {
    fn from(email: &Email) -> Self {
        let (body, template) = match email.content() {
            Content::Body(body) => (Some(BodyDocument::from(body)), None),
            Content::Template(reference) => (
                None,
                Some(TemplateDocument {
                    key: reference.key.clone(),
                    variables: reference
                        .variables
                        .iter()
                        .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                        .collect(),
                }),
            ),
        };

        let attachments = email
            .attachments()
            .iter()
            .map(|attachment| AttachmentDocument {
                filename: attachment.filename().to_string(),
                content: STANDARD.encode(attachment.content()),
                mime_type: attachment.declared_mime_type().map(String::from),
            })
            .collect::<Vec<_>>();

        Self {
            from: email.from().into(),
            to: email.to().iter().map(MailboxDocument::from).collect(),
            cc: mailbox_documents(email.cc()),
            bcc: mailbox_documents(email.bcc()),
            subject: email.subject().to_string(),
            body,
            template,
            attachments: (!attachments.is_empty()).then_some(attachments),
            locale: email.locale().map(ToString::to_string),
        }
    }
}
