//! Email model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::communication::{attachments::Attachment, templates::Locale};

use super::{Mailbox, ValidationError};

/// The kind of content held by a body
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// HTML
    #[default]
    Html,

    /// Plain text
    Text,
}

impl ContentKind {
    /// The MIME type of content of this kind
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Text => "text/plain",
        }
    }
}

/// The body of an email: HTML, plain text, or both as alternatives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// HTML only
    Html(String),

    /// Plain text only
    Text(String),

    /// HTML with a plain text alternative
    Alternative {
        /// The HTML part
        html: String,

        /// The plain text part
        text: String,
    },
}

impl Body {
    /// A body of the given kind
    pub fn new(kind: ContentKind, content: impl Into<String>) -> Self {
        match kind {
            ContentKind::Html => Self::Html(content.into()),
            ContentKind::Text => Self::Text(content.into()),
        }
    }

    /// An HTML body
    pub fn html(content: impl Into<String>) -> Self {
        Self::Html(content.into())
    }

    /// A plain text body
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// An HTML body with a plain text alternative
    pub fn alternative(html: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Alternative {
            html: html.into(),
            text: text.into(),
        }
    }

    /// Builds a body from whichever parts are present
    pub fn from_parts(html: Option<String>, text: Option<String>) -> Option<Self> {
        match (html, text) {
            (Some(html), Some(text)) => Some(Self::Alternative { html, text }),
            (Some(html), None) => Some(Self::Html(html)),
            (None, Some(text)) => Some(Self::Text(text)),
            (None, None) => None,
        }
    }

    /// The richest kind present: HTML whenever there is an HTML part
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Text(_) => ContentKind::Text,
            Self::Html(_) | Self::Alternative { .. } => ContentKind::Html,
        }
    }

    /// The content of the richest part
    pub fn content(&self) -> &str {
        match self {
            Self::Html(html) | Self::Alternative { html, .. } => html.as_str(),
            Self::Text(text) => text.as_str(),
        }
    }

    /// The HTML part, if any
    pub fn html_content(&self) -> Option<&str> {
        match self {
            Self::Html(html) | Self::Alternative { html, .. } => Some(html.as_str()),
            Self::Text(_) => None,
        }
    }

    /// The plain text part, if any
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::Text(text) | Self::Alternative { text, .. } => Some(text.as_str()),
            Self::Html(_) => None,
        }
    }

    /// Every part, plain text first, as MIME alternatives are ordered
    pub fn parts(&self) -> Vec<(ContentKind, &str)> {
        let text = self.text_content().map(|text| (ContentKind::Text, text));
        let html = self.html_content().map(|html| (ContentKind::Html, html));

        text.into_iter().chain(html).collect()
    }
}

/// A reference to a localized template and the values of its variables
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateReference {
    /// The template key
    pub key: String,

    /// Values substituted into the template's placeholders
    pub variables: BTreeMap<String, String>,
}

impl TemplateReference {
    /// Creates a template reference
    pub fn new<I, K, V>(key: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            variables: variables
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Where the body of an email comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    /// A body ready to be sent
    Body(Body),

    /// A template still to be rendered
    Template(TemplateReference),
}

/// A message to be sent to one or more recipients
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email {
    from: Mailbox,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    bcc: Vec<Mailbox>,
    subject: String,
    content: Content,
    attachments: Vec<Attachment>,
    locale: Option<Locale>,
}

impl Email {
    /// Creates an email. At least one `to` recipient is required.
    pub fn new(
        from: Mailbox,
        to: Vec<Mailbox>,
        subject: impl Into<String>,
        content: Content,
    ) -> Result<Self, ValidationError> {
        if to.is_empty() {
            return Err(ValidationError::NoRecipients);
        }

        Ok(Self {
            from,
            to,
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: subject.into(),
            content,
            attachments: Vec::new(),
            locale: None,
        })
    }

    /// Sets the carbon copy recipients
    pub fn with_cc(mut self, cc: Vec<Mailbox>) -> Self {
        self.cc = cc;
        self
    }

    /// Sets the blind carbon copy recipients
    pub fn with_bcc(mut self, bcc: Vec<Mailbox>) -> Self {
        self.bcc = bcc;
        self
    }

    /// Sets the attached files
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Sets the locale the email is written in
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Replaces the subject and content with their final, sendable form
    pub fn with_rendered(mut self, subject: String, body: Body) -> Self {
        self.subject = subject;
        self.content = Content::Body(body);
        self
    }

    /// The author of the email
    pub fn from(&self) -> &Mailbox {
        &self.from
    }

    /// The primary recipients
    pub fn to(&self) -> &[Mailbox] {
        &self.to
    }

    /// The carbon copy recipients
    pub fn cc(&self) -> &[Mailbox] {
        &self.cc
    }

    /// The blind carbon copy recipients
    pub fn bcc(&self) -> &[Mailbox] {
        &self.bcc
    }

    /// The subject
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The body or template reference
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// The body, once the email has been rendered
    pub fn body(&self) -> Option<&Body> {
        match &self.content {
            Content::Body(body) => Some(body),
            Content::Template(_) => None,
        }
    }

    /// The attached files
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// The locale, if one was given
    pub fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    /// Every recipient: `to`, then `cc`, then `bcc`
    pub fn recipients(&self) -> impl Iterator<Item = &Mailbox> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn mailbox(address: &str) -> Mailbox {
        Mailbox::parse(None, address).expect("valid address")
    }

    #[test]
    fn test_new_email_requires_a_recipient() {
        let result = Email::new(
            mailbox("from@example.com"),
            vec![],
            "Hello",
            Content::Body(Body::text("Hi")),
        );

        assert_eq!(result, Err(ValidationError::NoRecipients));
    }

    #[test]
    fn test_email_builder() -> TestResult {
        let email = Email::new(
            mailbox("from@example.com"),
            vec![mailbox("to@example.com")],
            "Hello",
            Content::Template(TemplateReference::new("welcome", [("name", "Bob")])),
        )?
        .with_cc(vec![mailbox("cc@example.com")])
        .with_bcc(vec![mailbox("bcc@example.com")])
        .with_attachments(vec![Attachment::new("a.txt", "hi", None)])
        .with_locale(Locale::new("fra")?);

        assert_eq!(email.body(), None);
        assert_eq!(email.attachments().len(), 1);
        assert_eq!(email.locale().map(ToString::to_string), Some("fra".into()));
        assert_eq!(
            email
                .recipients()
                .map(|m| m.address().as_str())
                .collect::<Vec<_>>(),
            vec!["to@example.com", "cc@example.com", "bcc@example.com"]
        );

        Ok(())
    }

    #[test]
    fn test_with_rendered_replaces_subject_and_content() -> TestResult {
        let email = Email::new(
            mailbox("from@example.com"),
            vec![mailbox("to@example.com")],
            "  hello ",
            Content::Template(TemplateReference::new("welcome", [("name", "Bob")])),
        )?
        .with_rendered("Hello".to_string(), Body::html("<p>Hi Bob</p>"));

        assert_eq!(email.subject(), "Hello");
        assert_eq!(email.body(), Some(&Body::html("<p>Hi Bob</p>")));

        Ok(())
    }

    #[test]
    fn test_body_parts() {
        let alternative = Body::alternative("<p>Hi</p>", "Hi");

        assert_eq!(alternative.kind(), ContentKind::Html);
        assert_eq!(alternative.content(), "<p>Hi</p>");
        assert_eq!(alternative.text_content(), Some("Hi"));
        assert_eq!(
            alternative.parts(),
            vec![(ContentKind::Text, "Hi"), (ContentKind::Html, "<p>Hi</p>")]
        );

        assert_eq!(Body::text("Hi").kind(), ContentKind::Text);
        assert_eq!(Body::text("Hi").html_content(), None);
        assert_eq!(Body::new(ContentKind::Html, "<p>Hi</p>"), Body::html("<p>Hi</p>"));
    }

    #[test]
    fn test_body_from_parts() {
        assert_eq!(
            Body::from_parts(Some("<b>x</b>".into()), Some("x".into())),
            Some(Body::alternative("<b>x</b>", "x"))
        );
        assert_eq!(Body::from_parts(None, Some("x".into())), Some(Body::text("x")));
        assert_eq!(Body::from_parts(None, None), None);
    }

    #[test]
    fn test_content_kind_mime_types() {
        assert_eq!(ContentKind::Html.mime_type(), "text/html");
        assert_eq!(ContentKind::Text.mime_type(), "text/plain");
    }
}
