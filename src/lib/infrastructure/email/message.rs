//! MIME messages for providers that take RFC 5322 messages

use base64::{engine::general_purpose::STANDARD, Engine as _};
use lettre::{
    message::{header::ContentType, Attachment, MultiPart, SinglePart},
    Message,
};
use uuid::Uuid;

use crate::domain::communication::{
    attachments::ResolvedAttachment,
    emails::{Body, ContentKind, Email, Mailbox},
    mailer::{rendered_body, SendError},
};

/// A MIME message and its `Message-ID`
#[derive(Debug)]
pub struct MimeMessage {
    /// The message
    pub message: Message,

    /// The `Message-ID` header, angle brackets included
    pub message_id: String,
}

fn mailbox(mailbox: &Mailbox) -> Result<lettre::message::Mailbox, SendError> {
    Ok(lettre::message::Mailbox::new(
        mailbox.name().map(String::from),
        mailbox.address().as_str().parse()?,
    ))
}

fn attachment(attachment: &ResolvedAttachment) -> Result<SinglePart, SendError> {
    let content = STANDARD
        .decode(&attachment.encoded_content)
        .map_err(|err| {
            SendError::rejected(format!(
                "attachment \"{}\" is not base64: {err}",
                attachment.filename
            ))
        })?;

    let content_type = ContentType::parse(&attachment.mime_type).map_err(|err| {
        SendError::rejected(format!(
            "attachment \"{}\" has invalid MIME type \"{}\": {err}",
            attachment.filename, attachment.mime_type
        ))
    })?;

    Ok(Attachment::new(attachment.filename.clone()).body(content, content_type))
}

fn part(kind: ContentKind, content: &str) -> SinglePart {
    let content_type = match kind {
        ContentKind::Html => ContentType::TEXT_HTML,
        ContentKind::Text => ContentType::TEXT_PLAIN,
    };

    SinglePart::builder()
        .header(content_type)
        .body(content.to_string())
}

enum BodyPart {
    Single(SinglePart),
    Alternative(MultiPart),
}

fn body_part(body: &Body) -> BodyPart {
    match body {
        Body::Alternative { html, text } => BodyPart::Alternative(
            MultiPart::alternative_plain_html(text.clone(), html.clone()),
        ),
        single => BodyPart::Single(part(single.kind(), single.content())),
    }
}

/// Builds the MIME message for an email.
///
/// `keep_bcc` writes the `Bcc` header into the message, for APIs that read
/// recipients from the headers rather than from an SMTP envelope.
pub fn build(
    email: &Email,
    attachments: &[ResolvedAttachment],
    keep_bcc: bool,
) -> Result<MimeMessage, SendError> {
    let body = rendered_body(email)?;

    let message_id = format!(
        "<{}@{}>",
        Uuid::now_v7(),
        email.from().address().domain()
    );

    let mut builder = Message::builder()
        .from(mailbox(email.from())?)
        .subject(email.subject())
        .message_id(Some(message_id.clone()));

    for to in email.to() {
        builder = builder.to(mailbox(to)?);
    }

    for cc in email.cc() {
        builder = builder.cc(mailbox(cc)?);
    }

    for bcc in email.bcc() {
        builder = builder.bcc(mailbox(bcc)?);
    }

    if keep_bcc {
        builder = builder.keep_bcc();
    }

    let message = match (body_part(body), attachments.is_empty()) {
        (BodyPart::Single(body), true) => builder.singlepart(body)?,
        (BodyPart::Alternative(body), true) => builder.multipart(body)?,
        (body, false) => {
            let mut parts = match body {
                BodyPart::Single(body) => MultiPart::mixed().singlepart(body),
                BodyPart::Alternative(body) => MultiPart::mixed().multipart(body),
            };

            for resolved in attachments {
                parts = parts.singlepart(attachment(resolved)?);
            }

            builder.multipart(parts)?
        }
    };

    Ok(MimeMessage {
        message,
        message_id,
    })
}
