//! OpenAPI module

use utoipa::OpenApi;

use crate::{
    domain::communication::emails::{
        AttachmentDocument, BodyDocument, ContentKind, EmailDocument, MailboxDocument,
        TemplateDocument,
    },
    infrastructure::http::{
        errors::ErrorResponse,
        handlers::v1::{emails::send_email, uptime},
    },
};

/// The API's OpenAPI document
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Mailroom"),
    paths(send_email::handler, uptime::handler),
    components(schemas(
        EmailDocument,
        MailboxDocument,
        BodyDocument,
        ContentKind,
        TemplateDocument,
        AttachmentDocument,
        send_email::SendEmailResponse,
        uptime::UptimeResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDocs;
