//! Email dispatch service

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::{
    attachments::{resolve_all, ResolvedAttachment},
    errors::DispatchError,
    mailer::{Mailer, SendResult},
    templates::{TemplateRenderer, TemplateStore},
};

use super::{sanitize, Content, Email};

/// Email service
#[async_trait]
pub trait EmailService: Clone + Send + Sync + 'static {
    /// Sanitizes, renders and sends an email with a single provider call.
    ///
    /// Nothing is sent when the template or an attachment is invalid. A
    /// failed send is not retried.
    ///
    /// # Returns
    /// - [`Ok`] with the provider's [`SendResult`].
    /// - [`Err`] with a [`DispatchError`] describing what failed.
    async fn send_email(&self, email: Email) -> Result<SendResult, DispatchError>;
}

#[cfg(test)]
mock! {
    pub EmailService {}

    impl Clone for EmailService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl EmailService for EmailService {
        async fn send_email(&self, email: Email) -> Result<SendResult, DispatchError>;
    }
}

/// Email service implementation
#[derive(Debug, Clone)]
pub struct EmailServiceImpl<M, S>
where
    M: Mailer,
    S: TemplateStore,
{
    mailer: Arc<M>,
    renderer: Arc<TemplateRenderer<S>>,
}

impl<M, S> EmailServiceImpl<M, S>
where
    M: Mailer,
    S: TemplateStore,
{
    /// Creates a new email service.
    pub fn new(mailer: Arc<M>, renderer: Arc<TemplateRenderer<S>>) -> Self {
        Self { mailer, renderer }
    }

    async fn prepare(&self, email: Email) -> Result<(Email, Vec<ResolvedAttachment>), DispatchError> {
        let locale = email
            .locale()
            .cloned()
            .unwrap_or_else(|| self.renderer.default_locale().clone());

        let mut subject = sanitize(email.subject());

        let body = match email.content() {
            Content::Body(body) => body.clone(),
            Content::Template(reference) => {
                let rendered = self
                    .renderer
                    .render(&reference.key, &locale, &reference.variables)
                    .await?;

                if subject.is_empty() {
                    subject = rendered.subject.unwrap_or_default();
                }

                rendered.body
            }
        };

        let attachments = resolve_all(email.attachments())?;

        Ok((email.with_rendered(subject, body), attachments))
    }

    async fn dispatch(&self, email: Email) -> Result<SendResult, DispatchError> {
        let (email, attachments) = self.prepare(email).await?;

        match self.mailer.send(&email, &attachments).await {
            Ok(result) => {
                info!(
                    message_id = %result.provider_message_id,
                    recipients = email.recipients().count(),
                    attachments = attachments.len(),
                    "email sent"
                );

                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, retryable = err.is_retryable(), "email not sent");

                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl<M, S> EmailService for EmailServiceImpl<M, S>
where
    M: Mailer,
    S: TemplateStore,
{
    async fn send_email(&self, email: Email) -> Result<SendResult, DispatchError> {
        let span = info_span!(
            "dispatch_email",
            dispatch_id = %Uuid::now_v7(),
            provider = %self.mailer.provider()
        );

        self.dispatch(email).instrument(span).await
    }
}
