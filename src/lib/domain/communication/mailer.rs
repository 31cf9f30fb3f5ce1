//! Sending emails through providers

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::{
    attachments::ResolvedAttachment,
    emails::{Body, Email},
};

mod credentials;
mod errors;
mod provider;
mod result;
mod transport;

pub use credentials::{Credentials, CredentialsError, CredentialsSupplier, StaticCredentials};
pub use errors::SendError;
pub use provider::{Provider, UnknownProviderError};
pub use result::SendResult;
pub use transport::{
    submit_with_timeout, HttpTransport, TransportFailure, TransportRequest, TransportResponse,
    DEFAULT_TIMEOUT,
};

/// Sends rendered emails through a provider
#[async_trait]
pub trait Mailer: Clone + Send + Sync + 'static {
    /// The provider this mailer sends through
    fn provider(&self) -> Provider;

    /// Sends an email with one remote call.
    ///
    /// # Arguments
    /// * `email` - The email, already rendered, with its sanitized subject.
    /// * `attachments` - The email's attachments, resolved and in order.
    ///
    /// # Returns
    /// - [`Ok`] with the [`SendResult`] when the provider accepted the email.
    /// - [`Err`] with a [`SendError`] classifying the failure otherwise.
    async fn send(
        &self,
        email: &Email,
        attachments: &[ResolvedAttachment],
    ) -> Result<SendResult, SendError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Clone for Mailer {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl Mailer for Mailer {
        fn provider(&self) -> Provider;
        async fn send(&self, email: &Email, attachments: &[ResolvedAttachment]) -> Result<SendResult, SendError>;
    }
}

/// Gets the body of an email that has been rendered
pub fn rendered_body(email: &Email) -> Result<&Body, SendError> {
    email
        .body()
        .ok_or_else(|| SendError::rejected("email template has not been rendered"))
}
