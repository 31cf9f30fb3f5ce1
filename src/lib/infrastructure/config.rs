//! Application configuration

use std::sync::Arc;

use clap::Parser;

use crate::{
    domain::communication::{emails::EmailServiceImpl, templates::TemplateRenderer},
    infrastructure::{
        email::{CredentialsConfig, MailerConfig, ProviderAdapter, ReqwestTransport},
        templates::{FileSystemTemplateStore, TemplateConfig},
    },
};

/// The email service built from [`MailroomConfig`]
pub type MailroomService = EmailServiceImpl<
    ProviderAdapter<ReqwestTransport, CredentialsConfig>,
    FileSystemTemplateStore,
>;

/// Everything needed to send email
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct MailroomConfig {
    /// The provider and how to reach it
    #[clap(flatten)]
    pub mailer: MailerConfig,

    /// Provider credentials
    #[clap(flatten)]
    pub credentials: CredentialsConfig,

    /// Where templates live and how they are rendered
    #[clap(flatten)]
    pub templates: TemplateConfig,
}

impl MailroomConfig {
    /// Builds the email service for the configured provider
    pub fn email_service(&self) -> MailroomService {
        let mailer = ProviderAdapter::from_config(
            &self.mailer,
            Arc::new(ReqwestTransport::new()),
            self.credentials.clone(),
        );

        let store = FileSystemTemplateStore::new(self.templates.template_dir.clone());

        let renderer = TemplateRenderer::new(Arc::new(store), self.templates.default_locale.clone())
            .with_inline_css(self.templates.inline_css);

        EmailServiceImpl::new(Arc::new(mailer), Arc::new(renderer))
    }
}
