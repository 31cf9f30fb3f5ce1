//! Template stores

use std::collections::HashMap;

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::emails::ContentKind;

use super::{Locale, TemplateError};

/// The source of a single localized template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateSource {
    /// Whether the template renders HTML or plain text
    pub kind: ContentKind,

    /// The unrendered template, with `{{ name }}` placeholders
    pub source: String,
}

impl TemplateSource {
    /// An HTML template
    pub fn html(source: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Html,
            source: source.into(),
        }
    }

    /// A plain text template
    pub fn text(source: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            source: source.into(),
        }
    }
}

/// Somewhere localized templates are kept
#[async_trait]
pub trait TemplateStore: Clone + Send + Sync + 'static {
    /// Looks up the template for exactly this key and locale.
    ///
    /// # Returns
    /// - [`Ok`] with [`None`] when there is no such template.
    /// - [`Err`] when the store itself could not be read.
    async fn lookup(
        &self,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<TemplateSource>, TemplateError>;
}

#[cfg(test)]
mock! {
    pub TemplateStore {}

    impl Clone for TemplateStore {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl TemplateStore for TemplateStore {
        async fn lookup(&self, key: &str, locale: &Locale) -> Result<Option<TemplateSource>, TemplateError>;
    }
}

/// Templates held in memory, keyed by template key and locale
#[derive(Clone, Debug, Default)]
pub struct InMemoryTemplateStore {
    templates: HashMap<(String, Locale), TemplateSource>,
}

impl InMemoryTemplateStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a template, replacing any previous one for the same key and locale
    pub fn insert(&mut self, key: impl Into<String>, locale: Locale, template: TemplateSource) {
        self.templates.insert((key.into(), locale), template);
    }

    /// Adds a template
    pub fn with_template(
        mut self,
        key: impl Into<String>,
        locale: Locale,
        template: TemplateSource,
    ) -> Self {
        self.insert(key, locale, template);
        self
    }
}

#[async_trait]
impl TemplateStore for InMemoryTemplateStore {
    async fn lookup(
        &self,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<TemplateSource>, TemplateError> {
        Ok(self
            .templates
            .get(&(key.to_string(), locale.clone()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn test_in_memory_lookup_is_exact() -> TestResult {
        let store = InMemoryTemplateStore::new()
            .with_template("welcome", Locale::new("eng")?, TemplateSource::text("Hi"))
            .with_template("welcome", Locale::new("fra")?, TemplateSource::text("Salut"));

        assert_eq!(
            store.lookup("welcome", &Locale::new("fra")?).await?,
            Some(TemplateSource::text("Salut"))
        );
        assert_eq!(store.lookup("welcome", &Locale::new("fra-FR")?).await?, None);
        assert_eq!(store.lookup("goodbye", &Locale::new("eng")?).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_insert_replaces() -> TestResult {
        let mut store = InMemoryTemplateStore::new();

        store.insert("welcome", Locale::default(), TemplateSource::text("one"));
        store.insert("welcome", Locale::default(), TemplateSource::html("two"));

        assert_eq!(
            store.lookup("welcome", &Locale::default()).await?,
            Some(TemplateSource::html("two"))
        );

        Ok(())
    }
}
