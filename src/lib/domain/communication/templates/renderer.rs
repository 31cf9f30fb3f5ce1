//! Template rendering

use std::{collections::BTreeMap, sync::Arc};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::domain::communication::emails::{sanitize, Body, ContentKind};

use super::{Locale, TemplateError, TemplateSource, TemplateStore};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.-]*)\s*\}\}").unwrap();
    static ref TITLE_REGEX: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
}

/// A rendered template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedTemplate {
    /// The body to send
    pub body: Body,

    /// The sanitized `<title>` of an HTML template, when it has a non-blank one
    pub subject: Option<String>,
}

/// Renders localized templates from a [`TemplateStore`]
#[derive(Clone, Debug)]
pub struct TemplateRenderer<S>
where
    S: TemplateStore,
{
    store: Arc<S>,
    default_locale: Locale,
    inline_css: bool,
}

impl<S> TemplateRenderer<S>
where
    S: TemplateStore,
{
    /// Creates a renderer falling back to `default_locale`
    pub fn new(store: Arc<S>, default_locale: Locale) -> Self {
        Self {
            store,
            default_locale,
            inline_css: false,
        }
    }

    /// Enables inlining of `<style>` rules into rendered HTML
    pub fn with_inline_css(mut self, inline_css: bool) -> Self {
        self.inline_css = inline_css;
        self
    }

    /// The locale used when an email has none, or its own has no template
    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Renders the template `key` in `locale`.
    ///
    /// Falls back to the default locale when the requested one has no such
    /// template.
    ///
    /// # Returns
    /// - [`Ok`] with the [`RenderedTemplate`].
    /// - [`Err`] with [`TemplateError::NotFound`] when neither locale has the template.
    /// - [`Err`] with [`TemplateError::UndefinedVariable`] when a placeholder has no value.
    pub async fn render(
        &self,
        key: &str,
        locale: &Locale,
        variables: &BTreeMap<String, String>,
    ) -> Result<RenderedTemplate, TemplateError> {
        let template = self.find(key, locale).await?;

        let mut content = substitute(key, &template, variables)?;

        let subject = match template.kind {
            ContentKind::Html => title(&content),
            ContentKind::Text => None,
        };

        if self.inline_css && template.kind == ContentKind::Html {
            content = css_inline::inline(&content)?;
        }

        Ok(RenderedTemplate {
            body: Body::new(template.kind, content),
            subject,
        })
    }

    async fn find(&self, key: &str, locale: &Locale) -> Result<TemplateSource, TemplateError> {
        if let Some(template) = self.store.lookup(key, locale).await? {
            return Ok(template);
        }

        if *locale != self.default_locale {
            debug!(key, %locale, default = %self.default_locale, "falling back to default locale");

            if let Some(template) = self.store.lookup(key, &self.default_locale).await? {
                return Ok(template);
            }
        }

        Err(TemplateError::NotFound {
            key: key.to_string(),
            locale: locale.to_string(),
        })
    }
}

fn substitute(
    key: &str,
    template: &TemplateSource,
    variables: &BTreeMap<String, String>,
) -> Result<String, TemplateError> {
    let mut rendered = String::with_capacity(template.source.len());
    let mut last = 0;

    for captures in PLACEHOLDER_REGEX.captures_iter(&template.source) {
        let (Some(placeholder), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        let value = variables
            .get(name.as_str())
            .ok_or_else(|| TemplateError::UndefinedVariable {
                key: key.to_string(),
                variable: name.as_str().to_string(),
            })?;

        rendered.push_str(&template.source[last..placeholder.start()]);

        match template.kind {
            ContentKind::Html => rendered.push_str(&escape(value)),
            ContentKind::Text => rendered.push_str(value),
        }

        last = placeholder.end();
    }

    rendered.push_str(&template.source[last..]);

    Ok(rendered)
}

fn escape(value: &str) -> String {
    askama::MarkupDisplay::new_unsafe(value, askama::Html).to_string()
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn title(html: &str) -> Option<String> {
    TITLE_REGEX
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|title| sanitize(&unescape(title.as_str())))
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::communication::templates::{tests::MockTemplateStore, InMemoryTemplateStore};

    use super::*;

    fn variables(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn store() -> TestResult<InMemoryTemplateStore> {
        Ok(InMemoryTemplateStore::new()
            .with_template(
                "welcome",
                Locale::new("eng")?,
                TemplateSource::html(
                    "<html><head><title>  welcome,  {{ name }} </title></head><body><p>Hello {{name}}</p></body></html>",
                ),
            )
            .with_template(
                "welcome",
                Locale::new("fra")?,
                TemplateSource::html("<p>Bonjour {{ name }}</p>"),
            )
            .with_template(
                "receipt",
                Locale::new("eng")?,
                TemplateSource::text("Total: {{ total }} for {{ name }}"),
            ))
    }

    fn renderer() -> TestResult<TemplateRenderer<InMemoryTemplateStore>> {
        Ok(TemplateRenderer::new(Arc::new(store()?), Locale::default()))
    }

    #[tokio::test]
    async fn test_render_requested_locale() -> TestResult {
        let rendered = renderer()?
            .render("welcome", &Locale::new("fra")?, &variables(&[("name", "Bob")]))
            .await?;

        assert_eq!(rendered.body, Body::html("<p>Bonjour Bob</p>"));
        assert_eq!(rendered.subject, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_locale_falls_back_to_default() -> TestResult {
        let rendered = renderer()?
            .render("welcome", &Locale::new("vie")?, &variables(&[("name", "Bob")]))
            .await?;

        assert!(rendered.body.content().contains("<p>Hello Bob</p>"));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_found() -> TestResult {
        let result = renderer()?
            .render("goodbye", &Locale::new("fra")?, &BTreeMap::new())
            .await;

        assert_eq!(
            result,
            Err(TemplateError::NotFound {
                key: "goodbye".to_string(),
                locale: "fra".to_string()
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_title_becomes_sanitized_subject() -> TestResult {
        let rendered = renderer()?
            .render("welcome", &Locale::default(), &variables(&[("name", "Tom & Jerry")]))
            .await?;

        assert_eq!(rendered.subject, Some("Welcome, Tom & Jerry".to_string()));
        assert!(rendered.body.content().contains("Hello Tom &amp; Jerry"));

        Ok(())
    }

    #[tokio::test]
    async fn test_html_values_are_escaped() -> TestResult {
        let rendered = renderer()?
            .render(
                "welcome",
                &Locale::new("fra")?,
                &variables(&[("name", "<script>\"x\"</script>")]),
            )
            .await?;

        assert!(!rendered.body.content().contains("<script>"));
        assert!(rendered.body.content().contains("&lt;script&gt;"));

        Ok(())
    }

    #[tokio::test]
    async fn test_text_values_are_verbatim() -> TestResult {
        let rendered = renderer()?
            .render(
                "receipt",
                &Locale::default(),
                &variables(&[("total", "<10>"), ("name", "Bob"), ("unused", "x")]),
            )
            .await?;

        assert_eq!(rendered.body, Body::text("Total: <10> for Bob"));
        assert_eq!(rendered.subject, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_undefined_variable() -> TestResult {
        let result = renderer()?
            .render("receipt", &Locale::default(), &variables(&[("name", "Bob")]))
            .await;

        assert_eq!(
            result,
            Err(TemplateError::UndefinedVariable {
                key: "receipt".to_string(),
                variable: "total".to_string()
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_rendering_is_deterministic() -> TestResult {
        let renderer = renderer()?;
        let variables = variables(&[("name", "Bob")]);

        assert_eq!(
            renderer.render("welcome", &Locale::default(), &variables).await?,
            renderer.render("welcome", &Locale::default(), &variables).await?
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_inline_css() -> TestResult {
        let store = InMemoryTemplateStore::new().with_template(
            "styled",
            Locale::default(),
            TemplateSource::html(
                "<html><head><style>p { color: red; }</style></head><body><p>{{ name }}</p></body></html>",
            ),
        );

        let renderer =
            TemplateRenderer::new(Arc::new(store), Locale::default()).with_inline_css(true);

        let rendered = renderer
            .render("styled", &Locale::default(), &variables(&[("name", "Bob")]))
            .await?;

        assert!(rendered.body.content().contains(r#"<p style=""#));
        assert!(rendered.body.content().contains("red"));
        assert!(!rendered.body.content().contains("<style>"));

        Ok(())
    }

    #[tokio::test]
    async fn test_store_errors_propagate() -> TestResult {
        let mut store = MockTemplateStore::new();

        store
            .expect_lookup()
            .withf(|key, _| key == "welcome")
            .times(1)
            .returning(|_, _| Err(TemplateError::Store("disk on fire".to_string())));

        let renderer = TemplateRenderer::new(Arc::new(store), Locale::default());

        let result = renderer
            .render("welcome", &Locale::default(), &BTreeMap::new())
            .await;

        assert_eq!(result, Err(TemplateError::Store("disk on fire".to_string())));

        Ok(())
    }

    #[tokio::test]
    async fn test_default_locale_is_not_looked_up_twice() -> TestResult {
        let mut store = MockTemplateStore::new();

        store.expect_lookup().times(1).returning(|_, _| Ok(None));

        let renderer = TemplateRenderer::new(Arc::new(store), Locale::default());

        let result = renderer
            .render("welcome", &Locale::default(), &BTreeMap::new())
            .await;

        assert!(matches!(result, Err(TemplateError::NotFound { .. })));

        Ok(())
    }
}
