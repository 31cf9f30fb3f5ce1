//! Template errors

use thiserror::Error;

/// Errors that can occur while rendering a template
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Neither the requested nor the default locale has the template
    #[error("template \"{key}\" not found for locale \"{locale}\"")]
    NotFound {
        /// The template key
        key: String,

        /// The locale that was requested
        locale: String,
    },

    /// A placeholder has no value
    #[error("template \"{key}\" uses undefined variable \"{variable}\"")]
    UndefinedVariable {
        /// The template key
        key: String,

        /// The placeholder's variable name
        variable: String,
    },

    /// The template store could not be read
    #[error("template store error: {0}")]
    Store(String),

    /// The rendered HTML could not have its CSS inlined
    #[error("could not inline CSS: {0}")]
    Inline(String),
}

impl TemplateError {
    /// Whether the template is missing rather than broken
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<css_inline::InlineError> for TemplateError {
    fn from(err: css_inline::InlineError) -> Self {
        TemplateError::Inline(err.to_string())
    }
}
