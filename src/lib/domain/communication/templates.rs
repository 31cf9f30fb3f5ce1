//! Localized templates

mod errors;
mod locale;
mod renderer;
mod store;

pub use errors::TemplateError;
pub use locale::{Locale, LocaleError, BASE_LOCALE};
pub use renderer::{RenderedTemplate, TemplateRenderer};
pub use store::{InMemoryTemplateStore, TemplateSource, TemplateStore};

#[cfg(test)]
pub mod tests {
    pub use super::store::MockTemplateStore;
}
