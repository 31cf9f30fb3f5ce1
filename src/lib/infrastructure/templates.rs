//! Template storage

use std::path::PathBuf;

use clap::Parser;

use crate::domain::communication::templates::Locale;

mod filesystem;

pub use filesystem::FileSystemTemplateStore;

/// Template configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct TemplateConfig {
    /// The directory holding `<key>/<locale>.html` and `<key>/<locale>.txt` templates
    #[arg(long, env = "TEMPLATE_DIR", default_value = "templates")]
    pub template_dir: PathBuf,

    /// The locale used when an email has none, or its own has no template
    #[arg(long, env = "DEFAULT_LOCALE", default_value = "eng")]
    pub default_locale: Locale,

    /// Inline `<style>` rules into rendered HTML
    #[arg(
        long,
        env = "TEMPLATE_INLINE_CSS",
        default_value_t = false,
        action = clap::ArgAction::Set
    )]
    pub inline_css: bool,
}
