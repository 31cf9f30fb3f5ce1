//! Templates on disk

use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::communication::{
    emails::ContentKind,
    templates::{Locale, TemplateError, TemplateSource, TemplateStore},
};

/// File extensions tried for each template, in order
const EXTENSIONS: [(&str, ContentKind); 2] = [("html", ContentKind::Html), ("txt", ContentKind::Text)];

/// Templates laid out as `<root>/<key>/<locale>.html` or
/// `<root>/<key>/<locale>.txt`
#[derive(Clone, Debug)]
pub struct FileSystemTemplateStore {
    root: PathBuf,
}

impl FileSystemTemplateStore {
    /// Creates a store reading templates under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The template directory for `key`, unless the key would leave the root
    fn directory(&self, key: &str) -> Option<PathBuf> {
        let key = Path::new(key);

        let contained = key.components().next().is_some()
            && key
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        contained.then(|| self.root.join(key))
    }
}

#[async_trait]
impl TemplateStore for FileSystemTemplateStore {
    async fn lookup(
        &self,
        key: &str,
        locale: &Locale,
    ) -> Result<Option<TemplateSource>, TemplateError> {
        let Some(directory) = self.directory(key) else {
            debug!(key, "template key escapes the template root");
            return Ok(None);
        };

        for (extension, kind) in EXTENSIONS {
            let path = directory.join(format!("{locale}.{extension}"));

            match tokio::fs::read_to_string(&path).await {
                Ok(source) => {
                    debug!(path = %path.display(), "loaded template");
                    return Ok(Some(TemplateSource { kind, source }));
                }
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(TemplateError::Store(format!(
                        "could not read {}: {err}",
                        path.display()
                    )))
                }
            }
        }

        Ok(None)
    }
}
