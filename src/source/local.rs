use super::{Document, Result, SourceError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads `<root>/<document>.json`. Never cached.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, document: Document) -> PathBuf {
        self.root.join(document.file_name())
    }

    pub fn fetch(&self, document: Document) -> Result<Value> {
        let path = self.path_for(document);
        let text = fs::read_to_string(&path).map_err(|source| SourceError::Read {
            document,
            path: path.clone(),
            source,
        })?;
        let value = serde_json::from_str(&text)
            .map_err(|source| SourceError::Malformed { document, source })?;
        tracing::debug!(%document, path = %path.display(), "read snapshot file");
        Ok(value)
    }
}
