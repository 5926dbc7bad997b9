//! `[content]` section configuration.
//!
//! ```toml
//! [content]
//! dir = "articles"                 # relative to folio.toml, `~` expanded
//! extensions = ["md", "markdown"]  # without the dot
//! drafts = false                   # list drafts in the index
//! ```
//!
//! The directory is scanned non-recursively.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
    pub drafts: bool,
}

impl ContentConfig {
    pub const DIR: FieldPath = FieldPath::new("content.dir");
    pub const EXTENSIONS: FieldPath = FieldPath::new("content.extensions");

    /// Drop leading dots and empty entries (`".md"` → `"md"`).
    pub(crate) fn normalize_extensions(&mut self) {
        self.extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
    }

    pub(crate) fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error_with_hint(
                Self::EXTENSIONS,
                "at least one extension is required",
                "extensions = [\"md\"]",
            );
        }
        if self.dir.as_os_str().is_empty() {
            diag.error(Self::DIR, "must not be empty");
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("articles"),
            extensions: vec!["md".to_string(), "markdown".to_string()],
            drafts: false,
        }
    }
}
