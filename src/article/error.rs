//! Article error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArticleError {
    /// No article with this slug (maps to a 404)
    #[error("article not found: {slug}")]
    NotFound { slug: String },

    /// Malformed front-matter or unreadable source; the file is skipped
    #[error("failed to parse `{}`: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// Article directory could not be read
    #[error("failed to read article directory `{}`", dir.display())]
    Load {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Payload could not be serialized
    #[error("failed to encode article payload")]
    Encode(#[from] serde_json::Error),
}

impl ArticleError {
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound { slug: slug.into() }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T, E = ArticleError> = std::result::Result<T, E>;
