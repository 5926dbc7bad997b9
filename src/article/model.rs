//! Article data types.

use std::cmp::Ordering;
use std::path::PathBuf;

use serde::Serialize;

use super::ArticleDate;

/// Open front-matter map (`key -> string | number | bool | array | null`).
///
/// Consumers validate the values they care about; nothing here enforces a
/// schema beyond the handful of fields lifted into [`Article`].
pub type MetaMap = serde_json::Map<String, serde_json::Value>;

/// A parsed article.
///
/// Articles are immutable once built. A reload produces a new value that
/// replaces the old one in the store snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// File stem of the source file
    pub slug: String,
    /// `title` from front-matter, falling back to the slug
    pub title: String,
    pub date: Option<ArticleDate>,
    pub draft: bool,
    pub tags: Vec<String>,
    /// The complete front-matter block, including the lifted keys
    pub meta: MetaMap,
    /// Markdown body (front-matter stripped)
    pub source: String,
    /// Rendered HTML body
    pub html: String,
    pub path: PathBuf,
    /// blake3 of the raw file contents
    pub fingerprint: String,
}

impl Article {
    pub fn summary(&self) -> ArticleSummary {
        ArticleSummary {
            slug: self.slug.clone(),
            title: self.title.clone(),
            date: self.date,
            tags: self.tags.clone(),
        }
    }
}

/// One row of the article index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub date: Option<ArticleDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ArticleSummary {
    /// Index order: newest first, undated last, then by slug.
    pub fn index_order(a: &Self, b: &Self) -> Ordering {
        match (&a.date, &b.date) {
            (Some(da), Some(db)) => db.cmp(da).then_with(|| a.slug.cmp(&b.slug)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.slug.cmp(&b.slug),
        }
    }
}

/// What happened to an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Updated,
    Removed,
}

/// Notification pushed to subscribers after the store changed.
///
/// `html` is the new rendered body, empty for removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub slug: String,
    pub html: String,
}

impl ChangeEvent {
    pub fn updated(article: &Article) -> Self {
        Self {
            kind: EventKind::Updated,
            slug: article.slug.clone(),
            html: article.html.clone(),
        }
    }

    pub fn removed(slug: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Removed,
            slug: slug.into(),
            html: String::new(),
        }
    }
}
