//! URL routing for the article server.
//!
//! | Path                   | Route        |
//! |------------------------|--------------|
//! | `/`                    | `Index`      |
//! | `/articles/{slug}`     | `Article`    |
//! | `/api/articles`        | `ApiIndex`   |
//! | `/api/articles/{slug}` | `ApiArticle` |
//! | `/livereload.js`       | `Livereload` (only while watching) |

use percent_encoding::percent_decode_str;

use crate::embed::serve::LIVERELOAD_PATH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Index,
    Article(String),
    ApiIndex,
    ApiArticle(String),
    Livereload,
    NotFound,
}

impl Route {
    /// Map a request URL (path plus optional query) to a route.
    pub fn parse(url: &str, live_reload: bool) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        match path {
            "/" | "" => Self::Index,
            "/api/articles" => Self::ApiIndex,
            p if p == LIVERELOAD_PATH && live_reload => Self::Livereload,
            p => {
                if let Some(slug) = p.strip_prefix("/api/articles/") {
                    decode_slug(slug).map_or(Self::NotFound, Self::ApiArticle)
                } else if let Some(slug) = p.strip_prefix("/articles/") {
                    decode_slug(slug).map_or(Self::NotFound, Self::Article)
                } else {
                    Self::NotFound
                }
            }
        }
    }
}

/// Percent-decode a single path segment. Slugs never contain `/`.
fn decode_slug(raw: &str) -> Option<String> {
    let slug = percent_decode_str(raw).decode_utf8().ok()?;
    if slug.is_empty() || slug.contains('/') {
        return None;
    }
    Some(slug.into_owned())
}
