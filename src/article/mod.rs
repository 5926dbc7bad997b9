//! Articles: Markdown files with front-matter, parsed and kept in memory.
//!
//! ```text
//! <dir>/<slug>.md ──► source::read ──► Article ──► ArticleStore (snapshot)
//!                      frontmatter       │
//!                      markdown          └── ArticleSummary (index)
//! ```

mod date;
mod error;
pub mod frontmatter;
pub mod markdown;
mod model;
pub mod source;
mod store;

pub use date::ArticleDate;
pub use error::{ArticleError, Result};
pub use markdown::MarkdownOptions;
pub use model::{Article, ArticleSummary, ChangeEvent, MetaMap};
pub use store::{ArticleStore, Reloaded, StoreOptions};
