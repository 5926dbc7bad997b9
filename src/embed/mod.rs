//! Embedded static resources.
//!
//! - `template` - placeholder templates with typed variables
//! - `serve` - page shells and the live reload client
//!
//! ```ignore
//! use embed::serve::{LIVERELOAD_JS, LivereloadVars};
//!
//! let js = LIVERELOAD_JS.render(&LivereloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars, fill};

pub mod serve {
    use super::{Template, TemplateVars, fill};

    /// URL the live reload client is served from.
    pub const LIVERELOAD_PATH: &str = "/livereload.js";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            let port = self.ws_port.to_string();
            fill(content, &[("__FOLIO_WS_PORT__", port.as_str())])
        }
    }

    /// Live reload client with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    /// Variables for article.html. All values must already be escaped.
    pub struct ArticleVars<'a> {
        pub site_title: &'a str,
        pub slug: &'a str,
        pub title: &'a str,
        pub date: &'a str,
        pub body: &'a str,
        /// Payload JSON, safe to place inside `<script>`
        pub payload: &'a str,
        pub scripts: &'a str,
    }

    impl TemplateVars for ArticleVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(
                content,
                &[
                    ("__SITE_TITLE__", self.site_title),
                    ("__SLUG__", self.slug),
                    ("__TITLE__", self.title),
                    ("__DATE__", self.date),
                    ("__BODY__", self.body),
                    ("__PAYLOAD__", self.payload),
                    ("__SCRIPTS__", self.scripts),
                ],
            )
        }
    }

    /// Full-page shell for a single article.
    pub const ARTICLE_HTML: Template<ArticleVars<'static>> =
        Template::new(include_str!("serve/article.html"));

    /// Variables for index.html. All values must already be escaped.
    pub struct IndexVars<'a> {
        pub site_title: &'a str,
        pub items: &'a str,
        pub scripts: &'a str,
    }

    impl TemplateVars for IndexVars<'_> {
        fn apply(&self, content: &str) -> String {
            fill(
                content,
                &[
                    ("__SITE_TITLE__", self.site_title),
                    ("__ITEMS__", self.items),
                    ("__SCRIPTS__", self.scripts),
                ],
            )
        }
    }

    /// Article index page.
    pub const INDEX_HTML: Template<IndexVars<'static>> =
        Template::new(include_str!("serve/index.html"));

    /// `<script>` tag loading the live reload client.
    pub fn livereload_tag() -> String {
        format!("<script src=\"{LIVERELOAD_PATH}\"></script>\n")
    }

}
