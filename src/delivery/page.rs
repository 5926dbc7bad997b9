//! HTML assembly for article pages and the index.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::article::ArticleSummary;
use crate::embed::serve::{ARTICLE_HTML, ArticleVars, INDEX_HTML, IndexVars};

/// Characters escaped in a slug used as one URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape text for HTML content and attribute values.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => out.push_str(entity),
            None => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Make serialized JSON safe to inline in a `<script>` element.
///
/// `<` only occurs inside JSON strings, where `<` decodes back to it.
pub fn script_safe_json(json: &str) -> Cow<'_, str> {
    if json.contains('<') {
        Cow::Owned(json.replace('<', "\\u003c"))
    } else {
        Cow::Borrowed(json)
    }
}

/// `/articles/<slug>` with the slug percent-encoded.
pub fn article_href(slug: &str) -> String {
    format!("/articles/{}", utf8_percent_encode(slug, SEGMENT))
}

pub struct ArticleDocument<'a> {
    pub site_title: &'a str,
    pub slug: &'a str,
    pub title: &'a str,
    pub date: &'a str,
    /// Rendered article HTML, inserted as-is
    pub body: &'a str,
    /// Serialized payload JSON
    pub payload_json: &'a str,
    pub live_reload: bool,
}

pub fn article_document(doc: &ArticleDocument<'_>) -> String {
    let scripts = scripts(doc.live_reload);
    ARTICLE_HTML.render(&ArticleVars {
        site_title: &escape(doc.site_title),
        slug: &escape(doc.slug),
        title: &escape(doc.title),
        date: &escape(doc.date),
        body: doc.body,
        payload: &script_safe_json(doc.payload_json),
        scripts: &scripts,
    })
}

pub fn index_document(site_title: &str, articles: &[ArticleSummary], live_reload: bool) -> String {
    let mut items = String::new();
    for summary in articles {
        let date = summary.date.map(|d| d.to_string()).unwrap_or_default();
        items.push_str(&format!(
            "<li><a href=\"{}\">{}</a>",
            article_href(&summary.slug),
            escape(&summary.title)
        ));
        if !date.is_empty() {
            items.push_str(&format!(" <time datetime=\"{date}\">{date}</time>"));
        }
        items.push_str("</li>\n");
    }

    let scripts = scripts(live_reload);
    INDEX_HTML.render(&IndexVars {
        site_title: &escape(site_title),
        items: &items,
        scripts: &scripts,
    })
}

fn scripts(live_reload: bool) -> String {
    if live_reload {
        crate::embed::serve::livereload_tag()
    } else {
        String::new()
    }
}
