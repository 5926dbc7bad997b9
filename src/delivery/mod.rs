//! Delivery layer: one payload contract for server-rendered pages and client
//! fetches, plus fan-out of change notifications.
//!
//! ```text
//!                ┌──► render(slug) ──► full HTML page (payload embedded)
//! payload(slug) ─┤
//!                └──► fetch(slug)  ──► payload JSON
//!
//! StoreActor ──publish(ChangeEvent)──► Hub ──► Subscription (one per client)
//! ```
//!
//! `render` and `fetch` both start from the same [`ArticlePayload`], so a
//! client that hydrates from the page and later fetches the JSON sees the
//! same title, date and HTML.

mod hub;
pub mod page;

use std::sync::Arc;

use serde::Serialize;

use crate::article::{ArticleDate, ArticleStore, ArticleSummary, ChangeEvent, MetaMap, Result};

pub use hub::{Hub, Subscription};

/// What a client needs to show one article.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticlePayload {
    pub slug: String,
    pub title: String,
    pub date: Option<ArticleDate>,
    pub html: String,
    pub meta: MetaMap,
}

/// Server-rendered page for one article.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub payload: ArticlePayload,
    /// Complete HTML document
    pub document: String,
}

#[derive(Serialize)]
struct IndexPayload<'a> {
    title: &'a str,
    articles: &'a [ArticleSummary],
}

#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    pub site_title: String,
    /// Add the live reload client to rendered pages
    pub live_reload: bool,
}

pub struct Delivery {
    store: Arc<ArticleStore>,
    hub: Hub,
    options: DeliveryOptions,
}

impl Delivery {
    pub fn new(store: Arc<ArticleStore>, options: DeliveryOptions) -> Self {
        Self {
            store,
            hub: Hub::new(),
            options,
        }
    }

    pub fn store(&self) -> &Arc<ArticleStore> {
        &self.store
    }

    pub fn options(&self) -> &DeliveryOptions {
        &self.options
    }

    /// Shared contract behind `render` and `fetch`.
    pub fn payload(&self, slug: &str) -> Result<ArticlePayload> {
        let article = self.store.get(slug)?;
        Ok(ArticlePayload {
            slug: article.slug.clone(),
            title: article.title.clone(),
            date: article.date,
            html: article.html.clone(),
            meta: article.meta.clone(),
        })
    }

    /// Full HTML page with the payload embedded for hydration.
    pub fn render(&self, slug: &str) -> Result<RenderedPage> {
        let payload = self.payload(slug)?;
        let payload_json = serde_json::to_string(&payload)?;
        let date = payload.date.map(|d| d.to_string()).unwrap_or_default();

        let document = page::article_document(&page::ArticleDocument {
            site_title: &self.options.site_title,
            slug: &payload.slug,
            title: &payload.title,
            date: &date,
            body: &payload.html,
            payload_json: &payload_json,
            live_reload: self.options.live_reload,
        });

        Ok(RenderedPage { payload, document })
    }

    /// The payload as JSON, for client-side navigation.
    pub fn fetch(&self, slug: &str) -> Result<String> {
        Ok(serde_json::to_string(&self.payload(slug)?)?)
    }

    /// `{title, articles: [...]}` for the current index.
    pub fn index_json(&self) -> Result<String> {
        let articles = self.store.list();
        Ok(serde_json::to_string(&IndexPayload {
            title: &self.options.site_title,
            articles: &articles,
        })?)
    }

    pub fn index_page(&self) -> String {
        page::index_document(
            &self.options.site_title,
            &self.store.list(),
            self.options.live_reload,
        )
    }

    // ========================================================================
    // Push
    // ========================================================================

    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    /// Push an event to all subscribers; returns how many received it.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        self.hub.publish(event)
    }

    pub fn hub(&self) -> &Hub {
        &self.hub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::StoreOptions;
    use std::fs;
    use tempfile::TempDir;

    fn delivery(files: &[(&str, &str)]) -> (TempDir, Delivery) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let store = Arc::new(ArticleStore::new(StoreOptions::new(temp.path())));
        store.load_all().unwrap();
        let delivery = Delivery::new(
            store,
            DeliveryOptions {
                site_title: "Blog".into(),
                live_reload: true,
            },
        );
        (temp, delivery)
    }

    /// Pull the embedded hydration payload back out of a rendered page.
    fn embedded_payload(document: &str) -> serde_json::Value {
        let open = "<script type=\"application/json\" id=\"folio-article\">";
        let start = document.find(open).unwrap() + open.len();
        let end = start + document[start..].find("</script>").unwrap();
        serde_json::from_str(&document[start..end]).unwrap()
    }

    const HELLO: &str = "---\ntitle: Hello\ndate: 2015-06-12\nauthor: Jane\n---\n# Hello </script>";

    #[test]
    fn test_render_and_fetch_agree() {
        let (_temp, delivery) = delivery(&[("hello.md", HELLO)]);

        let page = delivery.render("hello").unwrap();
        let fetched: serde_json::Value =
            serde_json::from_str(&delivery.fetch("hello").unwrap()).unwrap();

        assert_eq!(serde_json::to_value(&page.payload).unwrap(), fetched);
        assert_eq!(embedded_payload(&page.document), fetched);
        assert_eq!(fetched["title"], "Hello");
        assert_eq!(fetched["date"], "2015-06-12");
        assert_eq!(fetched["meta"]["author"], "Jane");
    }

    #[test]
    fn test_render_contains_article_html() {
        let (_temp, delivery) = delivery(&[("test.md", "---\ntitle: Test\n---\n# Hello")]);

        let page = delivery.render("test").unwrap();
        assert_eq!(page.payload.html, "<h1>Hello</h1>\n");
        assert!(page.document.contains("<h1>Hello</h1>"));
        assert!(page.document.contains("<title>Test · Blog</title>"));
        assert!(page.document.contains("/livereload.js"));
    }

    #[test]
    fn test_unknown_slug_is_not_found() {
        let (_temp, delivery) = delivery(&[]);
        assert!(delivery.render("nope").unwrap_err().is_not_found());
        assert!(delivery.fetch("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_index_json() {
        let (_temp, delivery) = delivery(&[
            ("a.md", "---\ntitle: A\ndate: 2015-01-01\n---\n"),
            ("b.md", "---\ntitle: B\ndate: 2015-02-01\n---\n"),
        ]);
        let json: serde_json::Value = serde_json::from_str(&delivery.index_json().unwrap()).unwrap();

        assert_eq!(json["title"], "Blog");
        assert_eq!(json["articles"][0]["slug"], "b");
        assert_eq!(json["articles"][1]["slug"], "a");
    }

    #[test]
    fn test_subscriber_gets_published_event() {
        let (temp, delivery) = delivery(&[("test.md", "---\ntitle: Test\n---\n# Hello")]);
        let mut sub = delivery.subscribe();

        fs::write(temp.path().join("test.md"), "---\ntitle: Test\n---\n# Hello World").unwrap();
        let reloaded = delivery.store().reload("test").unwrap();
        assert_eq!(delivery.publish(&ChangeEvent::updated(&reloaded.article)), 1);

        let event = sub.try_recv().unwrap();
        assert_eq!(event.slug, "test");
        assert_eq!(event.html, "<h1>Hello World</h1>\n");
        assert!(sub.try_recv().is_none());
    }
}
