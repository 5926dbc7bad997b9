//! `list` and `show`: one-shot reads of the article store.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::article::ArticleStore;
use crate::config::FolioConfig;
use crate::delivery::{Delivery, DeliveryOptions};

fn open(config: &FolioConfig) -> Result<Delivery> {
    let store = Arc::new(ArticleStore::new(config.store_options()));
    store.load_all()?;
    Ok(Delivery::new(
        store,
        DeliveryOptions {
            site_title: config.site.title.clone(),
            live_reload: false,
        },
    ))
}

/// Print the article index as JSON.
pub fn list(config: &FolioConfig, pretty: bool, out: &mut impl Write) -> Result<()> {
    let delivery = open(config)?;
    let json = delivery.index_json()?;
    if pretty {
        let value: serde_json::Value = serde_json::from_str(&json)?;
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        writeln!(out, "{json}")?;
    }
    Ok(())
}

/// Print one article as a full page, or its JSON payload.
pub fn show(config: &FolioConfig, slug: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let delivery = open(config)?;
    let page = match delivery.render(slug) {
        Ok(page) => page,
        Err(e) if e.is_not_found() => bail!("no article `{slug}` in {}", config.content_dir().display()),
        Err(e) => return Err(e.into()),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string(&page.payload)?)?;
    } else {
        out.write_all(page.document.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(files: &[(&str, &str)]) -> (TempDir, FolioConfig) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let mut config = crate::config::test_parse_config("[site]\ntitle = \"Notes\"");
        config.content.dir = temp.path().to_path_buf();
        (temp, config)
    }

    #[test]
    fn test_list_json() {
        let (_temp, config) = config(&[("a.md", "---\ntitle: A\n---\n")]);
        let mut out = Vec::new();
        list(&config, false, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["title"], "Notes");
        assert_eq!(json["articles"][0]["title"], "A");
    }

    #[test]
    fn test_list_pretty() {
        let (_temp, config) = config(&[("a.md", "# A")]);
        let mut out = Vec::new();
        list(&config, true, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\n  \"title\": \"Notes\""));
    }

    #[test]
    fn test_show_page_and_json() {
        let (_temp, config) = config(&[("a.md", "---\ntitle: A\n---\n# Body")]);

        let mut page = Vec::new();
        show(&config, "a", false, &mut page).unwrap();
        let page = String::from_utf8(page).unwrap();
        assert!(page.contains("<h1>Body</h1>"));
        assert!(!page.contains("livereload"));

        let mut json = Vec::new();
        show(&config, "a", true, &mut json).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(json["html"], "<h1>Body</h1>\n");

        let fetched = open(&config).unwrap().fetch("a").unwrap();
        assert_eq!(json, serde_json::from_str::<serde_json::Value>(&fetched).unwrap());
    }

    #[test]
    fn test_show_unknown_slug_fails() {
        let (_temp, config) = config(&[]);
        let err = show(&config, "nope", false, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_missing_directory_fails() {
        let (temp, mut config) = config(&[]);
        config.content.dir = temp.path().join("missing");
        assert!(list(&config, false, &mut Vec::new()).is_err());
    }
}
