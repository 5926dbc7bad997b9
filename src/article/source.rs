//! Source files: which files are articles, and how a file becomes an `Article`.

use std::path::Path;

use serde_json::Value;

use super::{Article, ArticleDate, ArticleError, MarkdownOptions, Result, frontmatter, markdown};

/// Editor artifacts and hidden files never count as articles.
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.starts_with('#')
}

/// Slug for an article file, or `None` if the path is not an article.
///
/// The slug is the file stem, taken verbatim.
pub fn slug_for(path: &Path, extensions: &[String]) -> Option<String> {
    if is_temp_file(path) {
        return None;
    }
    let ext = path.extension()?.to_str()?;
    if !extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Read and parse one article file.
pub fn read(path: &Path, slug: &str, options: &MarkdownOptions) -> Result<Article> {
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ArticleError::not_found(slug)
        } else {
            ArticleError::parse(path, e.to_string())
        }
    })?;
    let raw = String::from_utf8(bytes).map_err(|_| ArticleError::parse(path, "not valid UTF-8"))?;
    parse(path, slug, &raw, options)
}

/// Parse article contents that were already read.
pub fn parse(path: &Path, slug: &str, raw: &str, options: &MarkdownOptions) -> Result<Article> {
    let (meta, body) = frontmatter::split(raw).map_err(|reason| ArticleError::parse(path, reason))?;

    let title = match meta.get("title") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::String(_) | Value::Null) | None => slug.to_string(),
        Some(other) => other.to_string(),
    };

    let date = match meta.get("date") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(
            ArticleDate::parse(s)
                .ok_or_else(|| ArticleError::parse(path, format!("invalid date `{s}`")))?,
        ),
        Some(other) => {
            return Err(ArticleError::parse(path, format!("invalid date `{other}`")));
        }
    };

    let draft = match meta.get("draft") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    };

    let tags = match meta.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    Ok(Article {
        slug: slug.to_string(),
        title,
        date,
        draft,
        tags,
        html: markdown::to_html(body, options),
        source: body.to_string(),
        meta,
        path: path.to_path_buf(),
        fingerprint: blake3::hash(raw.as_bytes()).to_hex().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn exts() -> Vec<String> {
        vec!["md".to_string(), "markdown".to_string()]
    }

    fn parse_str(raw: &str) -> Result<Article> {
        parse(
            Path::new("/blog/test.md"),
            "test",
            raw,
            &MarkdownOptions::all(),
        )
    }

    #[test]
    fn test_slug_for() {
        assert_eq!(slug_for(Path::new("/blog/hello.md"), &exts()), Some("hello".into()));
        assert_eq!(
            slug_for(Path::new("/blog/Flux-vs-Redux.MARKDOWN"), &exts()),
            Some("Flux-vs-Redux".into())
        );
        assert_eq!(slug_for(Path::new("/blog/notes.txt"), &exts()), None);
        assert_eq!(slug_for(Path::new("/blog/README"), &exts()), None);
        assert_eq!(slug_for(Path::new("/blog/.hello.md"), &exts()), None);
        assert_eq!(slug_for(Path::new("/blog/hello.md~"), &exts()), None);
        assert_eq!(slug_for(Path::new("/blog/hello.md.swp"), &exts()), None);
    }

    #[test]
    fn test_temp_files() {
        assert!(is_temp_file(Path::new("/blog/.#hello.md")));
        assert!(is_temp_file(Path::new("/blog/#hello.md#")));
        assert!(is_temp_file(Path::new("/blog/4913.tmp")));
        assert!(!is_temp_file(Path::new("/blog/hello.md")));
    }

    #[test]
    fn test_parse_scenario() {
        let article = parse_str("---\ntitle: Test\n---\n# Hello").unwrap();
        assert_eq!(article.slug, "test");
        assert_eq!(article.title, "Test");
        assert_eq!(article.html, "<h1>Hello</h1>\n");
        assert_eq!(article.source, "# Hello");
        assert_eq!(article.path, PathBuf::from("/blog/test.md"));
    }

    #[test]
    fn test_parse_lifts_known_fields() {
        let raw = "---\ntitle: Baobab\ndate: 2015-06-12\ndraft: true\ntags: flux, state\nauthor: Jane\n---\nBody";
        let article = parse_str(raw).unwrap();

        assert_eq!(article.date, Some(ArticleDate::from_ymd(2015, 6, 12)));
        assert!(article.draft);
        assert_eq!(article.tags, vec!["flux", "state"]);
        assert_eq!(article.meta["author"], serde_json::json!("Jane"));
        assert_eq!(article.meta["title"], serde_json::json!("Baobab"));
    }

    #[test]
    fn test_toml_datetimes_with_offset_or_fraction() {
        let article = parse_str("+++\ntitle = \"Offset\"\ndate = 2024-06-15T14:30:00+02:00\n+++\n").unwrap();
        assert_eq!(article.date.unwrap().to_string(), "2024-06-15T12:30:00Z");

        let article = parse_str("+++\ndate = 2024-06-15T14:30:00.5Z\n+++\n").unwrap();
        assert_eq!(article.date.unwrap().to_string(), "2024-06-15T14:30:00Z");

        let article = parse_str("---\ndate: 2024-06-15T14:30:00-01:00\n---\n").unwrap();
        assert_eq!(article.date.unwrap().to_string(), "2024-06-15T15:30:00Z");
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let article = parse_str("# No front-matter").unwrap();
        assert_eq!(article.title, "test");
        assert!(article.meta.is_empty());
        assert!(article.date.is_none());
    }

    #[test]
    fn test_invalid_date_is_parse_error() {
        let err = parse_str("---\ndate: someday\n---\n").unwrap_err();
        assert!(matches!(err, ArticleError::Parse { .. }));
        assert!(err.to_string().contains("someday"));
    }

    #[test]
    fn test_fingerprint_tracks_raw_content() {
        let a = parse_str("# Hello").unwrap();
        let b = parse_str("# Hello").unwrap();
        let c = parse_str("# Hello World").unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(&dir.path().join("gone.md"), "gone", &MarkdownOptions::all()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.md");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let err = read(&path, "bin", &MarkdownOptions::all()).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
