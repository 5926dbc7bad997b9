//! The article store: slug → `Article` plus the derived index.
//!
//! Readers load an immutable `Snapshot` through `arc-swap`, so a reader sees
//! either the old article and index or the new ones, never a mix.
//!
//! Writers:
//! - build new `Article` values outside any store lock (file IO + parsing)
//! - swap a new snapshot in under the `commit` lock
//! - `reload` holds a per-slug lock, so two reloads of the same slug run one
//!   after the other while reloads of different slugs interleave
//! - full scans (`load_all`, `refresh`) exclude reloads through `scan_gate`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use super::{
    Article, ArticleError, ArticleSummary, ChangeEvent, MarkdownOptions, Result, source,
};

/// Where articles live and how they are parsed.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub dir: PathBuf,
    /// Accepted file extensions, without the dot
    pub extensions: Vec<String>,
    /// List drafts in the index
    pub include_drafts: bool,
    pub markdown: MarkdownOptions,
}

impl StoreOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: vec!["md".to_string(), "markdown".to_string()],
            include_drafts: false,
            markdown: MarkdownOptions::all(),
        }
    }
}

/// Immutable view of the store at one point in time.
#[derive(Debug, Default)]
struct Snapshot {
    articles: FxHashMap<String, Arc<Article>>,
    index: Vec<ArticleSummary>,
}

impl Snapshot {
    fn new(articles: FxHashMap<String, Arc<Article>>, include_drafts: bool) -> Self {
        let mut index: Vec<_> = articles
            .values()
            .filter(|a| include_drafts || !a.draft)
            .map(|a| a.summary())
            .collect();
        index.sort_by(ArticleSummary::index_order);
        Self { articles, index }
    }
}

/// Outcome of a full directory load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    /// Files that were left out, with the reason
    pub skipped: Vec<ArticleError>,
}

/// Outcome of a successful `reload`.
#[derive(Debug, Clone)]
pub struct Reloaded {
    pub article: Arc<Article>,
    /// `false` when the file content matched what was already stored
    pub changed: bool,
}

/// Outcome of `refresh`.
#[derive(Debug, Default)]
pub struct Refreshed {
    pub events: Vec<ChangeEvent>,
    pub skipped: Vec<ArticleError>,
}

pub struct ArticleStore {
    options: StoreOptions,
    snapshot: ArcSwap<Snapshot>,
    commit: Mutex<()>,
    scan_gate: RwLock<()>,
    reload_locks: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl ArticleStore {
    /// Create an empty store. Call [`load_all`](Self::load_all) to populate it.
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            snapshot: ArcSwap::from_pointee(Snapshot::default()),
            commit: Mutex::new(()),
            scan_gate: RwLock::new(()),
            reload_locks: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.options.dir
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get(&self, slug: &str) -> Result<Arc<Article>> {
        self.snapshot
            .load()
            .articles
            .get(slug)
            .cloned()
            .ok_or_else(|| ArticleError::not_found(slug))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.snapshot.load().articles.contains_key(slug)
    }

    /// Copy of the current index (newest first).
    pub fn list(&self) -> Vec<ArticleSummary> {
        self.snapshot.load().index.clone()
    }

    /// Map a changed path back to its slug (`None` for non-article files).
    pub fn slug_for(&self, path: &Path) -> Option<String> {
        source::slug_for(path, &self.options.extensions)
    }

    // ========================================================================
    // Full scans
    // ========================================================================

    /// Scan the directory and replace the whole store.
    ///
    /// Fails only if the directory itself cannot be read; broken files are
    /// reported in [`LoadReport::skipped`].
    pub fn load_all(&self) -> Result<LoadReport> {
        let _gate = self.scan_gate.write();

        let (parsed, skipped) = self.scan_and_parse()?;
        let report = LoadReport {
            loaded: parsed.len(),
            skipped,
        };

        let articles = parsed
            .into_iter()
            .map(|article| (article.slug.clone(), Arc::new(article)))
            .collect();
        self.commit(articles);

        Ok(report)
    }

    /// Rescan the directory and return what changed since the last snapshot.
    ///
    /// Unlike `load_all`, an article whose file currently fails to parse
    /// keeps its last-known-good version.
    pub fn refresh(&self) -> Result<Refreshed> {
        let _gate = self.scan_gate.write();

        let (parsed, skipped) = self.scan_and_parse()?;
        let current = self.snapshot.load_full();

        let broken: Vec<&str> = skipped
            .iter()
            .filter_map(|err| match err {
                ArticleError::Parse { path, .. } => self.slug_for(path),
                _ => None,
            })
            .filter_map(|slug| current.articles.get_key_value(&slug).map(|(k, _)| k.as_str()))
            .collect();

        let mut events = Vec::new();
        let mut articles = FxHashMap::default();

        for article in parsed {
            let unchanged = current
                .articles
                .get(&article.slug)
                .filter(|old| old.fingerprint == article.fingerprint && old.path == article.path);
            match unchanged {
                Some(old) => {
                    articles.insert(article.slug.clone(), Arc::clone(old));
                }
                None => {
                    events.push(ChangeEvent::updated(&article));
                    articles.insert(article.slug.clone(), Arc::new(article));
                }
            }
        }

        for slug in broken {
            if let Some(old) = current.articles.get(slug) {
                articles
                    .entry(slug.to_string())
                    .or_insert_with(|| Arc::clone(old));
            }
        }

        for slug in current.articles.keys() {
            if !articles.contains_key(slug) {
                events.push(ChangeEvent::removed(slug.clone()));
            }
        }

        self.commit(articles);
        Ok(Refreshed { events, skipped })
    }

    /// List article files (sorted by file name) and parse them in parallel.
    fn scan_and_parse(&self) -> Result<(Vec<Article>, Vec<ArticleError>)> {
        let (files, mut skipped) = self.scan()?;

        let results: Vec<_> = files
            .par_iter()
            .map(|(slug, path)| source::read(path, slug, &self.options.markdown))
            .collect();

        let mut parsed = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(article) => parsed.push(article),
                // Vanished between listing and reading; the watcher will
                // report the removal on its own.
                Err(ArticleError::NotFound { .. }) => {}
                Err(err) => {
                    crate::log!("warning"; "skipped: {}", err);
                    skipped.push(err);
                }
            }
        }

        Ok((parsed, skipped))
    }

    /// Non-recursive directory listing of article files.
    ///
    /// When two files share a stem the first one by file name wins.
    fn scan(&self) -> Result<(Vec<(String, PathBuf)>, Vec<ArticleError>)> {
        let dir = &self.options.dir;
        let load_err = |source| ArticleError::Load {
            dir: dir.clone(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(load_err)? {
            let path = entry.map_err(load_err)?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut seen: FxHashMap<String, PathBuf> = FxHashMap::default();
        let mut files = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();

        for path in paths {
            let Some(slug) = self.slug_for(&path) else {
                continue;
            };
            if let Some(first) = seen.get(&slug) {
                let err = ArticleError::parse(
                    &path,
                    format!("duplicate slug `{slug}` (already used by {})", first.display()),
                );
                crate::log!("warning"; "skipped: {}", err);
                skipped.push(err);
                continue;
            }
            seen.insert(slug.clone(), path.clone());
            files.push((slug, path));
        }

        Ok((files, skipped))
    }

    // ========================================================================
    // Single-article updates
    // ========================================================================

    /// Re-read one article from disk and swap it into the store.
    ///
    /// - file present and valid: stored (if its content changed) and returned
    /// - file gone: slug removed, `NotFound` returned
    /// - file present but broken: previous version kept, `Parse` returned
    pub fn reload(&self, slug: &str) -> Result<Reloaded> {
        let _gate = self.scan_gate.read();
        let result = {
            let lock = self.reload_lock(slug);
            let _serial = lock.lock();
            self.reload_serialized(slug)
        };
        self.release_reload_lock(slug);
        result
    }

    fn reload_serialized(&self, slug: &str) -> Result<Reloaded> {
        let Some(path) = self.locate(slug) else {
            self.remove(slug);
            return Err(ArticleError::not_found(slug));
        };

        let article = match source::read(&path, slug, &self.options.markdown) {
            Ok(article) => article,
            Err(err @ ArticleError::NotFound { .. }) => {
                self.remove(slug);
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let _commit = self.commit.lock();
        let current = self.snapshot.load_full();

        if let Some(old) = current.articles.get(slug)
            && old.fingerprint == article.fingerprint
            && old.path == article.path
        {
            return Ok(Reloaded {
                article: Arc::clone(old),
                changed: false,
            });
        }

        let article = Arc::new(article);
        let mut articles = current.articles.clone();
        articles.insert(slug.to_string(), Arc::clone(&article));
        self.snapshot
            .store(Arc::new(Snapshot::new(articles, self.options.include_drafts)));

        Ok(Reloaded {
            article,
            changed: true,
        })
    }

    /// Drop a slug. Returns whether it was present.
    pub fn remove(&self, slug: &str) -> bool {
        let removed = {
            let _commit = self.commit.lock();
            let current = self.snapshot.load_full();
            if current.articles.contains_key(slug) {
                let mut articles = current.articles.clone();
                articles.remove(slug);
                self.snapshot
                    .store(Arc::new(Snapshot::new(articles, self.options.include_drafts)));
                true
            } else {
                false
            }
        };
        self.release_reload_lock(slug);
        removed
    }

    /// Source path for a slug: the stored path if it still exists, otherwise
    /// the first existing `<dir>/<slug>.<ext>` by file name, the same file a
    /// full scan would pick.
    fn locate(&self, slug: &str) -> Option<PathBuf> {
        if let Ok(article) = self.get(slug)
            && article.path.is_file()
        {
            return Some(article.path.clone());
        }

        self.options
            .extensions
            .iter()
            .map(|ext| self.options.dir.join(format!("{slug}.{ext}")))
            .filter(|path| path.is_file())
            .min()
    }

    fn reload_lock(&self, slug: &str) -> Arc<Mutex<()>> {
        let mut locks = self.reload_locks.lock();
        Arc::clone(locks.entry(slug.to_string()).or_default())
    }

    /// Forget the per-slug lock of an article that is gone, unless another
    /// reload still holds it.
    fn release_reload_lock(&self, slug: &str) {
        let mut locks = self.reload_locks.lock();
        if let Some(lock) = locks.get(slug)
            && Arc::strong_count(lock) == 1
            && !self.contains(slug)
        {
            locks.remove(slug);
        }
    }

    fn commit(&self, articles: FxHashMap<String, Arc<Article>>) {
        let _commit = self.commit.lock();
        self.snapshot
            .store(Arc::new(Snapshot::new(articles, self.options.include_drafts)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::model::EventKind;
    use std::fs;
    use tempfile::TempDir;

    fn setup(files: &[(&str, &str)]) -> (TempDir, ArticleStore) {
        let temp = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let store = ArticleStore::new(StoreOptions::new(temp.path()));
        (temp, store)
    }

    fn post(title: &str, date: &str) -> String {
        format!("---\ntitle: {title}\ndate: {date}\n---\n# {title}\n")
    }

    fn slugs(store: &ArticleStore) -> Vec<String> {
        store.list().into_iter().map(|s| s.slug).collect()
    }

    #[test]
    fn test_scenario_get_after_load() {
        let (_temp, store) = setup(&[("test.md", "---\ntitle: Test\n---\n# Hello")]);
        store.load_all().unwrap();

        let article = store.get("test").unwrap();
        assert_eq!(article.title, "Test");
        assert_eq!(article.html, "<h1>Hello</h1>\n");
    }

    #[test]
    fn test_load_all_lists_one_summary_per_file_newest_first() {
        let (_temp, store) = setup(&[
            ("flux.md", &post("Flux", "2015-03-01")),
            ("redux.md", &post("Redux", "2015-09-20")),
            ("baobab.markdown", &post("Baobab", "2015-06-10")),
            ("notes.txt", "not an article"),
        ]);
        let report = store.load_all().unwrap();

        assert_eq!(report.loaded, 3);
        assert!(report.skipped.is_empty());
        assert_eq!(slugs(&store), ["redux", "baobab", "flux"]);
    }

    #[test]
    fn test_load_all_skips_broken_files() {
        let (_temp, store) = setup(&[
            ("good.md", &post("Good", "2015-01-01")),
            ("broken.md", "---\ntitle: Broken\n# never closed"),
        ]);
        let report = store.load_all().unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0], ArticleError::Parse { .. }));
        assert!(store.get("broken").unwrap_err().is_not_found());
        assert_eq!(slugs(&store), ["good"]);
    }

    #[test]
    fn test_load_all_missing_dir_is_load_error() {
        let temp = TempDir::new().unwrap();
        let store = ArticleStore::new(StoreOptions::new(temp.path().join("missing")));
        let err = store.load_all().unwrap_err();
        assert!(matches!(err, ArticleError::Load { .. }));
    }

    #[test]
    fn test_load_all_is_not_recursive() {
        let (temp, store) = setup(&[("top.md", "# Top")]);
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested/deep.md"), "# Deep").unwrap();
        store.load_all().unwrap();

        assert_eq!(slugs(&store), ["top"]);
        assert!(store.get("deep").is_err());
    }

    #[test]
    fn test_duplicate_stem_first_wins() {
        let (_temp, store) = setup(&[("same.markdown", "# A"), ("same.md", "# B")]);
        let report = store.load_all().unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped.len(), 1);
        // "same.markdown" sorts before "same.md"
        assert_eq!(store.get("same").unwrap().html, "<h1>A</h1>\n");
    }

    #[test]
    fn test_drafts_hidden_from_index_but_reachable() {
        let (_temp, store) = setup(&[
            ("live.md", &post("Live", "2015-01-01")),
            ("wip.md", "---\ntitle: WIP\ndraft: true\n---\nSoon"),
        ]);
        store.load_all().unwrap();

        assert_eq!(slugs(&store), ["live"]);
        assert!(store.get("wip").unwrap().draft);
    }

    #[test]
    fn test_drafts_listed_when_enabled() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("wip.md"), "---\ndraft: true\n---\n").unwrap();
        let mut options = StoreOptions::new(temp.path());
        options.include_drafts = true;
        let store = ArticleStore::new(options);
        store.load_all().unwrap();

        assert_eq!(slugs(&store), ["wip"]);
    }

    #[test]
    fn test_list_returns_a_copy() {
        let (_temp, store) = setup(&[("a.md", "# A")]);
        store.load_all().unwrap();

        let mut copy = store.list();
        copy.clear();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_reload_picks_up_edit() {
        let (temp, store) = setup(&[("test.md", "---\ntitle: Test\n---\n# Hello")]);
        store.load_all().unwrap();

        fs::write(temp.path().join("test.md"), "---\ntitle: Test\n---\n# Hello World").unwrap();
        let reloaded = store.reload("test").unwrap();

        assert!(reloaded.changed);
        assert_eq!(reloaded.article.html, "<h1>Hello World</h1>\n");
        assert_eq!(store.get("test").unwrap().html, "<h1>Hello World</h1>\n");
    }

    #[test]
    fn test_reload_unchanged_content() {
        let (_temp, store) = setup(&[("a.md", "# A")]);
        store.load_all().unwrap();
        let before = store.get("a").unwrap();

        let reloaded = store.reload("a").unwrap();
        assert!(!reloaded.changed);
        assert!(Arc::ptr_eq(&before, &reloaded.article));
    }

    #[test]
    fn test_reload_new_file() {
        let (temp, store) = setup(&[]);
        store.load_all().unwrap();
        assert!(store.list().is_empty());

        fs::write(temp.path().join("fresh.md"), &post("Fresh", "2016-01-01")).unwrap();
        let reloaded = store.reload("fresh").unwrap();

        assert!(reloaded.changed);
        assert_eq!(slugs(&store), ["fresh"]);
    }

    #[test]
    fn test_reload_deleted_file_removes_slug() {
        let (temp, store) = setup(&[
            ("keep.md", &post("Keep", "2015-01-01")),
            ("gone.md", &post("Gone", "2015-02-01")),
        ]);
        store.load_all().unwrap();

        fs::remove_file(temp.path().join("gone.md")).unwrap();
        let err = store.reload("gone").unwrap_err();

        assert!(err.is_not_found());
        assert!(store.get("gone").unwrap_err().is_not_found());
        assert_eq!(slugs(&store), ["keep"]);
    }

    #[test]
    fn test_reload_parse_failure_keeps_last_good() {
        let (temp, store) = setup(&[("a.md", "---\ntitle: Good\n---\nBody")]);
        store.load_all().unwrap();

        fs::write(temp.path().join("a.md"), "---\ntitle: Half written").unwrap();
        let err = store.reload("a").unwrap_err();

        assert!(matches!(err, ArticleError::Parse { .. }));
        assert_eq!(store.get("a").unwrap().title, "Good");
    }

    #[test]
    fn test_reload_falls_back_to_other_extension() {
        let (temp, store) = setup(&[("a.md", "# From md")]);
        store.load_all().unwrap();

        fs::remove_file(temp.path().join("a.md")).unwrap();
        fs::write(temp.path().join("a.markdown"), "# From markdown").unwrap();
        let reloaded = store.reload("a").unwrap();

        assert_eq!(reloaded.article.html, "<h1>From markdown</h1>\n");
    }

    #[test]
    fn test_reload_prefers_same_file_as_scan() {
        let (temp, store) = setup(&[]);
        fs::write(temp.path().join("a.md"), "# From md").unwrap();
        fs::write(temp.path().join("a.markdown"), "# From markdown").unwrap();

        let reloaded = store.reload("a").unwrap();
        assert_eq!(reloaded.article.path, temp.path().join("a.markdown"));

        let fresh = ArticleStore::new(StoreOptions::new(temp.path()));
        fresh.load_all().unwrap();
        assert_eq!(fresh.get("a").unwrap().path, reloaded.article.path);
    }

    #[test]
    fn test_reload_locks_released_for_removed_slugs() {
        let (temp, store) = setup(&[("keep.md", "# Keep")]);
        store.load_all().unwrap();

        for i in 0..50 {
            let name = format!("tmp-{i}");
            fs::write(temp.path().join(format!("{name}.md")), "# Tmp").unwrap();
            store.reload(&name).unwrap();
            fs::remove_file(temp.path().join(format!("{name}.md"))).unwrap();
            assert!(store.reload(&name).unwrap_err().is_not_found());
        }
        store.reload("keep").unwrap();
        assert!(store.reload("never-existed").is_err());

        let locks = store.reload_locks.lock();
        assert_eq!(locks.len(), 1);
        assert!(locks.contains_key("keep"));
    }

    #[test]
    fn test_reload_updates_index_order() {
        let (temp, store) = setup(&[
            ("a.md", &post("A", "2015-01-01")),
            ("b.md", &post("B", "2015-02-01")),
        ]);
        store.load_all().unwrap();
        assert_eq!(slugs(&store), ["b", "a"]);

        fs::write(temp.path().join("a.md"), post("A", "2016-01-01")).unwrap();
        store.reload("a").unwrap();
        assert_eq!(slugs(&store), ["a", "b"]);
    }

    #[test]
    fn test_concurrent_reloads_of_same_slug() {
        let (temp, store) = setup(&[("a.md", "# A")]);
        store.load_all().unwrap();
        fs::write(temp.path().join("a.md"), "# A2").unwrap();

        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.reload("a").unwrap().changed)
            })
            .collect();
        let changed: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        // Serialized: exactly one reload sees the new content as a change.
        assert_eq!(changed, 1);
        assert_eq!(store.get("a").unwrap().html, "<h1>A2</h1>\n");
    }

    #[test]
    fn test_refresh_reports_changes() {
        let (temp, store) = setup(&[
            ("same.md", "# Same"),
            ("edit.md", "# Before"),
            ("gone.md", "# Gone"),
        ]);
        store.load_all().unwrap();

        fs::write(temp.path().join("edit.md"), "# After").unwrap();
        fs::remove_file(temp.path().join("gone.md")).unwrap();
        fs::write(temp.path().join("new.md"), "# New").unwrap();

        let refreshed = store.refresh().unwrap();
        let mut events: Vec<_> = refreshed
            .events
            .iter()
            .map(|e| (e.slug.as_str(), e.kind))
            .collect();
        events.sort_by_key(|(slug, _)| *slug);

        assert_eq!(
            events,
            [
                ("edit", EventKind::Updated),
                ("gone", EventKind::Removed),
                ("new", EventKind::Updated),
            ]
        );
        assert_eq!(slugs(&store), ["edit", "new", "same"]);
    }

    #[test]
    fn test_refresh_keeps_last_good_on_parse_failure() {
        let (temp, store) = setup(&[("a.md", "---\ntitle: Good\n---\n")]);
        store.load_all().unwrap();

        fs::write(temp.path().join("a.md"), "---\ntitle: Broken").unwrap();
        let refreshed = store.refresh().unwrap();

        assert!(refreshed.events.is_empty());
        assert_eq!(refreshed.skipped.len(), 1);
        assert_eq!(store.get("a").unwrap().title, "Good");
    }
}
