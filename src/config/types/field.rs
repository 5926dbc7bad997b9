//! Type-safe config field path.

/// Dotted path of a config field, as written in `folio.toml`.
///
/// Sections declare their paths as associated constants so diagnostics
/// name the exact key:
///
/// ```ignore
/// impl WatchConfig {
///     pub const RETRY_MS: FieldPath = FieldPath::new("watch.retry_ms");
/// }
///
/// diag.error(WatchConfig::RETRY_MS, "must be greater than 0");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldPath(&'static str);

impl FieldPath {
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}
