use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::actor::messages::StoreMsg;
use crate::article::source;

/// Turn a debounced batch into one reload request.
///
/// Every change kind maps to a reload: the store re-reads the file and
/// decides between update and removal itself. Paths that are not articles
/// are dropped; each slug appears once.
pub(super) fn batch_to_message(
    changes: FxHashMap<PathBuf, ChangeKind>,
    extensions: &[String],
) -> Option<StoreMsg> {
    let mut slugs: Vec<String> = changes
        .into_iter()
        .filter_map(|(path, kind)| {
            let slug = source::slug_for(&path, extensions)?;
            crate::debug!("watch"; "{}: {} ({})", kind.label(), path.display(), slug);
            Some(slug)
        })
        .collect();

    slugs.sort();
    slugs.dedup();

    (!slugs.is_empty()).then_some(StoreMsg::Reload { slugs })
}
