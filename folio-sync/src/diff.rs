//! Dry-run preview of a replace, for `folio replace --dry-run`.

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use folio_core::content::Content;
use folio_core::types::ContentKind;

use crate::service::ContentSync;
use crate::SyncError;

/// What a `replace_all` with the same input would change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacePreview {
    pub kind: ContentKind,
    /// Records currently stored.
    pub current: usize,
    /// Records after the replace.
    pub proposed: usize,
    /// Unified diff of the YAML listings; empty when nothing would change.
    pub unified_diff: String,
}

impl ReplacePreview {
    pub fn is_unchanged(&self) -> bool {
        self.unified_diff.is_empty()
    }
}

/// Compare the stored collection to `items` without writing anything.
///
/// Ids and timestamps are left out of both listings: a replace always
/// assigns new ones, so they would only add noise.
pub fn preview_replace<T: Content>(
    sync: &ContentSync,
    items: &[T],
) -> Result<ReplacePreview, SyncError> {
    let current: Vec<T> = sync.read::<T>()?.into_iter().map(|s| s.item).collect();
    let before = listing(&current)?;
    let after = listing(items)?;

    let unified_diff = if before == after {
        String::new()
    } else {
        let collection = T::KIND.collection();
        let old_header = format!("a/{collection}");
        let new_header = format!("b/{collection}");
        TextDiff::from_lines(&before, &after)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string()
    };

    Ok(ReplacePreview {
        kind: T::KIND,
        current: current.len(),
        proposed: items.len(),
        unified_diff,
    })
}

fn listing<T: Content>(items: &[T]) -> Result<String, SyncError> {
    if items.is_empty() {
        return Ok(String::new());
    }
    Ok(serde_yaml::to_string(items)?)
}
