use tracing::warn;

use crate::index::NoteIndex;
use crate::tree::CategoryTree;
use crate::{Error, Result};

/// Blocks deletion of any category whose subtree still holds notes.
pub struct IntegrityGuard;

impl IntegrityGuard {
    pub fn can_delete(category_id: &str, notes: &NoteIndex, tree: &CategoryTree) -> bool {
        let ids = tree.collect_ids(category_id);
        !notes.references_any(&ids)
    }

    /// Like [`IntegrityGuard::can_delete`], but reports how many notes are in
    /// the way.
    pub fn check_delete(category_id: &str, notes: &NoteIndex, tree: &CategoryTree) -> Result<()> {
        let ids = tree.collect_ids(category_id);
        let blocking = notes.referencing(&ids).count();
        if blocking == 0 {
            return Ok(());
        }

        warn!(category_id, blocking, "category delete blocked by notes");
        Err(Error::ConstraintViolation(format!(
            "Cannot delete category {}: {} note(s) are filed under it or its sub-categories. \
             Reassign or delete them first.",
            category_id, blocking
        )))
    }
}
