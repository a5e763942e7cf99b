//! Consuming tag and category suggestions produced for a note's content.

use serde::{Deserialize, Serialize};

use crate::models::{Category, Note};
use crate::tree::CategoryTree;

/// Suggestions for a note, as returned by the suggestion service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Suggestions {
    #[serde(default)]
    pub suggested_tags: Vec<String>,
    #[serde(default)]
    pub suggested_headers: Vec<String>,
}

impl Suggestions {
    /// Tags not yet on `note`
    pub fn new_tags_for(&self, note: &Note) -> Vec<&str> {
        self.suggested_tags
            .iter()
            .map(String::as_str)
            .filter(|t| !note.has_tag(t))
            .collect()
    }
}

/// Add a suggested tag to a note; false when it was already there
pub fn apply_tag(note: &mut Note, tag: &str) -> bool {
    note.add_tag(tag)
}

/// Find the category a suggested header refers to: exact name match,
/// ignoring case, first hit in pre-order
pub fn resolve_header<'a>(tree: &'a CategoryTree, header: &str) -> Option<&'a Category> {
    tree.find_by_name(header.trim())
}

/// File the note under the category named by `header`. Returns false and
/// leaves the note untouched when no category matches.
pub fn apply_header(note: &mut Note, tree: &CategoryTree, header: &str) -> bool {
    match resolve_header(tree, header) {
        Some(category) => {
            note.category_id = category.id.clone();
            true
        }
        None => false,
    }
}
