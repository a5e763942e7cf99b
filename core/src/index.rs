//! Note index: the flat, ordered collection of notes.
//!
//! Like the category tree, the index is a snapshot; `upsert` and
//! `remove_by_id` return a new index.

use std::collections::{BTreeMap, HashSet};

use crate::models::{unique_timestamp_id, Note};
use crate::tree::CategoryTree;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteIndex {
    notes: Vec<Note>,
}

impl NoteIndex {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Notes filed under `root_category_id` or any of its sub-categories,
    /// in their current order
    pub fn filter_by_category_subtree(&self, root_category_id: &str, tree: &CategoryTree) -> Vec<&Note> {
        let ids = tree.collect_ids(root_category_id);
        self.notes
            .iter()
            .filter(|n| ids.contains(&n.category_id))
            .collect()
    }

    /// Case-insensitive substring search over title, content and tags.
    /// An empty term matches every note.
    pub fn search(&self, term: &str) -> Vec<&Note> {
        self.notes.iter().filter(|n| matches_term(n, term)).collect()
    }

    /// The notes a list view shows: the selected category subtree (if any),
    /// narrowed by the search term
    pub fn visible(&self, selected_category: Option<&str>, term: &str, tree: &CategoryTree) -> Vec<&Note> {
        let candidates = match selected_category {
            Some(id) => self.filter_by_category_subtree(id, tree),
            None => self.notes.iter().collect(),
        };
        candidates
            .into_iter()
            .filter(|n| matches_term(n, term))
            .collect()
    }

    /// Replace the note with the same id, or put a new note first
    pub fn upsert(&self, note: Note) -> NoteIndex {
        let mut notes = self.notes.clone();
        match notes.iter_mut().find(|n| n.id == note.id) {
            Some(existing) => *existing = note,
            None => notes.insert(0, note),
        }
        NoteIndex { notes }
    }

    pub fn remove_by_id(&self, id: &str) -> NoteIndex {
        NoteIndex {
            notes: self.notes.iter().filter(|n| n.id != id).cloned().collect(),
        }
    }

    /// Notes whose category is one of `category_ids`
    pub fn referencing<'a>(&'a self, category_ids: &'a HashSet<String>) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes
            .iter()
            .filter(move |n| category_ids.contains(&n.category_id))
    }

    pub fn references_any(&self, category_ids: &HashSet<String>) -> bool {
        self.referencing(category_ids).next().is_some()
    }

    /// Tag usage counts, sorted by tag name
    pub fn tag_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for note in &self.notes {
            for tag in &note.tags {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(tag, count)| (tag.to_string(), count))
            .collect()
    }

    /// A fresh timestamp-derived id not used by any note
    pub fn unique_id(&self, prefix: &str) -> String {
        unique_timestamp_id(prefix, |candidate| self.contains(candidate))
    }
}

impl From<Vec<Note>> for NoteIndex {
    fn from(notes: Vec<Note>) -> Self {
        Self::new(notes)
    }
}

fn matches_term(note: &Note, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    note.title.to_lowercase().contains(&needle)
        || note.content.to_lowercase().contains(&needle)
        || note.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn note(id: &str, category_id: &str, title: &str, content: &str, tags: &[&str]) -> Note {
        let mut note = Note::with_id(id.into(), title.into(), content.into(), category_id.into());
        for tag in tags {
            note.add_tag(tag);
        }
        note
    }

    fn tree() -> CategoryTree {
        CategoryTree::new(vec![
            Category::with_id("cat-1", "Software Engineering", "#2980B9")
                .with_sub_categories(vec![Category::with_id("sub-1", "Frontend", "#2980B9")]),
            Category::with_id("cat-2", "Project Management", "#27AE60"),
        ])
    }

    fn index() -> NoteIndex {
        NoteIndex::new(vec![
            note("n1", "sub-1", "React Hooks", "useState and useEffect", &["react"]),
            note("n2", "cat-2", "Agile Methodology Basics", "Agile is an iterative approach", &["scrum"]),
            note("n3", "cat-1", "Architecture", "Layers and boundaries", &[]),
            note("n4", "cat-2", "Standups", "Daily Scrum meeting", &["meetings"]),
        ])
    }

    fn ids(notes: Vec<&Note>) -> Vec<&str> {
        notes.into_iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_filter_by_subtree_keeps_order() {
        let index = index();
        let tree = tree();
        assert_eq!(ids(index.filter_by_category_subtree("cat-1", &tree)), vec!["n1", "n3"]);
        assert_eq!(ids(index.filter_by_category_subtree("sub-1", &tree)), vec!["n1"]);
        assert!(index.filter_by_category_subtree("missing", &tree).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let index = index();
        assert_eq!(ids(index.search("agile")), vec!["n2"]);
        assert_eq!(ids(index.search("SCRUM")), vec!["n2", "n4"]);
        assert_eq!(ids(index.search("REACT")), vec!["n1"]);
        assert_eq!(index.search("").len(), 4);
        assert!(index.search("kubernetes").is_empty());
    }

    #[test]
    fn test_visible_combines_filter_and_search() {
        let index = index();
        let tree = tree();
        assert_eq!(ids(index.visible(Some("cat-2"), "daily", &tree)), vec!["n4"]);
        assert_eq!(ids(index.visible(None, "", &tree)), vec!["n1", "n2", "n3", "n4"]);
    }

    #[test]
    fn test_upsert_prepends_new_and_replaces_existing() {
        let index = index();
        let added = index.upsert(note("n5", "cat-1", "New", "Fresh", &[]));
        assert_eq!(added.notes()[0].id, "n5");
        assert_eq!(added.len(), 5);

        let edited = added.upsert(note("n3", "cat-1", "Architecture v2", "", &[]));
        assert_eq!(edited.len(), 5);
        assert_eq!(edited.notes()[3].title, "Architecture v2");
        assert_eq!(index.get("n3").map(|n| n.title.as_str()), Some("Architecture"));
    }

    #[test]
    fn test_remove_by_id() {
        let index = index();
        let removed = index.remove_by_id("n2");
        assert!(!removed.contains("n2"));
        assert_eq!(removed.len(), 3);
        assert_eq!(index.remove_by_id("missing"), index);
    }

    #[test]
    fn test_tag_counts() {
        let mut index = index();
        index = index.upsert(note("n6", "cat-2", "Retro", "", &["Scrum", "meetings"]));
        assert_eq!(
            index.tag_counts(),
            vec![
                ("meetings".to_string(), 2),
                ("react".to_string(), 1),
                ("scrum".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_references_any() {
        let index = index();
        let ids: HashSet<String> = ["sub-1".to_string()].into_iter().collect();
        assert!(index.references_any(&ids));
        assert!(!index.references_any(&HashSet::new()));
    }
}
