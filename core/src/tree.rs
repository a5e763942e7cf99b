//! Category tree store.
//!
//! The tree is an immutable snapshot: every mutating operation takes `&self`
//! and returns a new `CategoryTree`, leaving the original untouched.
//!
//! All recursive operations walk the tree in pre-order (a parent before its
//! children, siblings in stored order). When the same id occurs more than
//! once, lookups and `upsert` act on the first node met in that order.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{unique_timestamp_id, Category};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTree {
    roots: Vec<Category>,
}

impl CategoryTree {
    pub fn new(roots: Vec<Category>) -> Self {
        Self { roots }
    }

    /// Top-level categories with their subtrees embedded
    pub fn roots(&self) -> &[Category] {
        &self.roots
    }

    /// Pre-order iterator over every node
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().collect(),
        }
    }

    /// Total number of nodes at all depths
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Category> {
        self.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Exact, case-insensitive name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let wanted = name.to_lowercase();
        self.iter().find(|c| c.name.to_lowercase() == wanted)
    }

    /// The category whose direct children include `id`, if `id` is not a root
    pub fn parent_of(&self, id: &str) -> Option<&Category> {
        self.iter()
            .find(|c| c.sub_categories.iter().any(|sub| sub.id == id))
    }

    /// Nesting depth of `id`; roots are at depth 0
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.flatten_with_depth()
            .into_iter()
            .find(|(_, c)| c.id == id)
            .map(|(depth, _)| depth)
    }

    /// Every node, roots and descendants, in pre-order
    pub fn flatten(&self) -> Vec<&Category> {
        self.iter().collect()
    }

    /// Every node in pre-order, paired with its depth
    pub fn flatten_with_depth(&self) -> Vec<(usize, &Category)> {
        let mut result = Vec::new();
        let mut stack: Vec<(usize, &Category)> = self.roots.iter().rev().map(|c| (0, c)).collect();
        while let Some((depth, node)) = stack.pop() {
            result.push((depth, node));
            stack.extend(node.sub_categories.iter().rev().map(|c| (depth + 1, c)));
        }
        result
    }

    /// The id of `id` itself plus every direct and indirect sub-category.
    /// Empty when `id` is not in the tree.
    pub fn collect_ids(&self, id: &str) -> HashSet<String> {
        let mut ids = HashSet::new();
        if let Some(node) = self.find(id) {
            collect_subtree_ids(node, &mut ids);
        }
        ids
    }

    /// Insert or replace a category.
    ///
    /// If `category.id` already exists anywhere, that node is replaced in
    /// place. Its children are kept unless `category` brings a non-empty
    /// list of its own. Otherwise the category is appended under
    /// `parent_id` when that node exists, or as a new root.
    pub fn upsert(&self, category: Category, parent_id: Option<&str>) -> CategoryTree {
        let mut roots = self.roots.clone();

        if let Some(node) = find_mut(&mut roots, &category.id) {
            debug!(category_id = %category.id, "replacing category in place");
            node.name = category.name;
            node.color = category.color;
            if !category.sub_categories.is_empty() {
                node.sub_categories = category.sub_categories;
            }
        } else {
            let parent = match parent_id {
                Some(pid) => find_mut(&mut roots, pid),
                None => None,
            };
            match parent {
                Some(parent) => {
                    debug!(category_id = %category.id, parent_id = %parent.id, "appending sub-category");
                    parent.sub_categories.push(category);
                }
                None => {
                    debug!(category_id = %category.id, "appending root category");
                    roots.push(category);
                }
            }
        }

        CategoryTree { roots }
    }

    /// Remove the node with `id`, together with its whole subtree. Only the
    /// first pre-order match is removed, the same node `find` and
    /// `collect_ids` see.
    pub fn remove(&self, id: &str) -> CategoryTree {
        let mut roots = self.roots.clone();
        let removed = remove_first(&mut roots, id);
        debug!(category_id = %id, removed, "removed category subtree");
        CategoryTree { roots }
    }

    /// Ids that appear on more than one node, in first-seen order
    pub fn duplicate_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for node in self.iter() {
            if !seen.insert(node.id.as_str()) && !duplicates.contains(&node.id) {
                duplicates.push(node.id.clone());
            }
        }
        duplicates
    }

    /// Ids inside `category`'s subtree that would collide with a different
    /// node once it is upserted. Replacing a node may reuse the ids of its
    /// own current descendants.
    pub fn conflicting_ids(&self, category: &Category) -> Vec<String> {
        let mut existing: HashSet<String> = self.iter().map(|c| c.id.clone()).collect();
        if let Some(current) = self.find(&category.id) {
            for id in self.collect_ids(&current.id) {
                existing.remove(&id);
            }
        } else {
            existing.remove(&category.id);
        }

        let mut incoming = Vec::new();
        let mut stack = vec![category];
        while let Some(node) = stack.pop() {
            incoming.push(node.id.as_str());
            stack.extend(node.sub_categories.iter().rev());
        }

        let mut seen = HashSet::new();
        let mut conflicts = Vec::new();
        for id in incoming {
            let clash = existing.contains(id) || !seen.insert(id);
            if clash && !conflicts.iter().any(|c| c == id) {
                conflicts.push(id.to_string());
            }
        }
        conflicts
    }

    /// A fresh timestamp-derived id not used anywhere in the tree
    pub fn unique_id(&self, prefix: &str) -> String {
        unique_timestamp_id(prefix, |candidate| self.contains(candidate))
    }
}

impl From<Vec<Category>> for CategoryTree {
    fn from(roots: Vec<Category>) -> Self {
        Self::new(roots)
    }
}

/// Pre-order iterator over a [`CategoryTree`]
pub struct Iter<'a> {
    stack: Vec<&'a Category>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Category;

    fn next(&mut self) -> Option<&'a Category> {
        let node = self.stack.pop()?;
        self.stack.extend(node.sub_categories.iter().rev());
        Some(node)
    }
}

fn collect_subtree_ids(node: &Category, ids: &mut HashSet<String>) {
    ids.insert(node.id.clone());
    for child in &node.sub_categories {
        collect_subtree_ids(child, ids);
    }
}

fn find_mut<'a>(categories: &'a mut [Category], id: &str) -> Option<&'a mut Category> {
    for category in categories.iter_mut() {
        if category.id == id {
            return Some(category);
        }
        if let Some(found) = find_mut(&mut category.sub_categories, id) {
            return Some(found);
        }
    }
    None
}

fn remove_first(categories: &mut Vec<Category>, id: &str) -> bool {
    for i in 0..categories.len() {
        if categories[i].id == id {
            categories.remove(i);
            return true;
        }
        if remove_first(&mut categories[i].sub_categories, id) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: &str) -> Category {
        Category::with_id(id, id.to_uppercase(), "#2980B9")
    }

    fn sample() -> CategoryTree {
        CategoryTree::new(vec![
            cat("cat-1").with_sub_categories(vec![
                cat("sub-1").with_sub_categories(vec![cat("leaf-1")]),
                cat("sub-2"),
            ]),
            cat("cat-2"),
        ])
    }

    fn ids(tree: &CategoryTree) -> Vec<&str> {
        tree.flatten().into_iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_flatten_is_pre_order() {
        let tree = sample();
        assert_eq!(ids(&tree), vec!["cat-1", "sub-1", "leaf-1", "sub-2", "cat-2"]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_flatten_with_depth() {
        let tree = sample();
        let depths: Vec<(usize, &str)> = tree
            .flatten_with_depth()
            .into_iter()
            .map(|(d, c)| (d, c.id.as_str()))
            .collect();
        assert_eq!(
            depths,
            vec![(0, "cat-1"), (1, "sub-1"), (2, "leaf-1"), (1, "sub-2"), (0, "cat-2")]
        );
        assert_eq!(tree.depth_of("leaf-1"), Some(2));
        assert_eq!(tree.depth_of("missing"), None);
    }

    #[test]
    fn test_inserted_categories_appear_exactly_once() {
        let mut tree = CategoryTree::default();
        tree = tree.upsert(cat("a"), None);
        tree = tree.upsert(cat("b"), Some("a"));
        tree = tree.upsert(cat("c"), Some("b"));
        tree = tree.upsert(cat("d"), Some("c"));

        for id in ["a", "b", "c", "d"] {
            assert_eq!(ids(&tree).iter().filter(|x| **x == id).count(), 1, "{id}");
        }
        assert_eq!(tree.depth_of("d"), Some(3));
    }

    #[test]
    fn test_upsert_under_parent() {
        let tree = CategoryTree::new(vec![cat("cat-1")]);
        let updated = tree.upsert(Category::with_id("cat-2", "X", "#27AE60"), Some("cat-1"));

        assert_eq!(updated.roots().len(), 1);
        let children = &updated.roots()[0].sub_categories;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "cat-2");
        assert_eq!(children[0].name, "X");

        // The original snapshot is untouched
        assert!(tree.roots()[0].sub_categories.is_empty());
    }

    #[test]
    fn test_upsert_unknown_parent_appends_root() {
        let tree = CategoryTree::new(vec![cat("cat-1")]);
        let updated = tree.upsert(cat("cat-9"), Some("nope"));
        assert_eq!(ids(&updated), vec!["cat-1", "cat-9"]);
    }

    #[test]
    fn test_upsert_existing_preserves_children() {
        let tree = sample();
        let renamed = Category::with_id("sub-1", "Renamed", "#E74C3C");
        let updated = tree.upsert(renamed, None);

        let node = updated.find("sub-1").unwrap();
        assert_eq!(node.name, "Renamed");
        assert_eq!(node.color, "#E74C3C");
        assert_eq!(node.sub_categories.len(), 1);
        assert_eq!(ids(&updated), ids(&tree));
    }

    #[test]
    fn test_upsert_existing_ignores_parent_id() {
        let tree = sample();
        let updated = tree.upsert(Category::with_id("sub-2", "Moved?", "#000"), Some("cat-2"));
        assert_eq!(updated.parent_of("sub-2").map(|c| c.id.as_str()), Some("cat-1"));
        assert!(updated.find("cat-2").unwrap().sub_categories.is_empty());
    }

    #[test]
    fn test_upsert_with_explicit_children_replaces_them() {
        let tree = sample();
        let replacement = cat("sub-1").with_sub_categories(vec![cat("leaf-2")]);
        let updated = tree.upsert(replacement, None);

        assert!(!updated.contains("leaf-1"));
        assert_eq!(updated.parent_of("leaf-2").map(|c| c.id.as_str()), Some("sub-1"));
    }

    #[test]
    fn test_repeated_upsert_is_idempotent() {
        let tree = sample();
        let category = Category::with_id("cat-7", "Reading", "#8E44AD");
        let once = tree.upsert(category.clone(), Some("sub-2"));
        let twice = once.upsert(category.clone(), Some("sub-2"));

        assert_eq!(once, twice);
        let found = twice.find("cat-7").unwrap();
        assert_eq!(found.name, "Reading");
        assert_eq!(found.color, "#8E44AD");
    }

    #[test]
    fn test_upsert_touches_first_duplicate_only() {
        let tree = CategoryTree::new(vec![
            cat("root").with_sub_categories(vec![cat("dup")]),
            cat("dup"),
        ]);
        let updated = tree.upsert(Category::with_id("dup", "First", "#fff"), None);

        let names: Vec<&str> = updated
            .flatten()
            .into_iter()
            .filter(|c| c.id == "dup")
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["First", "DUP"]);
        assert_eq!(tree.duplicate_ids(), vec!["dup".to_string()]);
    }

    #[test]
    fn test_remove_cascades() {
        let tree = sample();
        let updated = tree.remove("sub-1");

        assert_eq!(ids(&updated), vec!["cat-1", "sub-2", "cat-2"]);
        assert!(!updated.contains("leaf-1"));
    }

    #[test]
    fn test_remove_root_and_missing() {
        let tree = sample();
        assert_eq!(ids(&tree.remove("cat-1")), vec!["cat-2"]);
        assert_eq!(tree.remove("missing"), tree);
    }

    #[test]
    fn test_remove_takes_first_duplicate_only() {
        let tree = CategoryTree::new(vec![
            cat("root").with_sub_categories(vec![cat("dup")]),
            cat("dup").with_sub_categories(vec![cat("child")]),
        ]);
        let updated = tree.remove("dup");

        assert_eq!(ids(&updated), vec!["root", "dup", "child"]);
        assert!(updated.collect_ids("dup").contains("child"));
    }

    #[test]
    fn test_collect_ids() {
        let tree = sample();
        let expected: HashSet<String> = ["cat-1", "sub-1", "leaf-1", "sub-2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tree.collect_ids("cat-1"), expected);

        let leaf: HashSet<String> = ["leaf-1".to_string()].into_iter().collect();
        assert_eq!(tree.collect_ids("leaf-1"), leaf);
        assert!(tree.collect_ids("missing").is_empty());
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let tree = sample();
        assert_eq!(tree.find_by_name("sub-2").map(|c| c.id.as_str()), Some("sub-2"));
        assert!(tree.find_by_name("sub").is_none());
    }

    #[test]
    fn test_conflicting_ids() {
        let tree = sample();

        // A new category may not smuggle in an existing id
        let bad = cat("new").with_sub_categories(vec![cat("cat-2")]);
        assert_eq!(tree.conflicting_ids(&bad), vec!["cat-2".to_string()]);

        // Replacing a node may reuse its own descendants' ids
        let ok = cat("sub-1").with_sub_categories(vec![cat("leaf-1"), cat("leaf-9")]);
        assert!(tree.conflicting_ids(&ok).is_empty());

        let twice = cat("new").with_sub_categories(vec![cat("x"), cat("x")]);
        assert_eq!(tree.conflicting_ids(&twice), vec!["x".to_string()]);
    }

    #[test]
    fn test_unique_id_avoids_existing() {
        let tree = sample();
        let id = tree.unique_id("cat");
        assert!(id.starts_with("cat-"));
        assert!(!tree.contains(&id));
    }
}
