//! The workspace ties the category tree and note index to a persistence
//! gateway.
//!
//! Every mutation follows the same order: validate, compute the new
//! snapshot, write it through the gateway, and only then replace the
//! in-memory state. A failed write leaves the workspace exactly as it was.

use tracing::{debug, info, warn};

use crate::guard::IntegrityGuard;
use crate::index::NoteIndex;
use crate::models::{Attachment, Category, Note, CATEGORY_COLORS};
use crate::session::Session;
use crate::storage::PersistenceGateway;
use crate::suggest::{self, Suggestions};
use crate::tree::CategoryTree;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
}

pub struct Workspace<G: PersistenceGateway> {
    gateway: G,
    categories: CategoryTree,
    notes: NoteIndex,
}

impl<G: PersistenceGateway> Workspace<G> {
    /// Load notes and categories from the gateway. An empty category
    /// collection is seeded with the starter categories.
    pub fn load(gateway: G) -> Result<Self> {
        let (categories, notes) = Self::read_state(&gateway)?;
        info!(
            notes = notes.len(),
            categories = categories.len(),
            "workspace loaded"
        );
        Ok(Self {
            gateway,
            categories,
            notes,
        })
    }

    /// Throw away in-memory state and re-read it from the gateway
    pub fn reload(&mut self) -> Result<()> {
        let (categories, notes) = Self::read_state(&self.gateway)?;
        self.categories = categories;
        self.notes = notes;
        debug!("workspace reloaded");
        Ok(())
    }

    fn read_state(gateway: &G) -> Result<(CategoryTree, NoteIndex)> {
        let notes = NoteIndex::new(gateway.load_notes()?);
        let mut roots = gateway.load_categories()?;
        if roots.is_empty() {
            info!("seeding starter categories");
            roots = Category::starter_set();
            gateway.save_all_categories(&roots)?;
        }

        let categories = CategoryTree::new(roots);
        let duplicates = categories.duplicate_ids();
        if !duplicates.is_empty() {
            warn!(?duplicates, "category tree contains duplicate ids");
        }
        Ok((categories, notes))
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    pub fn notes(&self) -> &NoteIndex {
        &self.notes
    }

    /// The category a note is filed under. `None` when the note points at a
    /// category that no longer exists.
    pub fn category_of(&self, note: &Note) -> Option<&Category> {
        self.categories.find(&note.category_id)
    }

    /// Notes for a list view: optionally limited to a category subtree,
    /// then narrowed by a search term
    pub fn visible_notes(&self, selected_category: Option<&str>, term: &str) -> Vec<&Note> {
        self.notes.visible(selected_category, term, &self.categories)
    }

    // =========================
    // Categories
    // =========================

    /// Insert or update a category (see [`CategoryTree::upsert`]) and
    /// rewrite the whole category collection.
    pub fn save_category(
        &mut self,
        session: &Session,
        category: Category,
        parent_id: Option<&str>,
    ) -> Result<SaveOutcome> {
        session.require_user()?;
        if category.id.trim().is_empty() {
            return Err(Error::InvalidInput("Category id must not be empty".to_string()));
        }
        if category.name.trim().is_empty() {
            return Err(Error::InvalidInput("Category name must not be empty".to_string()));
        }
        let conflicts = self.categories.conflicting_ids(&category);
        if !conflicts.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Category ids already in use: {}",
                conflicts.join(", ")
            )));
        }

        let outcome = if self.categories.contains(&category.id) {
            SaveOutcome::Updated
        } else {
            SaveOutcome::Created
        };
        let id = category.id.clone();
        let next = self.categories.upsert(category, parent_id);
        persist("categories", self.gateway.save_all_categories(next.roots()))?;

        self.categories = next;
        info!(category_id = %id, ?outcome, "category saved");
        Ok(outcome)
    }

    /// Create a category with a fresh id. Without an explicit color a
    /// sub-category inherits its parent's color; a root gets the first
    /// palette color.
    pub fn create_category(
        &mut self,
        session: &Session,
        name: &str,
        color: Option<&str>,
        parent_id: Option<&str>,
    ) -> Result<Category> {
        let parent = match parent_id {
            Some(pid) => Some(
                self.categories
                    .find(pid)
                    .ok_or_else(|| Error::NotFound(format!("Category not found: {}", pid)))?,
            ),
            None => None,
        };
        let color = match (color, parent) {
            (Some(color), _) => color.to_string(),
            (None, Some(parent)) => parent.color.clone(),
            (None, None) => CATEGORY_COLORS[0].to_string(),
        };

        let category = Category::with_id(self.categories.unique_id("cat"), name.trim(), color);
        self.save_category(session, category.clone(), parent_id)?;
        Ok(category)
    }

    /// Rename and/or recolor an existing category, keeping its children
    pub fn update_category(
        &mut self,
        session: &Session,
        id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<Category> {
        let current = self
            .categories
            .find(id)
            .ok_or_else(|| Error::NotFound(format!("Category not found: {}", id)))?;
        let updated = Category::with_id(
            current.id.clone(),
            name.map(str::trim).unwrap_or(&current.name),
            color.unwrap_or(&current.color),
        );
        self.save_category(session, updated, None)?;
        self.categories
            .find(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Category not found: {}", id)))
    }

    /// Delete a category and its whole subtree. Refused while any note is
    /// filed anywhere in that subtree.
    pub fn delete_category(&mut self, session: &Session, id: &str) -> Result<()> {
        session.require_user()?;
        if !self.categories.contains(id) {
            return Err(Error::NotFound(format!("Category not found: {}", id)));
        }
        IntegrityGuard::check_delete(id, &self.notes, &self.categories)?;

        let next = self.categories.remove(id);
        persist("categories", self.gateway.save_all_categories(next.roots()))?;

        self.categories = next;
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    // =========================
    // Notes
    // =========================

    /// Insert or update a note. A note without an id gets a fresh one.
    pub fn save_note(&mut self, session: &Session, mut note: Note) -> Result<SaveOutcome> {
        session.require_user()?;
        validate_note(&note)?;

        if note.id.trim().is_empty() {
            note.id = self.notes.unique_id("note");
        }
        note.normalize_tags();

        let outcome = if self.notes.contains(&note.id) {
            SaveOutcome::Updated
        } else {
            SaveOutcome::Created
        };
        persist("note", self.gateway.save_note(&note))?;

        info!(note_id = %note.id, ?outcome, "note saved");
        self.notes = self.notes.upsert(note);
        Ok(outcome)
    }

    /// Create a new note with a fresh id
    pub fn create_note(
        &mut self,
        session: &Session,
        title: &str,
        content: &str,
        category_id: &str,
        tags: &[String],
    ) -> Result<Note> {
        let mut note = Note::with_id(
            self.notes.unique_id("note"),
            title.trim().to_string(),
            content.to_string(),
            category_id.to_string(),
        );
        for tag in tags {
            note.add_tag(tag);
        }
        self.save_note(session, note.clone())?;
        Ok(note)
    }

    pub fn delete_note(&mut self, session: &Session, id: &str) -> Result<()> {
        session.require_user()?;
        if !self.notes.contains(id) {
            return Err(Error::NotFound(format!("Note not found: {}", id)));
        }
        persist("note", self.gateway.delete_note(id))?;

        self.notes = self.notes.remove_by_id(id);
        info!(note_id = %id, "note deleted");
        Ok(())
    }

    /// Add attachment metadata to a note
    pub fn attach(&mut self, session: &Session, note_id: &str, attachment: Attachment) -> Result<()> {
        let mut note = self.note_for_edit(note_id)?;
        debug!(note_id, attachment_id = %attachment.id, kind = attachment.kind.as_str(), "attaching file");
        note.add_attachment(attachment);
        self.save_note(session, note)?;
        Ok(())
    }

    pub fn detach(&mut self, session: &Session, note_id: &str, attachment_id: &str) -> Result<Attachment> {
        let mut note = self.note_for_edit(note_id)?;
        let removed = note
            .remove_attachment(attachment_id)
            .ok_or_else(|| Error::NotFound(format!("Attachment not found: {}", attachment_id)))?;
        self.save_note(session, note)?;
        Ok(removed)
    }

    /// Apply suggestions to a note: every new suggested tag is added and,
    /// when `use_header` is set, the note moves to the first suggested
    /// header that names an existing category.
    pub fn apply_suggestions(
        &mut self,
        session: &Session,
        note_id: &str,
        suggestions: &Suggestions,
        use_header: bool,
    ) -> Result<Note> {
        let mut note = self.note_for_edit(note_id)?;
        for tag in suggestions.new_tags_for(&note) {
            suggest::apply_tag(&mut note, tag);
        }
        if use_header {
            let moved = suggestions
                .suggested_headers
                .iter()
                .any(|header| suggest::apply_header(&mut note, &self.categories, header));
            if !moved {
                debug!(note_id, "no suggested header matches a category");
            }
        }
        self.save_note(session, note.clone())?;
        Ok(note)
    }

    fn note_for_edit(&self, note_id: &str) -> Result<Note> {
        self.notes
            .get(note_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Note not found: {}", note_id)))
    }
}

fn validate_note(note: &Note) -> Result<()> {
    if note.title.trim().is_empty() {
        return Err(Error::InvalidInput("Note title must not be empty".to_string()));
    }
    if note.content.trim().is_empty() {
        return Err(Error::InvalidInput("Note content must not be empty".to_string()));
    }
    if note.category_id.trim().is_empty() {
        return Err(Error::InvalidInput("Note must have a category".to_string()));
    }
    Ok(())
}

fn persist<T>(what: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!(collection = what, error = %err, "gateway write failed; keeping previous state");
    }
    result
}
