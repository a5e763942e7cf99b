use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::PersistenceGateway;
use crate::models::{Category, Note, User};
use crate::{Error, Result};

/// Volatile gateway kept in process memory.
///
/// Writes can be made to fail on demand, which is how the workspace's
/// failure handling is exercised.
#[derive(Default)]
pub struct MemoryGateway {
    notes: RefCell<HashMap<String, Note>>,
    categories: RefCell<Vec<Category>>,
    users: RefCell<HashMap<String, User>>,
    failing_writes: Cell<usize>,
    writes: Cell<usize>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the store
    pub fn with_data(categories: Vec<Category>, notes: Vec<Note>) -> Self {
        let gateway = Self::new();
        *gateway.categories.borrow_mut() = categories;
        gateway
            .notes
            .borrow_mut()
            .extend(notes.into_iter().map(|n| (n.id.clone(), n)));
        gateway
    }

    /// Make the next `count` write calls fail
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.set(count);
    }

    /// Number of successful write calls so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn begin_write(&self, what: &str) -> Result<()> {
        let failing = self.failing_writes.get();
        if failing > 0 {
            self.failing_writes.set(failing - 1);
            return Err(Error::Gateway(format!("simulated failure writing {}", what)));
        }
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load_notes(&self) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self.notes.borrow().values().cloned().collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(notes)
    }

    fn save_note(&self, note: &Note) -> Result<()> {
        self.begin_write("note")?;
        self.notes.borrow_mut().insert(note.id.clone(), note.clone());
        Ok(())
    }

    fn delete_note(&self, id: &str) -> Result<()> {
        self.begin_write("note")?;
        self.notes.borrow_mut().remove(id);
        Ok(())
    }

    fn load_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.borrow().clone())
    }

    fn save_all_categories(&self, categories: &[Category]) -> Result<()> {
        self.begin_write("categories")?;
        *self.categories.borrow_mut() = categories.to_vec();
        Ok(())
    }

    fn load_user(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.borrow().get(email).cloned())
    }

    fn save_user(&self, user: &User) -> Result<()> {
        self.begin_write("user")?;
        self.users.borrow_mut().insert(user.email.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timestamp_to_datetime;

    #[test]
    fn test_notes_load_newest_first() {
        let mut old = Note::with_id("old".into(), "Old".into(), "".into(), "cat-1".into());
        old.created_at = timestamp_to_datetime(10);
        let mut new = Note::with_id("new".into(), "New".into(), "".into(), "cat-1".into());
        new.created_at = timestamp_to_datetime(20);

        let gateway = MemoryGateway::with_data(Vec::new(), vec![old, new]);
        let ids: Vec<String> = gateway.load_notes().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_fail_next_writes() {
        let gateway = MemoryGateway::new();
        gateway.fail_next_writes(1);

        assert!(matches!(
            gateway.save_all_categories(&Category::starter_set()),
            Err(Error::Gateway(_))
        ));
        assert!(gateway.load_categories().unwrap().is_empty());

        gateway.save_all_categories(&Category::starter_set()).unwrap();
        assert_eq!(gateway.load_categories().unwrap().len(), 3);
        assert_eq!(gateway.write_count(), 1);
    }
}
