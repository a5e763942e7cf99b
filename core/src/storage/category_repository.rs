use crate::models::Category;
use crate::Result;
use rusqlite::{params, Connection};

/// The `categories` collection. Each row is a root category with its whole
/// subtree embedded in the document.
pub struct CategoryRepository;

impl CategoryRepository {
    /// Get all root categories in stored order
    pub fn get_all(conn: &Connection) -> Result<Vec<Category>> {
        let mut stmt = conn.prepare(
            "SELECT document FROM categories ORDER BY position, id"
        )?;

        let documents = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let categories = documents
            .iter()
            .map(|doc| serde_json::from_str::<Category>(doc))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Overwrite the whole collection with `roots`. Roots not in the new
    /// list are removed. Runs in a single transaction.
    pub fn replace_all(conn: &Connection, roots: &[Category]) -> Result<()> {
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO categories (id, position, document) VALUES (?1, ?2, ?3)"
            )?;
            for (position, category) in roots.iter().enumerate() {
                let document = serde_json::to_string(category)?;
                stmt.execute(params![category.id, position as i64, document])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn roots() -> Vec<Category> {
        vec![
            Category::with_id("cat-1", "Software Engineering", "#2980B9").with_sub_categories(vec![
                Category::with_id("sub-cat-1", "Frontend", "#2980B9")
                    .with_sub_categories(vec![Category::with_id("leaf", "CSS", "#2980B9")]),
            ]),
            Category::with_id("cat-2", "Project Management", "#27AE60"),
        ]
    }

    #[test]
    fn test_replace_all_roundtrip() {
        let conn = Database::in_memory().unwrap();
        CategoryRepository::replace_all(&conn, &roots()).unwrap();

        let loaded = CategoryRepository::get_all(&conn).unwrap();
        assert_eq!(loaded, roots());
    }

    #[test]
    fn test_replace_all_drops_removed_roots() {
        let conn = Database::in_memory().unwrap();
        CategoryRepository::replace_all(&conn, &roots()).unwrap();

        let remaining = vec![roots().remove(1)];
        CategoryRepository::replace_all(&conn, &remaining).unwrap();

        let loaded = CategoryRepository::get_all(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "cat-2");
    }

    #[test]
    fn test_order_follows_position() {
        let conn = Database::in_memory().unwrap();
        let mut reversed = roots();
        reversed.reverse();
        CategoryRepository::replace_all(&conn, &reversed).unwrap();

        let ids: Vec<String> = CategoryRepository::get_all(&conn)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["cat-2", "cat-1"]);
    }

    #[test]
    fn test_duplicate_root_ids_fail_without_partial_write() {
        let conn = Database::in_memory().unwrap();
        CategoryRepository::replace_all(&conn, &roots()).unwrap();

        let dup = vec![
            Category::with_id("x", "X", "#000"),
            Category::with_id("x", "X again", "#000"),
        ];
        assert!(CategoryRepository::replace_all(&conn, &dup).is_err());
        assert_eq!(CategoryRepository::get_all(&conn).unwrap(), roots());
    }
}
