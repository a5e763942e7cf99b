use serde::{Deserialize, Serialize};

/// Colors offered when creating a category. The first entry is the default.
pub const CATEGORY_COLORS: [&str; 7] = [
    "#8E44AD", "#2980B9", "#27AE60", "#F1C40F", "#E67E22", "#E74C3C", "#95A5A6",
];

fn default_color() -> String {
    CATEGORY_COLORS[0].to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub sub_categories: Vec<Category>,
}

impl Category {
    /// Create a category with a specific ID and no children
    pub fn with_id(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            sub_categories: Vec::new(),
        }
    }

    /// Builder-style helper to attach children
    pub fn with_sub_categories(mut self, sub_categories: Vec<Category>) -> Self {
        self.sub_categories = sub_categories;
        self
    }

    /// The categories a fresh workspace starts with.
    pub fn starter_set() -> Vec<Category> {
        vec![
            Category::with_id("cat-1", "Software Engineering", "#2980B9").with_sub_categories(vec![
                Category::with_id("sub-cat-1", "Frontend", "#2980B9"),
                Category::with_id("sub-cat-2", "Backend", "#2980B9"),
            ]),
            Category::with_id("cat-2", "Project Management", "#27AE60"),
            Category::with_id("cat-3", "Personal Development", "#8E44AD"),
        ]
    }
}
