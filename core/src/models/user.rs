use serde::{Deserialize, Serialize};

const DEFAULT_PRIMARY: &str = "210 29% 29%";
const DEFAULT_BACKGROUND: &str = "210 27% 18%";
const DEFAULT_ACCENT: &str = "282 44% 47%";

fn default_primary() -> String {
    DEFAULT_PRIMARY.to_string()
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

fn default_accent() -> String {
    DEFAULT_ACCENT.to_string()
}

/// Color tokens for a user's theme. Values are free-form strings and are not
/// validated as colors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserTheme {
    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

impl Default for UserTheme {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            background: default_background(),
            accent: default_accent(),
            note: None,
            category: None,
            subcategory: None,
        }
    }
}

impl UserTheme {
    /// Style variables this theme sets, in the order they are applied.
    /// Unset optional font colors are left out so the defaults show through.
    pub fn variables(&self) -> Vec<(&'static str, &str)> {
        let mut vars = vec![
            ("--background", self.background.as_str()),
            ("--primary", self.primary.as_str()),
            ("--accent", self.accent.as_str()),
        ];
        if let Some(note) = &self.note {
            vars.push(("--note-foreground", note.as_str()));
        }
        if let Some(category) = &self.category {
            vars.push(("--category-foreground", category.as_str()));
        }
        if let Some(subcategory) = &self.subcategory {
            vars.push(("--subcategory-foreground", subcategory.as_str()));
        }
        vars
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub display_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<UserTheme>,
}

impl User {
    pub fn new(display_name: String, email: String) -> Self {
        Self {
            display_name,
            email,
            theme: None,
        }
    }

    /// Name shown in menus: the display name, or the email when unset
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }

    /// The user's theme, falling back to the default palette
    pub fn effective_theme(&self) -> UserTheme {
        self.theme.clone().unwrap_or_default()
    }
}
