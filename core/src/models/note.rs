use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp_id, timestamp_to_datetime, Attachment, Tag};

fn epoch() -> DateTime<Utc> {
    timestamp_to_datetime(0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Create a new note with a timestamp-derived ID
    pub fn new(title: String, content: String, category_id: String) -> Self {
        Self::with_id(timestamp_id("note"), title, content, category_id)
    }

    /// Create a note with a specific ID (for testing or import)
    pub fn with_id(id: String, title: String, content: String, category_id: String) -> Self {
        Self {
            id,
            title,
            content,
            category_id,
            tags: Vec::new(),
            attachments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Add a tag, returning false if it was invalid or already present
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if !Tag::is_valid_name(tag) {
            return false;
        }
        let name = Tag::normalize_name(tag);
        if self.tags.contains(&name) {
            return false;
        }
        self.tags.push(name);
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let name = Tag::normalize_name(tag);
        let before = self.tags.len();
        self.tags.retain(|t| *t != name);
        self.tags.len() != before
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let name = Tag::normalize_name(tag);
        self.tags.iter().any(|t| *t == name)
    }

    /// Bring the tag list back to its canonical form (lowercase, unique)
    pub fn normalize_tags(&mut self) {
        self.tags = Tag::normalize_all(&self.tags);
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    /// Remove an attachment by id, returning it if it existed
    pub fn remove_attachment(&mut self, attachment_id: &str) -> Option<Attachment> {
        let pos = self.attachments.iter().position(|a| a.id == attachment_id)?;
        Some(self.attachments.remove(pos))
    }
}
