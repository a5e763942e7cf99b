use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Pdf,
    Word,
    Excel,
    Image,
    Other,
}

impl Default for AttachmentKind {
    fn default() -> Self {
        AttachmentKind::Other
    }
}

impl AttachmentKind {
    /// Classify a file from its name and, if known, its MIME type. When no
    /// MIME type is given one is guessed from the extension.
    pub fn detect(filename: &str, mime_type: Option<&str>) -> Self {
        let mime = mime_type.or_else(|| mime_guess::from_path(filename).first_raw());
        if mime.map_or(false, |m| m.starts_with("image/")) {
            return AttachmentKind::Image;
        }

        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => AttachmentKind::Pdf,
            "doc" | "docx" => AttachmentKind::Word,
            "xls" | "xlsx" => AttachmentKind::Excel,
            _ => AttachmentKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Pdf => "pdf",
            AttachmentKind::Word => "word",
            AttachmentKind::Excel => "excel",
            AttachmentKind::Image => "image",
            AttachmentKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AttachmentKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size: String,
}

impl Attachment {
    /// Create a new attachment record. The kind is derived from the name and
    /// MIME type, the size is stored pre-formatted.
    pub fn new(name: String, mime_type: Option<&str>, url: String, size_bytes: u64) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self {
            id: format!("file-{}-{}", chrono::Utc::now().timestamp_millis(), &suffix[..8]),
            kind: AttachmentKind::detect(&name, mime_type),
            name,
            url,
            size: Self::human_readable_size(size_bytes),
        }
    }

    /// Get human-readable file size, unit suffix without a space
    pub fn human_readable_size(size_bytes: u64) -> String {
        let bytes = size_bytes as f64;
        if bytes < 1024.0 {
            format!("{}B", size_bytes)
        } else if bytes < 1024.0 * 1024.0 {
            format!("{:.1}KB", bytes / 1024.0)
        } else if bytes < 1024.0 * 1024.0 * 1024.0 {
            format!("{:.1}MB", bytes / (1024.0 * 1024.0))
        } else {
            format!("{:.1}GB", bytes / (1024.0 * 1024.0 * 1024.0))
        }
    }
}
