/// Tag name helpers. Tags live on notes as plain strings; these keep them
/// case-insensitive and deduplicated.
pub struct Tag;

impl Tag {
    /// Normalize tag name (lowercase, trim whitespace)
    pub fn normalize_name(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Validate tag name
    pub fn is_valid_name(name: &str) -> bool {
        let trimmed = name.trim();
        !trimmed.is_empty() && trimmed.len() <= 100
    }

    /// Normalize a list of tags, dropping invalid and duplicate names while
    /// keeping first-seen order.
    pub fn normalize_all<I, S>(tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for tag in tags {
            let tag = tag.as_ref();
            if !Self::is_valid_name(tag) {
                continue;
            }
            let name = Self::normalize_name(tag);
            if !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(Tag::normalize_name("  Work  "), "work");
        assert_eq!(Tag::normalize_name("ProJect"), "project");
    }

    #[test]
    fn test_is_valid_name() {
        assert!(Tag::is_valid_name("work"));
        assert!(Tag::is_valid_name("  work  "));
        assert!(!Tag::is_valid_name(""));
        assert!(!Tag::is_valid_name("   "));
        assert!(!Tag::is_valid_name(&"x".repeat(101)));
    }

    #[test]
    fn test_normalize_all_dedupes_case_insensitively() {
        let tags = Tag::normalize_all(["React", "react ", "", "Frontend", "REACT"]);
        assert_eq!(tags, vec!["react".to_string(), "frontend".to_string()]);
    }
}
