mod attachment;
mod category;
mod note;
mod tag;
mod user;

pub use attachment::{Attachment, AttachmentKind};
pub use category::{Category, CATEGORY_COLORS};
pub use note::Note;
pub use tag::Tag;
pub use user::{User, UserTheme};

use chrono::{DateTime, Utc};

/// Convert Unix timestamp (seconds) to DateTime<Utc>
pub fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

/// Convert DateTime<Utc> to Unix timestamp (seconds)
pub fn datetime_to_timestamp(datetime: &DateTime<Utc>) -> i64 {
    datetime.timestamp()
}

/// Build a timestamp-derived id such as `note-1698314400000`.
pub fn timestamp_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

/// Build a timestamp-derived id that `is_taken` does not reject, appending
/// `-1`, `-2`, ... on collision.
pub fn unique_timestamp_id<F>(prefix: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base = timestamp_id(prefix);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while is_taken(&candidate) {
        candidate = format!("{}-{}", base, suffix);
        suffix += 1;
    }
    candidate
}
