//! Core library for notecase: category tree, note index, integrity checks,
//! persistence and the signed-in session.

pub mod error;
pub mod guard;
pub mod index;
pub mod models;
pub mod session;
pub mod storage;
pub mod suggest;
pub mod tree;
pub mod workspace;

pub use error::{Error, Result};
pub use guard::IntegrityGuard;
pub use index::NoteIndex;
pub use session::{Session, SessionStore};
pub use suggest::Suggestions;
pub use tree::CategoryTree;
pub use workspace::{SaveOutcome, Workspace};
