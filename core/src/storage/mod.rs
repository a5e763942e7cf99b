mod category_repository;
mod database;
mod gateway;
mod memory;
mod note_repository;
mod user_repository;

pub use category_repository::CategoryRepository;
pub use database::{Connection, Database};
pub use gateway::{PersistenceGateway, SqliteGateway};
pub use memory::MemoryGateway;
pub use note_repository::NoteRepository;
pub use user_repository::UserRepository;
