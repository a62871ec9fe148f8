mod kv;
mod preferences;
mod schema;
mod types;

pub use kv::{CATEGORIES_SLOT, TASKS_SLOT};
pub use schema::Database;
pub use types::{LoadedBoard, StorageError};
