mod mappers;
mod rows;
mod sqlite_queue;
mod sqlite_reference;

pub use sqlite_queue::SqliteOfflineQueue;
pub use sqlite_reference::SqliteReferenceStore;
