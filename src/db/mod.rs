mod local;
mod schema;
mod store;

pub use local::LocalState;
#[cfg(test)]
pub use store::MemoryStore;
pub use store::{KeyValueStore, SqliteStore};
