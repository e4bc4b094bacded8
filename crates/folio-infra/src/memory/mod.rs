//! In-memory implementations of the storage ports.

mod store;

pub use store::InMemoryStore;
