#![warn(clippy::unwrap_used)]

pub mod memory;
pub mod seed;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{CatalogStore, UserStore};
