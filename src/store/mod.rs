//! Concurrent in-memory student store with monotonic identifier allocation.

mod error;
mod memory;

pub use error::StoreError;
pub use memory::StudentStore;
