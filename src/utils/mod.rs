//! Utility modules

pub mod memory_store;
pub mod validation;

pub use memory_store::{MemoryStore, MemoryTransaction};
pub use validation::*;
