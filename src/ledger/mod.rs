//! Ledger module containing the mutation engine and read-only queries

pub mod core;
pub mod engine;
pub mod query;

pub use core::*;
pub use engine::*;
pub use query::*;
