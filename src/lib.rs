//! # Banking Core
//!
//! A single-currency ledger core: monetary accounts plus an immutable,
//! append-only transaction history for deposits, withdrawals, and transfers.
//!
//! ## Features
//!
//! - **Atomic operations**: deposits, withdrawals, and two-account transfers
//!   commit all-or-nothing; a failed operation leaves zero trace
//! - **No lost updates**: per-account linearizable balance mutation, with
//!   ordered lock acquisition so opposing transfers cannot deadlock
//! - **Auditable history**: every committed operation appends immutable
//!   ledger entries whose sum always equals the account balance
//! - **Exact decimals**: all amounts are scale-2 `BigDecimal` values, never
//!   floating point
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage; an in-memory backend ships for tests and development
//!
//! ## Quick Start
//!
//! ```rust
//! use banking_core::utils::MemoryStore;
//! use banking_core::{Ledger, OwnerId};
//! use bigdecimal::BigDecimal;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> banking_core::LedgerResult<()> {
//! let ledger = Ledger::new(MemoryStore::new());
//!
//! let account = ledger
//!     .open_account(OwnerId::new("alice"), "Checking")
//!     .await?;
//! let receipt = ledger.deposit(account.id, BigDecimal::from(100)).await?;
//! assert_eq!(receipt.balance, BigDecimal::from(100));
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::*;
pub use traits::*;
pub use types::*;
