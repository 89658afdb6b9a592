//! Core types and data structures for the ledger system

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique account identifier.
///
/// Identifiers are never reused. The derived `Ord` gives a stable total
/// order used for lock acquisition when an operation spans two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a fresh account identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reference to the owning principal, as supplied by the authentication
/// layer. The ledger trusts this value and never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ledger entry identifier, assigned by the store in strictly increasing
/// creation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Funds credited from outside the ledger
    Deposit,
    /// Funds debited out of the ledger
    Withdrawal,
    /// Credit half of a transfer, recorded on the destination account
    TransferIn,
    /// Debit half of a transfer, recorded on the source account
    TransferOut,
}

/// A monetary account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub id: AccountId,
    /// Owning principal
    pub owner: OwnerId,
    /// Display name, unique per owner
    pub name: String,
    /// Current balance, scale 2, never negative after a committed operation
    pub balance: BigDecimal,
    /// When the account was created
    pub created_at: NaiveDateTime,
    /// When the balance was last changed
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new account record
    pub fn new(owner: OwnerId, name: String, balance: BigDecimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: AccountId::new(),
            owner,
            name,
            balance: balance.with_scale(2),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One immutable ledger entry.
///
/// Positive amounts are credits, negative amounts are debits. The sum of an
/// account's entry amounts equals its balance at every quiescent point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Store-assigned identifier, monotonic in creation order
    pub id: EntryId,
    /// Account this entry belongs to
    pub account_id: AccountId,
    /// Signed amount, scale 2
    pub amount: BigDecimal,
    /// What produced this entry
    pub kind: EntryKind,
    /// Correlation id shared by the two entries of one transfer
    pub transfer_id: Option<Uuid>,
    /// When the entry was appended
    pub created_at: NaiveDateTime,
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
    #[error(
        "Insufficient funds in account {account}: requested {requested}, available {available}"
    )]
    InsufficientFunds {
        account: AccountId,
        requested: BigDecimal,
        available: BigDecimal,
    },
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),
    /// Transient contention or lock-timeout failure. The failed operation
    /// had no visible effect, so the caller may retry it.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
