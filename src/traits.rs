//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::types::*;

/// Storage abstraction for the ledger system.
///
/// This trait allows the ledger core to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) as long as the backend can
/// provide per-account atomic read-modify-write, multi-account transactions,
/// append-only inserts, and indexed lookup by account and by owner.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// The atomic mutation scope this store hands out
    type Transaction: StoreTransaction;

    /// Create a new account.
    ///
    /// Fails with [`LedgerError::Validation`] if the owner already has an
    /// account with the same display name, or if `initial_balance` is
    /// negative.
    async fn create_account(
        &self,
        owner: &OwnerId,
        name: &str,
        initial_balance: BigDecimal,
    ) -> LedgerResult<Account>;

    /// Get an account by id
    async fn get_account(&self, account_id: AccountId) -> LedgerResult<Option<Account>>;

    /// List all accounts belonging to an owner
    async fn accounts_by_owner(&self, owner: &OwnerId) -> LedgerResult<Vec<Account>>;

    /// List an account's ledger entries, most recent first
    async fn entries_by_account(&self, account_id: AccountId) -> LedgerResult<Vec<LedgerEntry>>;

    /// List all entries across an owner's accounts, most recent first
    async fn entries_by_owner(&self, owner: &OwnerId) -> LedgerResult<Vec<LedgerEntry>>;

    /// Open an atomic mutation scope over the given accounts.
    ///
    /// The store must acquire per-account locks in ascending [`AccountId`]
    /// order regardless of the order of `account_ids`, so that two
    /// operations over the same pair of accounts can never deadlock.
    /// Acquisition is bounded: on timeout this fails with
    /// [`LedgerError::Conflict`] and nothing is held.
    async fn begin(&self, account_ids: &[AccountId]) -> LedgerResult<Self::Transaction>;
}

/// An in-flight atomic mutation over one or two accounts.
///
/// All writes are staged; nothing is visible to readers until [`commit`]
/// returns. Dropping an uncommitted transaction rolls everything back and
/// releases all locks, so a failed multi-step operation leaves zero trace.
///
/// [`commit`]: StoreTransaction::commit
#[async_trait]
pub trait StoreTransaction: Send {
    /// Atomically adjust an account's balance by a signed delta.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] if the staged balance
    /// would go negative; the staged state is left unchanged in that case.
    /// Returns the new staged balance. Only accounts named in
    /// [`LedgerStore::begin`] may be touched.
    async fn apply_delta(
        &mut self,
        account_id: AccountId,
        delta: &BigDecimal,
    ) -> LedgerResult<BigDecimal>;

    /// Stage an append-only ledger entry.
    ///
    /// The store assigns the entry identifier and timestamp. Entry
    /// identifiers are strictly increasing in creation order even across
    /// rolled-back transactions (gaps are fine, reordering is not).
    async fn append_entry(
        &mut self,
        account_id: AccountId,
        amount: BigDecimal,
        kind: EntryKind,
        transfer_id: Option<Uuid>,
    ) -> LedgerResult<LedgerEntry>;

    /// Publish all staged balance changes and entries atomically.
    ///
    /// Readers observe either none or all of the transaction's effects,
    /// never an intermediate state.
    async fn commit(self) -> LedgerResult<()>;
}
