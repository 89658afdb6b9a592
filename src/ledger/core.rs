//! Main ledger facade that combines the mutation engine with the read side

use bigdecimal::BigDecimal;

use crate::ledger::{
    AccountDetail, LedgerEngine, OperationReceipt, QueryService, ReconciliationReport,
    TransferReceipt,
};
use crate::traits::LedgerStore;
use crate::types::*;

/// Single entry point bundling a [`LedgerEngine`] and a [`QueryService`]
/// over one storage backend.
pub struct Ledger<S: LedgerStore> {
    engine: LedgerEngine<S>,
    query: QueryService<S>,
}

impl<S: LedgerStore + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(store: S) -> Self {
        Self {
            engine: LedgerEngine::new(store.clone()),
            query: QueryService::new(store),
        }
    }

    // Mutating operations

    /// Open a new account with a zero balance
    pub async fn open_account(&self, owner: OwnerId, name: &str) -> LedgerResult<Account> {
        self.engine.open_account(owner, name).await
    }

    /// Credit an account
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<OperationReceipt> {
        self.engine.deposit(account_id, amount).await
    }

    /// Debit an account
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<OperationReceipt> {
        self.engine.withdraw(account_id, amount).await
    }

    /// Move funds between two accounts atomically
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<TransferReceipt> {
        self.engine.transfer(from, to, amount).await
    }

    // Read-only operations

    /// Get an account by id
    pub async fn get_account(&self, account_id: AccountId) -> LedgerResult<Option<Account>> {
        self.engine.store().get_account(account_id).await
    }

    /// All of an owner's accounts with their current balances
    pub async fn account_detail(&self, owner: &OwnerId) -> LedgerResult<AccountDetail> {
        self.query.account_detail(owner).await
    }

    /// All entries across an owner's accounts, most recent first
    pub async fn transaction_history(&self, owner: &OwnerId) -> LedgerResult<Vec<LedgerEntry>> {
        self.query.transaction_history(owner).await
    }

    /// One account's entries, most recent first
    pub async fn account_history(&self, account_id: AccountId) -> LedgerResult<Vec<LedgerEntry>> {
        self.query.account_history(account_id).await
    }

    /// Check that an account's entry sum equals its balance
    pub async fn reconcile_account(
        &self,
        account_id: AccountId,
    ) -> LedgerResult<ReconciliationReport> {
        self.query.reconcile_account(account_id).await
    }
}
