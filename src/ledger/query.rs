//! Read-only projections over accounts and the transaction log

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::traits::LedgerStore;
use crate::types::*;

/// One line of an owner's account overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub name: String,
    pub balance: BigDecimal,
}

/// An owner together with all of their accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDetail {
    pub owner: OwnerId,
    pub accounts: Vec<AccountSummary>,
}

/// Result of checking an account against its transaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub account_id: AccountId,
    /// Balance currently stored on the account
    pub balance: BigDecimal,
    /// Sum of all ledger entries for the account
    pub entry_sum: BigDecimal,
    /// Whether the two agree
    pub is_consistent: bool,
}

/// Read-only query surface.
///
/// Queries take no locks of their own; they observe whatever the store has
/// committed. A multi-step operation is never partially visible because the
/// store publishes its effects atomically.
pub struct QueryService<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> QueryService<S> {
    /// Create a new query service over the given storage backend
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All of an owner's accounts with their current balances
    pub async fn account_detail(&self, owner: &OwnerId) -> LedgerResult<AccountDetail> {
        let accounts = self.store.accounts_by_owner(owner).await?;

        Ok(AccountDetail {
            owner: owner.clone(),
            accounts: accounts
                .into_iter()
                .map(|account| AccountSummary {
                    name: account.name,
                    balance: account.balance,
                })
                .collect(),
        })
    }

    /// All entries across an owner's accounts, most recent first
    pub async fn transaction_history(&self, owner: &OwnerId) -> LedgerResult<Vec<LedgerEntry>> {
        self.store.entries_by_owner(owner).await
    }

    /// One account's entries, most recent first
    pub async fn account_history(&self, account_id: AccountId) -> LedgerResult<Vec<LedgerEntry>> {
        self.store.entries_by_account(account_id).await
    }

    /// Check the reconciliation invariant for one account: the sum of its
    /// ledger entries must equal its stored balance.
    pub async fn reconcile_account(
        &self,
        account_id: AccountId,
    ) -> LedgerResult<ReconciliationReport> {
        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        let entry_sum: BigDecimal = self
            .store
            .entries_by_account(account_id)
            .await?
            .iter()
            .map(|entry| &entry.amount)
            .sum();
        let entry_sum = entry_sum.with_scale(2);

        let is_consistent = entry_sum == account.balance;
        Ok(ReconciliationReport {
            account_id,
            balance: account.balance,
            entry_sum,
            is_consistent,
        })
    }
}
