//! The ledger engine: the only component that mutates balances

use bigdecimal::BigDecimal;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_account_name, validate_amount};

/// Outcome of a committed deposit or withdrawal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReceipt {
    /// Balance after the operation
    pub balance: BigDecimal,
    /// The ledger entry the operation produced
    pub entry: LedgerEntry,
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Correlation id shared by both entries
    pub transfer_id: Uuid,
    /// Source balance after the debit
    pub from_balance: BigDecimal,
    /// Destination balance after the credit
    pub to_balance: BigDecimal,
    /// `transfer_out` entry recorded on the source account
    pub outgoing: LedgerEntry,
    /// `transfer_in` entry recorded on the destination account
    pub incoming: LedgerEntry,
}

/// Orchestrates balance mutations and log appends into all-or-nothing
/// operations.
///
/// Every operation validates its preconditions before touching storage,
/// then runs inside a single [`StoreTransaction`]; any failure after
/// `begin` drops the transaction, which rolls back all staged work. A
/// failed operation therefore has zero visible effect and is safe to
/// retry. Resubmitting a *successful* operation records it again.
pub struct LedgerEngine<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> LedgerEngine<S> {
    /// Create a new engine over the given storage backend
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a new account with a zero balance.
    ///
    /// Accounts always open empty so that the reconciliation invariant
    /// (entry sum equals balance) holds from the first entry onward; funds
    /// arrive through [`deposit`](Self::deposit).
    pub async fn open_account(&self, owner: OwnerId, name: &str) -> LedgerResult<Account> {
        validate_account_name(name)?;

        let account = self
            .store
            .create_account(&owner, name, BigDecimal::from(0))
            .await?;

        debug!("opened account {} ('{}') for {}", account.id, name, owner);
        Ok(account)
    }

    /// Credit an account.
    ///
    /// Fails with [`LedgerError::InvalidAmount`] unless `amount` is positive
    /// with at most two decimal places, and with
    /// [`LedgerError::AccountNotFound`] if the account does not exist.
    pub async fn deposit(
        &self,
        account_id: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<OperationReceipt> {
        let amount = validate_amount(&amount)?;

        let mut txn = self.store.begin(&[account_id]).await?;
        let balance = txn.apply_delta(account_id, &amount).await?;
        let entry = txn
            .append_entry(account_id, amount, EntryKind::Deposit, None)
            .await?;
        txn.commit().await?;

        debug!(
            "deposit of {} into {} committed, balance {}",
            entry.amount, account_id, balance
        );
        Ok(OperationReceipt { balance, entry })
    }

    /// Debit an account.
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] if the balance would go
    /// negative; in that case no entry is appended and the balance is
    /// unchanged.
    pub async fn withdraw(
        &self,
        account_id: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<OperationReceipt> {
        let amount = validate_amount(&amount)?;
        let debit = -&amount;

        let mut txn = self.store.begin(&[account_id]).await?;
        let balance = match txn.apply_delta(account_id, &debit).await {
            Ok(balance) => balance,
            Err(err) => {
                warn!("withdrawal of {} from {} rejected: {}", amount, account_id, err);
                return Err(err);
            }
        };
        let entry = txn
            .append_entry(account_id, debit, EntryKind::Withdrawal, None)
            .await?;
        txn.commit().await?;

        debug!(
            "withdrawal of {} from {} committed, balance {}",
            amount, account_id, balance
        );
        Ok(OperationReceipt { balance, entry })
    }

    /// Move funds between two accounts atomically.
    ///
    /// Both balance changes and both ledger entries commit together or not
    /// at all. The store locks the two accounts in ascending id order, so
    /// opposing concurrent transfers over the same pair cannot deadlock.
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<TransferReceipt> {
        let amount = validate_amount(&amount)?;
        if from == to {
            return Err(LedgerError::InvalidTransfer(
                "source and destination accounts must differ".to_string(),
            ));
        }

        let mut txn = self.store.begin(&[from, to]).await?;

        let debit = -&amount;
        let from_balance = match txn.apply_delta(from, &debit).await {
            Ok(balance) => balance,
            Err(err) => {
                warn!("transfer of {} from {} to {} rejected: {}", amount, from, to, err);
                return Err(err);
            }
        };
        let to_balance = txn.apply_delta(to, &amount).await?;

        let transfer_id = Uuid::new_v4();
        let outgoing = txn
            .append_entry(from, debit, EntryKind::TransferOut, Some(transfer_id))
            .await?;
        let incoming = txn
            .append_entry(to, amount, EntryKind::TransferIn, Some(transfer_id))
            .await?;
        txn.commit().await?;

        debug!(
            "transfer {} of {} from {} to {} committed",
            transfer_id, incoming.amount, from, to
        );
        Ok(TransferReceipt {
            transfer_id,
            from_balance,
            to_balance,
            outgoing,
            incoming,
        })
    }
}
