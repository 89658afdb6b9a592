//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory [`LedgerStore`] backed by one `tokio` mutex per account.
///
/// Balances are only read or written while holding the owning account's
/// mutex, which makes `apply_delta` linearizable per account. Mutations are
/// staged inside a [`MemoryTransaction`] and published under all involved
/// account locks at commit, so readers never observe a half-applied
/// operation.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    accounts: RwLock<HashMap<AccountId, Arc<Mutex<Account>>>>,
    /// owner -> display name -> account id
    owner_index: RwLock<HashMap<OwnerId, HashMap<String, AccountId>>>,
    entries: RwLock<Vec<LedgerEntry>>,
    next_entry_id: AtomicU64,
    lock_timeout: Duration,
}

fn poisoned() -> LedgerError {
    LedgerError::Storage("storage lock poisoned".to_string())
}

impl MemoryStore {
    /// Create a new memory store with the default lock timeout
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    /// Create a memory store with a custom bound on lock acquisition
    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                accounts: RwLock::new(HashMap::new()),
                owner_index: RwLock::new(HashMap::new()),
                entries: RwLock::new(Vec::new()),
                next_entry_id: AtomicU64::new(0),
                lock_timeout,
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreInner {
    fn cell(&self, account_id: AccountId) -> LedgerResult<Option<Arc<Mutex<Account>>>> {
        Ok(self
            .accounts
            .read()
            .map_err(|_| poisoned())?
            .get(&account_id)
            .cloned())
    }

    async fn lock_account(&self, account_id: AccountId) -> LedgerResult<OwnedMutexGuard<Account>> {
        let cell = self
            .cell(account_id)?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        timeout(self.lock_timeout, cell.lock_owned())
            .await
            .map_err(|_| {
                LedgerError::Conflict(format!(
                    "timed out waiting for lock on account {}",
                    account_id
                ))
            })
    }

    fn owner_account_ids(&self, owner: &OwnerId) -> LedgerResult<Vec<AccountId>> {
        Ok(self
            .owner_index
            .read()
            .map_err(|_| poisoned())?
            .get(owner)
            .map(|by_name| by_name.values().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Transaction = MemoryTransaction;

    async fn create_account(
        &self,
        owner: &OwnerId,
        name: &str,
        initial_balance: BigDecimal,
    ) -> LedgerResult<Account> {
        if initial_balance < BigDecimal::from(0) {
            return Err(LedgerError::Validation(
                "Initial balance cannot be negative".to_string(),
            ));
        }

        let account = Account::new(owner.clone(), name.to_string(), initial_balance);

        let mut accounts = self.inner.accounts.write().map_err(|_| poisoned())?;
        let mut index = self.inner.owner_index.write().map_err(|_| poisoned())?;

        let by_name = index.entry(owner.clone()).or_default();
        if by_name.contains_key(name) {
            return Err(LedgerError::Validation(format!(
                "Owner '{}' already has an account named '{}'",
                owner, name
            )));
        }

        by_name.insert(name.to_string(), account.id);
        accounts.insert(account.id, Arc::new(Mutex::new(account.clone())));

        Ok(account)
    }

    async fn get_account(&self, account_id: AccountId) -> LedgerResult<Option<Account>> {
        let cell = match self.inner.cell(account_id)? {
            Some(cell) => cell,
            None => return Ok(None),
        };

        let guard = timeout(self.inner.lock_timeout, cell.lock_owned())
            .await
            .map_err(|_| {
                LedgerError::Conflict(format!(
                    "timed out waiting for lock on account {}",
                    account_id
                ))
            })?;

        Ok(Some(guard.clone()))
    }

    async fn accounts_by_owner(&self, owner: &OwnerId) -> LedgerResult<Vec<Account>> {
        let ids = self.inner.owner_account_ids(owner)?;

        let mut accounts = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(account) = self.get_account(id).await? {
                accounts.push(account);
            }
        }

        accounts.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));
        Ok(accounts)
    }

    async fn entries_by_account(&self, account_id: AccountId) -> LedgerResult<Vec<LedgerEntry>> {
        let entries = self.inner.entries.read().map_err(|_| poisoned())?;
        let mut result: Vec<LedgerEntry> = entries
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .cloned()
            .collect();

        result.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(result)
    }

    async fn entries_by_owner(&self, owner: &OwnerId) -> LedgerResult<Vec<LedgerEntry>> {
        let ids = self.inner.owner_account_ids(owner)?;

        let entries = self.inner.entries.read().map_err(|_| poisoned())?;
        let mut result: Vec<LedgerEntry> = entries
            .iter()
            .filter(|entry| ids.contains(&entry.account_id))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(result)
    }

    async fn begin(&self, account_ids: &[AccountId]) -> LedgerResult<MemoryTransaction> {
        let mut ids = account_ids.to_vec();
        ids.sort();
        ids.dedup();

        // Locks are taken in ascending id order; a failure part-way drops
        // every guard already held.
        let mut guards = HashMap::with_capacity(ids.len());
        for id in ids {
            guards.insert(id, self.inner.lock_account(id).await?);
        }

        Ok(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            guards,
            staged_balances: HashMap::new(),
            staged_entries: Vec::new(),
        })
    }
}

/// Atomic mutation scope over a set of locked accounts.
///
/// Balance changes and entry appends accumulate in the staging area and hit
/// the store only in [`commit`]; dropping the transaction releases the
/// account locks with nothing written.
///
/// [`commit`]: StoreTransaction::commit
pub struct MemoryTransaction {
    inner: Arc<StoreInner>,
    guards: HashMap<AccountId, OwnedMutexGuard<Account>>,
    staged_balances: HashMap<AccountId, BigDecimal>,
    staged_entries: Vec<LedgerEntry>,
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("locked_accounts", &self.guards.keys().collect::<Vec<_>>())
            .field("staged_balances", &self.staged_balances)
            .field("staged_entries", &self.staged_entries)
            .finish_non_exhaustive()
    }
}

impl MemoryTransaction {
    fn staged_balance(&self, account_id: AccountId) -> LedgerResult<&BigDecimal> {
        if let Some(balance) = self.staged_balances.get(&account_id) {
            return Ok(balance);
        }

        self.guards
            .get(&account_id)
            .map(|guard| &guard.balance)
            .ok_or_else(|| {
                LedgerError::Storage(format!(
                    "account {} is not part of this transaction",
                    account_id
                ))
            })
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn apply_delta(
        &mut self,
        account_id: AccountId,
        delta: &BigDecimal,
    ) -> LedgerResult<BigDecimal> {
        let current = self.staged_balance(account_id)?;
        let next = (current + delta).with_scale(2);

        if next < BigDecimal::from(0) {
            return Err(LedgerError::InsufficientFunds {
                account: account_id,
                requested: delta.abs(),
                available: current.clone(),
            });
        }

        self.staged_balances.insert(account_id, next.clone());
        Ok(next)
    }

    async fn append_entry(
        &mut self,
        account_id: AccountId,
        amount: BigDecimal,
        kind: EntryKind,
        transfer_id: Option<Uuid>,
    ) -> LedgerResult<LedgerEntry> {
        if !self.guards.contains_key(&account_id) {
            return Err(LedgerError::Storage(format!(
                "account {} is not part of this transaction",
                account_id
            )));
        }

        // Ids stay monotonic across rollbacks; an aborted transaction just
        // leaves a gap in the sequence.
        let id = EntryId(self.inner.next_entry_id.fetch_add(1, Ordering::SeqCst) + 1);
        let entry = LedgerEntry {
            id,
            account_id,
            amount: amount.with_scale(2),
            kind,
            transfer_id,
            created_at: chrono::Utc::now().naive_utc(),
        };

        self.staged_entries.push(entry.clone());
        Ok(entry)
    }

    async fn commit(mut self) -> LedgerResult<()> {
        let now = chrono::Utc::now().naive_utc();

        for (account_id, balance) in std::mem::take(&mut self.staged_balances) {
            let guard = self.guards.get_mut(&account_id).ok_or_else(|| {
                LedgerError::Storage(format!(
                    "account {} is not part of this transaction",
                    account_id
                ))
            })?;
            guard.balance = balance;
            guard.updated_at = now;
        }

        if !self.staged_entries.is_empty() {
            let mut entries = self.inner.entries.write().map_err(|_| poisoned())?;
            entries.append(&mut self.staged_entries);
        }

        // Account locks release here, after both balances and entries are
        // visible to readers.
        Ok(())
    }
}
