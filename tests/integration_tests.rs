//! Integration tests for banking-core

use banking_core::utils::MemoryStore;
use banking_core::{EntryKind, Ledger, LedgerError, OwnerId};
use bigdecimal::BigDecimal;
use std::str::FromStr;
use std::sync::Arc;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

#[tokio::test]
async fn complete_banking_workflow() {
    let ledger = Ledger::new(MemoryStore::new());
    let alice = OwnerId::new("alice");
    let bob = OwnerId::new("bob");

    let alice_checking = ledger.open_account(alice.clone(), "Checking").await.unwrap();
    let alice_savings = ledger.open_account(alice.clone(), "Savings").await.unwrap();
    let bob_checking = ledger.open_account(bob.clone(), "Checking").await.unwrap();

    // fund the accounts
    ledger
        .deposit(alice_checking.id, dec("1000.00"))
        .await
        .unwrap();
    ledger.deposit(bob_checking.id, dec("500.00")).await.unwrap();

    // move some of Alice's funds to savings, pay Bob
    ledger
        .transfer(alice_checking.id, alice_savings.id, dec("250.00"))
        .await
        .unwrap();
    let payment = ledger
        .transfer(alice_checking.id, bob_checking.id, dec("100.00"))
        .await
        .unwrap();
    assert_eq!(payment.from_balance, dec("650.00"));
    assert_eq!(payment.to_balance, dec("600.00"));

    ledger.withdraw(bob_checking.id, dec("50.00")).await.unwrap();

    // account overview
    let detail = ledger.account_detail(&alice).await.unwrap();
    assert_eq!(detail.owner, alice);
    let balances: Vec<(&str, String)> = detail
        .accounts
        .iter()
        .map(|summary| (summary.name.as_str(), summary.balance.to_string()))
        .collect();
    assert!(balances.contains(&("Checking", "650.00".to_string())));
    assert!(balances.contains(&("Savings", "250.00".to_string())));

    // history is complete and descending
    let history = ledger.transaction_history(&alice).await.unwrap();
    assert_eq!(history.len(), 4); // deposit + 2x transfer_out + transfer_in
    assert!(history.windows(2).all(|pair| pair[0].id > pair[1].id));
    assert_eq!(history[0].kind, EntryKind::TransferOut);

    let bob_history = ledger.transaction_history(&bob).await.unwrap();
    assert_eq!(bob_history.len(), 3); // deposit, transfer_in, withdrawal

    // reconciliation invariant holds everywhere
    for id in [alice_checking.id, alice_savings.id, bob_checking.id] {
        let report = ledger.reconcile_account(id).await.unwrap();
        assert!(report.is_consistent, "account {} out of balance", id);
    }
}

#[tokio::test]
async fn failed_operations_leave_ledger_reconciled() {
    let ledger = Ledger::new(MemoryStore::new());
    let alice = OwnerId::new("alice");

    let checking = ledger.open_account(alice.clone(), "Checking").await.unwrap();
    let savings = ledger.open_account(alice.clone(), "Savings").await.unwrap();
    ledger.deposit(checking.id, dec("100.00")).await.unwrap();

    assert!(matches!(
        ledger.withdraw(checking.id, dec("100.01")).await.unwrap_err(),
        LedgerError::InsufficientFunds { .. }
    ));
    assert!(matches!(
        ledger
            .transfer(checking.id, savings.id, dec("500.00"))
            .await
            .unwrap_err(),
        LedgerError::InsufficientFunds { .. }
    ));
    assert!(matches!(
        ledger.deposit(checking.id, dec("-5.00")).await.unwrap_err(),
        LedgerError::InvalidAmount(_)
    ));
    assert!(matches!(
        ledger
            .transfer(checking.id, checking.id, dec("10.00"))
            .await
            .unwrap_err(),
        LedgerError::InvalidTransfer(_)
    ));

    // nothing beyond the single funding deposit was recorded
    let history = ledger.transaction_history(&alice).await.unwrap();
    assert_eq!(history.len(), 1);

    for id in [checking.id, savings.id] {
        let report = ledger.reconcile_account(id).await.unwrap();
        assert!(report.is_consistent);
    }
    let stored = ledger.get_account(checking.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, dec("100.00"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deposits_are_never_lost() {
    const TASKS: usize = 50;

    let ledger = Arc::new(Ledger::new(MemoryStore::new()));
    let account = ledger
        .open_account(OwnerId::new("alice"), "Checking")
        .await
        .unwrap();
    ledger.deposit(account.id, dec("100.00")).await.unwrap();

    let mut handles = Vec::with_capacity(TASKS);
    for _ in 0..TASKS {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger.deposit(account.id, dec("1.00")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = ledger.get_account(account.id).await.unwrap().unwrap();
    assert_eq!(stored.balance, dec("150.00"));

    let history = ledger.account_history(account.id).await.unwrap();
    assert_eq!(history.len(), TASKS + 1);
    assert!(history.windows(2).all(|pair| pair[0].id > pair[1].id));

    let report = ledger.reconcile_account(account.id).await.unwrap();
    assert!(report.is_consistent);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn opposing_transfers_conserve_funds_without_deadlock() {
    const ROUNDS: usize = 20;

    let ledger = Arc::new(Ledger::new(MemoryStore::new()));
    let a = ledger
        .open_account(OwnerId::new("alice"), "Checking")
        .await
        .unwrap();
    let b = ledger
        .open_account(OwnerId::new("bob"), "Checking")
        .await
        .unwrap();
    ledger.deposit(a.id, dec("1000.00")).await.unwrap();
    ledger.deposit(b.id, dec("1000.00")).await.unwrap();

    let mut handles = Vec::with_capacity(ROUNDS * 2);
    for _ in 0..ROUNDS {
        let forward = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            forward.transfer(a.id, b.id, dec("1.00")).await
        }));
        let backward = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            backward.transfer(b.id, a.id, dec("1.00")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let a_stored = ledger.get_account(a.id).await.unwrap().unwrap();
    let b_stored = ledger.get_account(b.id).await.unwrap().unwrap();
    assert_eq!(a_stored.balance, dec("1000.00"));
    assert_eq!(b_stored.balance, dec("1000.00"));

    for id in [a.id, b.id] {
        let report = ledger.reconcile_account(id).await.unwrap();
        assert!(report.is_consistent);

        let history = ledger.account_history(id).await.unwrap();
        // one deposit plus both halves of every round
        assert_eq!(history.len(), 1 + ROUNDS * 2);
    }
}

#[tokio::test]
async fn transfer_entries_are_correlated() {
    let ledger = Ledger::new(MemoryStore::new());
    let a = ledger
        .open_account(OwnerId::new("alice"), "Checking")
        .await
        .unwrap();
    let b = ledger
        .open_account(OwnerId::new("bob"), "Checking")
        .await
        .unwrap();
    ledger.deposit(a.id, dec("10.00")).await.unwrap();

    let receipt = ledger.transfer(a.id, b.id, dec("10.00")).await.unwrap();

    let out = &ledger.account_history(a.id).await.unwrap()[0];
    let incoming = &ledger.account_history(b.id).await.unwrap()[0];
    assert_eq!(out.transfer_id, Some(receipt.transfer_id));
    assert_eq!(incoming.transfer_id, Some(receipt.transfer_id));
    assert_eq!(&out.amount + &incoming.amount, BigDecimal::from(0));
}
