//! Basic banking walkthrough

use banking_core::utils::MemoryStore;
use banking_core::{Ledger, LedgerError, OwnerId};
use bigdecimal::BigDecimal;
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Banking Core - Basic Example\n");

    let ledger = Ledger::new(MemoryStore::new());
    let alice = OwnerId::new("alice");
    let bob = OwnerId::new("bob");

    // 1. Open accounts
    println!("📂 Opening accounts...");
    let alice_checking = ledger.open_account(alice.clone(), "Checking").await?;
    let alice_savings = ledger.open_account(alice.clone(), "Savings").await?;
    let bob_checking = ledger.open_account(bob.clone(), "Checking").await?;
    println!("  ✓ Opened 3 accounts\n");

    // 2. Fund them
    println!("💰 Depositing funds...");
    let receipt = ledger
        .deposit(alice_checking.id, BigDecimal::from_str("1000.00")?)
        .await?;
    println!("  ✓ Alice/Checking balance: {}", receipt.balance);

    let receipt = ledger
        .deposit(bob_checking.id, BigDecimal::from_str("500.00")?)
        .await?;
    println!("  ✓ Bob/Checking balance: {}\n", receipt.balance);

    // 3. Move money around
    println!("🔁 Transferring...");
    let transfer = ledger
        .transfer(
            alice_checking.id,
            alice_savings.id,
            BigDecimal::from_str("250.00")?,
        )
        .await?;
    println!(
        "  ✓ Checking -> Savings: {} (checking now {}, savings now {})",
        transfer.incoming.amount, transfer.from_balance, transfer.to_balance
    );

    let transfer = ledger
        .transfer(
            alice_checking.id,
            bob_checking.id,
            BigDecimal::from_str("100.00")?,
        )
        .await?;
    println!(
        "  ✓ Alice -> Bob: {} (correlation id {})\n",
        transfer.incoming.amount, transfer.transfer_id
    );

    // 4. A withdrawal that cannot succeed
    println!("🚫 Attempting an overdraft...");
    match ledger
        .withdraw(bob_checking.id, BigDecimal::from_str("10000.00")?)
        .await
    {
        Err(LedgerError::InsufficientFunds { available, .. }) => {
            println!("  ✓ Rejected, balance untouched at {}\n", available);
        }
        other => panic!("expected insufficient funds, got {:?}", other),
    }

    // 5. Account overview and history
    println!("📊 Alice's accounts:");
    let detail = ledger.account_detail(&alice).await?;
    for summary in &detail.accounts {
        println!("  {} — {}", summary.name, summary.balance);
    }

    println!("\n📜 Alice's transaction history (most recent first):");
    for entry in ledger.transaction_history(&alice).await? {
        println!("  #{} {:?} {}", entry.id, entry.kind, entry.amount);
    }

    // 6. Reconciliation check
    println!("\n🔍 Reconciling...");
    for id in [alice_checking.id, alice_savings.id, bob_checking.id] {
        let report = ledger.reconcile_account(id).await?;
        println!(
            "  {} balance {} == entry sum {} ({})",
            report.account_id,
            report.balance,
            report.entry_sum,
            if report.is_consistent { "ok" } else { "MISMATCH" }
        );
    }

    Ok(())
}
