//! Benchmark suite for reconciliation and journal replay
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Journals are generated into a temporary file before each benchmark: a
//! fixed number of customers, each opened with a loan, then a round-robin mix
//! of credits, payments and corrections.

use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::fs;
use tempfile::NamedTempFile;
use udhaar_ledger::cli::StrategyType;
use udhaar_ledger::core::reconciliation::reconcile;
use udhaar_ledger::strategy::{create_strategy, BatchConfig};
use udhaar_ledger::{LedgerEngine, NewCustomer, TransactionType};

const CUSTOMERS: usize = 50;

fn main() {
    divan::main();
}

fn generate_journal(rows: usize) -> NamedTempFile {
    let mut journal = String::from("action,customer,transaction,amount,text\n");
    for c in 0..CUSTOMERS {
        let _ = writeln!(journal, "open,c-{},,1000,Customer {}", c, c);
    }
    for i in 0..rows {
        let customer = i % CUSTOMERS;
        let line = match i % 5 {
            0 | 1 => format!("give,c-{},t-{},{}.25,goods", customer, i, i % 97),
            2 | 3 => format!("receive,c-{},t-{},{}.50,cash", customer, i, i % 89),
            _ => format!("correct,c-{},t-{},{},recount", (i - 4) % CUSTOMERS, i - 4, i % 13),
        };
        journal.push_str(&line);
        journal.push('\n');
    }

    let file = NamedTempFile::new().expect("Failed to create journal");
    fs::write(file.path(), journal).expect("Failed to write journal");
    file
}

/// Recompute a balance from scratch
#[divan::bench(args = [100, 1_000, 10_000])]
fn reconcile_history(bencher: divan::Bencher, transactions: usize) {
    let mut engine = LedgerEngine::new();
    let customer = engine
        .add_customer(NewCustomer::new("Bench"))
        .expect("Failed to add customer");
    for i in 0..transactions {
        let tx_type = if i % 3 == 0 {
            TransactionType::Received
        } else {
            TransactionType::Given
        };
        engine
            .create_transaction(customer.id(), Decimal::new(i as i64, 2), tx_type, "")
            .expect("Failed to record transaction");
    }
    let customer = engine
        .customer(customer.id())
        .expect("Customer missing")
        .clone();

    bencher.bench(|| reconcile(divan::black_box(customer.transactions())));
}

/// Replay a journal with the sync strategy
#[divan::bench(args = [1_000, 10_000])]
fn sync_replay(bencher: divan::Bencher, rows: usize) {
    let journal = generate_journal(rows);
    let strategy = create_strategy(StrategyType::Sync, None);

    bencher.bench(|| {
        strategy
            .process(Vec::new(), journal.path())
            .expect("Replay failed")
    });
}

/// Replay a journal with the async strategy
#[divan::bench(args = [1_000, 10_000])]
fn async_replay(bencher: divan::Bencher, rows: usize) {
    let journal = generate_journal(rows);
    let strategy = create_strategy(StrategyType::Async, Some(BatchConfig::default()));

    bencher.bench(|| {
        strategy
            .process(Vec::new(), journal.path())
            .expect("Replay failed")
    });
}
