//! Udhaar Ledger Library
//! # Overview
//!
//! A personal credit ledger for informal lenders: customers, the money given
//! to and received from them, and an audit trail of every correction. The
//! cached balance of each customer always equals the signed sum of its
//! transactions.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Customer, Transaction, JournalEntry, etc.)
//! - [`cli`] - CLI arguments parsing and command execution
//! - [`core`] - Business logic components:
//!   - [`core::reconciliation`] - Balance recomputation and invariant checks
//!   - [`core::engine`] - Mutation engine (stage, verify, commit, persist)
//!   - [`core::customer_repository`] - Ordered customer collection
//!   - [`core::summary`] / [`core::notification`] - Read-only collaborators
//! - [`io`] - Journal readers, CSV exports and the JSON ledger store
//! - [`strategy`] - Sync and concurrent journal replay
//!
//! # Transaction Types
//!
//! - **Given**: money lent to the customer, increases the balance
//! - **Received**: money paid back by the customer, decreases the balance
//!
//! A positive balance is owed by the customer; a negative one is an advance
//! held on their behalf.

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{LedgerEngine, LedgerSummary};
pub use io::{write_balances_csv, write_customers_csv, JsonFileStore};
pub use types::{
    Customer, CustomerId, LedgerAction, LedgerError, NewCustomer, Transaction, TransactionId,
    TransactionType,
};
