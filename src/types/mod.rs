//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `amount`: Amount parsing and validation
//! - `customer`: Customer-related types
//! - `transaction`: Transaction-related types, identifiers and actions
//! - `journal`: Replayable journal entries
//! - `error`: Error types for the ledger

pub mod amount;
pub mod customer;
pub mod error;
pub mod journal;
pub mod transaction;

pub use amount::{amount_from_f64, ensure_valid_amount, parse_amount};
pub use customer::{
    Customer, CustomerId, NewCustomer, ReminderConfig, ReminderFrequency, SortOrder,
    INITIAL_LOAN_DESCRIPTION,
};
pub use error::LedgerError;
pub use journal::{JournalCommand, JournalEntry};
pub use transaction::{
    ledger_now, ActionOutcome, EditHistory, LedgerAction, Transaction, TransactionId,
    TransactionType,
};
