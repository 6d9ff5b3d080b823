//! Journal entry types
//!
//! A journal is a sequence of ledger commands replayed through the mutation
//! service. Entries are produced by the CSV readers in `io` and consumed by
//! [`crate::core::traits::LedgerOperations::replay`].

use super::customer::CustomerId;
use super::transaction::{TransactionId, TransactionType};
use rust_decimal::Decimal;

/// One replayable ledger command addressed to a customer
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub customer: CustomerId,
    pub command: JournalCommand,
}

/// What a journal entry does
#[derive(Debug, Clone, PartialEq)]
pub enum JournalCommand {
    /// Open a customer with this ID, optionally with an initial loan
    Open { name: String, loan: Option<Decimal> },

    /// Record a credit or payment
    ///
    /// Without an explicit transaction ID a fresh one is generated.
    Record {
        transaction_id: Option<TransactionId>,
        amount: Decimal,
        tx_type: TransactionType,
        description: String,
    },

    /// Correct the amount of an earlier transaction
    Correct {
        transaction_id: TransactionId,
        amount: Decimal,
        reason: String,
    },
}

impl JournalEntry {
    /// Short label used in log lines
    pub fn action_name(&self) -> &'static str {
        match &self.command {
            JournalCommand::Open { .. } => "open",
            JournalCommand::Record {
                tx_type: TransactionType::Given,
                ..
            } => "give",
            JournalCommand::Record {
                tx_type: TransactionType::Received,
                ..
            } => "receive",
            JournalCommand::Correct { .. } => "correct",
        }
    }
}
