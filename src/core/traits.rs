//! Core traits for ledger persistence and ledger mutation
//!
//! This module defines the trait abstractions that allow the synchronous and
//! concurrent engines, and the file-backed and in-memory stores, to be used
//! interchangeably.

use crate::types::{
    ledger_now, ActionOutcome, Customer, CustomerId, JournalCommand, JournalEntry, LedgerAction,
    LedgerError, NewCustomer, Transaction, TransactionId, TransactionType,
};
use rust_decimal::Decimal;

/// Source of a previously persisted ledger
///
/// Implementations return customers in their persisted order, most recently
/// active first.
pub trait LedgerSource {
    /// Load every customer
    fn load(&self) -> Result<Vec<Customer>, LedgerError>;
}

/// Destination for the full ordered customer collection
///
/// Called after every successful mutation with the complete ledger.
pub trait LedgerSink {
    /// Persist every customer, replacing whatever was stored before
    fn persist(&self, customers: &[Customer]) -> Result<(), LedgerError>;
}

/// Trait for mutating a ledger
///
/// Provides the transaction creation and correction interface shared by
/// [`crate::core::LedgerEngine`] and [`crate::core::AsyncLedgerEngine`].
/// Journal replay and tests drive either engine through it.
pub trait LedgerOperations {
    /// Insert a fully formed customer
    fn register_customer(&mut self, customer: Customer) -> Result<(), LedgerError>;

    /// Record a credit or payment under a caller-supplied transaction ID
    fn create_transaction_with_id(
        &mut self,
        customer_id: &CustomerId,
        transaction_id: TransactionId,
        amount: Decimal,
        tx_type: TransactionType,
        description: &str,
    ) -> Result<Transaction, LedgerError>;

    /// Correct the amount of an existing transaction
    fn correct_transaction(
        &mut self,
        customer_id: &CustomerId,
        transaction_id: &TransactionId,
        new_amount: Decimal,
        reason: &str,
    ) -> Result<(), LedgerError>;

    /// Record a credit or payment under a freshly generated transaction ID
    fn create_transaction(
        &mut self,
        customer_id: &CustomerId,
        amount: Decimal,
        tx_type: TransactionType,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        self.create_transaction_with_id(
            customer_id,
            TransactionId::generate(),
            amount,
            tx_type,
            description,
        )
    }

    /// Dispatch a typed ledger action
    fn apply(
        &mut self,
        customer_id: &CustomerId,
        action: LedgerAction,
    ) -> Result<ActionOutcome, LedgerError> {
        match action {
            LedgerAction::Add {
                amount,
                tx_type,
                description,
            } => self
                .create_transaction(customer_id, amount, tx_type, &description)
                .map(ActionOutcome::Created),
            LedgerAction::Correct {
                transaction_id,
                amount,
                reason,
            } => {
                self.correct_transaction(customer_id, &transaction_id, amount, &reason)?;
                Ok(ActionOutcome::Corrected { transaction_id })
            }
        }
    }

    /// Replay one journal entry
    fn replay(&mut self, entry: JournalEntry) -> Result<(), LedgerError> {
        match entry.command {
            JournalCommand::Open { name, loan } => {
                let mut draft = NewCustomer::new(name);
                draft.loan_amount = loan;
                let customer = Customer::open(entry.customer, draft, ledger_now())?;
                self.register_customer(customer)
            }
            JournalCommand::Record {
                transaction_id: Some(transaction_id),
                amount,
                tx_type,
                description,
            } => self
                .create_transaction_with_id(
                    &entry.customer,
                    transaction_id,
                    amount,
                    tx_type,
                    &description,
                )
                .map(|_| ()),
            JournalCommand::Record {
                transaction_id: None,
                amount,
                tx_type,
                description,
            } => self
                .apply(
                    &entry.customer,
                    LedgerAction::Add {
                        amount,
                        tx_type,
                        description,
                    },
                )
                .map(|_| ()),
            JournalCommand::Correct {
                transaction_id,
                amount,
                reason,
            } => self
                .apply(
                    &entry.customer,
                    LedgerAction::Correct {
                        transaction_id,
                        amount,
                        reason,
                    },
                )
                .map(|_| ()),
        }
    }
}
