//! Ledger mutation engine
//!
//! This module provides the LedgerEngine, the only path through which
//! transactions are created or corrected. It coordinates the
//! CustomerRepository, the reconciliation rules and an optional persistence
//! sink.
//!
//! The engine enforces rules such as:
//! - Amounts are validated before any state is touched
//! - Every change is staged on a working copy and committed only on success
//! - Creation applies an incremental delta, then checks it against a full
//!   reconciliation
//! - Corrections always recompute the balance from the whole history

use crate::core::customer_repository::CustomerRepository;
use crate::core::reconciliation::{reconcile_customer, verify_balance};
use crate::core::summary::LedgerSummary;
use crate::core::traits::{LedgerOperations, LedgerSink, LedgerSource};
use crate::types::{
    ensure_valid_amount, ledger_now, Customer, CustomerId, LedgerError, NewCustomer,
    ReminderConfig, Transaction, TransactionId, TransactionType,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Stage the creation of a transaction on a working copy of a customer
///
/// Shared by the synchronous and concurrent engines.
pub(crate) fn stage_creation(
    customer: &mut Customer,
    transaction_id: TransactionId,
    amount: Decimal,
    tx_type: TransactionType,
    description: &str,
    at: DateTime<Utc>,
) -> Result<Transaction, LedgerError> {
    if customer.transaction(&transaction_id).is_some() {
        return Err(LedgerError::duplicate_transaction(
            customer.id(),
            &transaction_id,
        ));
    }

    let balance = customer
        .balance()
        .checked_add(tx_type.signed(amount))
        .ok_or_else(|| LedgerError::arithmetic_overflow("create_transaction", customer.id()))?;

    let transaction = Transaction::new(transaction_id, amount, tx_type, description, at);
    customer.prepend_transaction(transaction.clone());
    customer.set_balance(balance);
    customer.touch(at);

    // The delta must agree with a full recomputation
    verify_balance(customer)?;

    Ok(transaction)
}

/// Stage a correction on a working copy of a customer
///
/// Shared by the synchronous and concurrent engines.
pub(crate) fn stage_correction(
    customer: &mut Customer,
    transaction_id: &TransactionId,
    new_amount: Decimal,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<(), LedgerError> {
    let customer_id = customer.id().clone();
    customer
        .transaction_mut(transaction_id)
        .ok_or_else(|| LedgerError::transaction_not_found(&customer_id, transaction_id))?
        .amend(new_amount, reason, at);

    let balance = reconcile_customer(customer)?;
    customer.set_balance(balance);
    customer.touch(at);

    Ok(())
}

/// Ledger mutation engine
///
/// Owns the CustomerRepository and hands the full ordered ledger to its sink
/// (if any) after every successful mutation.
#[derive(Default)]
pub struct LedgerEngine {
    repository: CustomerRepository,
    sink: Option<Box<dyn LedgerSink + Send>>,
}

impl LedgerEngine {
    /// Create an empty engine with no persistence sink
    pub fn new() -> Self {
        LedgerEngine {
            repository: CustomerRepository::new(),
            sink: None,
        }
    }

    /// Build an engine over already loaded customers
    ///
    /// # Errors
    ///
    /// Fails if any customer's balance does not reconcile or two customers
    /// share an ID. A drifted ledger is rejected rather than repaired.
    pub fn from_customers(customers: Vec<Customer>) -> Result<Self, LedgerError> {
        Ok(LedgerEngine {
            repository: CustomerRepository::from_customers(customers)?,
            sink: None,
        })
    }

    /// Load a ledger from a persistence source
    pub fn load(source: &dyn LedgerSource) -> Result<Self, LedgerError> {
        let customers = source.load()?;
        tracing::debug!(customers = customers.len(), "ledger loaded");
        Self::from_customers(customers)
    }

    /// Attach a sink that receives the full ledger after every mutation
    pub fn with_sink(mut self, sink: impl LedgerSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Open a new customer from a draft
    ///
    /// Generates the customer ID and places the customer first in the
    /// ordering. A positive initial loan is recorded as a GIVEN transaction.
    ///
    /// # Errors
    ///
    /// - `InvalidCustomer` if the name is blank or the interest rate negative
    /// - `InvalidAmount` if the loan amount is negative
    /// - `Persistence` if the sink fails (the customer is still added)
    pub fn add_customer(&mut self, draft: NewCustomer) -> Result<Customer, LedgerError> {
        let customer = Customer::open(CustomerId::generate(), draft, ledger_now())?;
        self.repository.insert_new(customer.clone())?;

        tracing::info!(customer = %customer.id(), name = %customer.name, "customer added");
        self.persist()?;

        Ok(customer)
    }

    /// Insert a fully formed customer
    ///
    /// # Errors
    ///
    /// - `DuplicateCustomer` if the ID is taken
    /// - `InvariantViolation` if the customer's balance does not reconcile
    /// - `Persistence` if the sink fails
    pub fn register_customer(&mut self, customer: Customer) -> Result<(), LedgerError> {
        let customer_id = customer.id().clone();
        self.repository.insert_new(customer)?;

        tracing::info!(customer = %customer_id, "customer registered");
        self.persist()
    }

    /// Record a credit or payment
    ///
    /// # Arguments
    ///
    /// * `customer_id` - The customer the transaction belongs to
    /// * `amount` - Non-negative magnitude
    /// * `tx_type` - GIVEN increases the balance, RECEIVED decreases it
    /// * `description` - Free text
    ///
    /// # Returns
    ///
    /// The created transaction. The customer moves to the front of the
    /// ordering.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` if the customer does not exist
    /// - `InvalidAmount` if the amount is negative
    /// - `ArithmeticOverflow` if the balance leaves the decimal range
    /// - `Persistence` if the sink fails (the transaction is still recorded)
    pub fn create_transaction(
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

    /// Record a credit or payment under a caller-supplied transaction ID
    ///
    /// Same as [`LedgerEngine::create_transaction`], and additionally fails
    /// with `DuplicateTransaction` if the customer already has a transaction
    /// with this ID.
    pub fn create_transaction_with_id(
        &mut self,
        customer_id: &CustomerId,
        transaction_id: TransactionId,
        amount: Decimal,
        tx_type: TransactionType,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        let amount = ensure_valid_amount(amount)?;
        let now = ledger_now();

        let transaction = self.repository.update(customer_id, |customer| {
            stage_creation(customer, transaction_id, amount, tx_type, description, now)
        })?;
        self.repository.promote(customer_id)?;

        tracing::info!(
            customer = %customer_id,
            transaction = %transaction.id(),
            tx_type = %tx_type,
            amount = %amount,
            "transaction recorded"
        );
        self.persist()?;

        Ok(transaction)
    }

    /// Correct the amount of an existing transaction
    ///
    /// Appends an audit record holding the replaced amount, marks the
    /// transaction edited and recomputes the balance from the whole history.
    /// The customer keeps its position in the ordering.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` if the customer does not exist
    /// - `TransactionNotFound` if the customer has no such transaction,
    ///   including one that belongs to a different customer
    /// - `InvalidAmount` if the new amount is negative
    /// - `Persistence` if the sink fails (the correction is still applied)
    pub fn correct_transaction(
        &mut self,
        customer_id: &CustomerId,
        transaction_id: &TransactionId,
        new_amount: Decimal,
        reason: &str,
    ) -> Result<(), LedgerError> {
        let new_amount = ensure_valid_amount(new_amount)?;
        let now = ledger_now();

        self.repository.update(customer_id, |customer| {
            stage_correction(customer, transaction_id, new_amount, reason, now)
        })?;

        tracing::info!(
            customer = %customer_id,
            transaction = %transaction_id,
            amount = %new_amount,
            reason,
            "transaction corrected"
        );
        self.persist()
    }

    /// Replace a customer's reminder configuration
    pub fn set_reminder(
        &mut self,
        customer_id: &CustomerId,
        reminder: Option<ReminderConfig>,
    ) -> Result<(), LedgerError> {
        self.repository.update(customer_id, |customer| {
            customer.reminder_config = reminder;
            Ok(())
        })?;
        tracing::debug!(customer = %customer_id, "reminder updated");
        self.persist()
    }

    /// Change a customer's display name and phone
    ///
    /// # Errors
    ///
    /// Returns `InvalidCustomer` if the name is blank after trimming.
    pub fn update_contact(
        &mut self,
        customer_id: &CustomerId,
        name: &str,
        phone: &str,
    ) -> Result<(), LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::invalid_customer("name must not be empty"));
        }

        self.repository.update(customer_id, |customer| {
            customer.name = name.to_string();
            customer.phone = phone.trim().to_string();
            Ok(())
        })?;
        tracing::debug!(customer = %customer_id, "contact updated");
        self.persist()
    }

    pub fn customer(&self, customer_id: &CustomerId) -> Option<&Customer> {
        self.repository.get(customer_id)
    }

    /// All customers, most recently active first
    pub fn customers(&self) -> Vec<&Customer> {
        self.repository.list()
    }

    pub fn search(&self, query: &str) -> Vec<&Customer> {
        self.repository.search(query)
    }

    /// Owned, ordered copy of the ledger
    pub fn snapshot(&self) -> Vec<Customer> {
        self.repository.snapshot()
    }

    /// Portfolio totals
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if a total leaves the decimal range.
    pub fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        LedgerSummary::from_customers(self.repository.list())
    }

    /// Hand the current ledger to the sink, if one is attached
    pub fn flush(&self) -> Result<(), LedgerError> {
        self.persist()
    }

    fn persist(&self) -> Result<(), LedgerError> {
        let Some(sink) = &self.sink else {
            return Ok(());
        };

        sink.persist(&self.repository.snapshot()).inspect_err(|e| {
            tracing::error!(error = %e, "failed to persist ledger");
        })
    }
}

impl LedgerOperations for LedgerEngine {
    fn register_customer(&mut self, customer: Customer) -> Result<(), LedgerError> {
        LedgerEngine::register_customer(self, customer)
    }

    fn create_transaction_with_id(
        &mut self,
        customer_id: &CustomerId,
        transaction_id: TransactionId,
        amount: Decimal,
        tx_type: TransactionType,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        LedgerEngine::create_transaction_with_id(
            self,
            customer_id,
            transaction_id,
            amount,
            tx_type,
            description,
        )
    }

    fn correct_transaction(
        &mut self,
        customer_id: &CustomerId,
        transaction_id: &TransactionId,
        new_amount: Decimal,
        reason: &str,
    ) -> Result<(), LedgerError> {
        LedgerEngine::correct_transaction(self, customer_id, transaction_id, new_amount, reason)
    }
}
