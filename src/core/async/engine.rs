//! Thread-safe ledger mutation engine
//!
//! This module provides the `AsyncLedgerEngine`, the concurrent counterpart
//! of [`crate::core::LedgerEngine`]. Every method takes `&self`, so the
//! engine can be shared behind an `Arc` between tasks.
//!
//! # Architecture
//!
//! ```text
//! AsyncLedgerEngine
//!     └── Arc<AsyncCustomerRepository>  (DashMap, per-customer entry locks)
//! ```
//!
//! Validation and staging are the same functions the synchronous engine uses;
//! only the repository differs. There is no persistence sink: callers persist
//! a snapshot once replay is done.

use std::sync::Arc;

use super::AsyncCustomerRepository;
use crate::core::engine::{stage_correction, stage_creation};
use crate::core::summary::LedgerSummary;
use crate::core::traits::LedgerOperations;
use crate::types::{
    ensure_valid_amount, ledger_now, Customer, CustomerId, LedgerError, NewCustomer,
    ReminderConfig, Transaction, TransactionId, TransactionType,
};
use rust_decimal::Decimal;

/// Thread-safe ledger mutation engine
#[derive(Debug, Clone, Default)]
pub struct AsyncLedgerEngine {
    repository: Arc<AsyncCustomerRepository>,
}

impl AsyncLedgerEngine {
    /// Create an engine over an empty repository
    pub fn new() -> Self {
        Self {
            repository: Arc::new(AsyncCustomerRepository::new()),
        }
    }

    /// Create an engine over an existing shared repository
    pub fn with_repository(repository: Arc<AsyncCustomerRepository>) -> Self {
        Self { repository }
    }

    /// Build an engine over already loaded customers
    ///
    /// # Errors
    ///
    /// Fails if any customer's balance does not reconcile or two customers
    /// share an ID.
    pub fn from_customers(customers: Vec<Customer>) -> Result<Self, LedgerError> {
        Ok(Self::with_repository(Arc::new(
            AsyncCustomerRepository::from_customers(customers)?,
        )))
    }

    /// The shared repository
    pub fn repository(&self) -> Arc<AsyncCustomerRepository> {
        Arc::clone(&self.repository)
    }

    pub fn add_customer(&self, draft: NewCustomer) -> Result<Customer, LedgerError> {
        let customer = Customer::open(CustomerId::generate(), draft, ledger_now())?;
        self.repository.insert_new(customer.clone())?;
        tracing::info!(customer = %customer.id(), name = %customer.name, "customer added");
        Ok(customer)
    }

    /// Insert a fully formed customer
    ///
    /// # Errors
    ///
    /// - `DuplicateCustomer` if the ID is taken, including by a concurrent
    ///   registration of the same ID
    /// - `InvariantViolation` if the customer's balance does not reconcile
    pub fn register_customer(&self, customer: Customer) -> Result<(), LedgerError> {
        let customer_id = customer.id().clone();
        self.repository.insert_new(customer)?;
        tracing::info!(customer = %customer_id, "customer registered");
        Ok(())
    }

    pub fn create_transaction(
        &self,
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
    /// The customer's entry stays locked for the whole staged update and the
    /// promotion, so concurrent creations on one customer never lose an
    /// update.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` if the customer does not exist
    /// - `InvalidAmount` if the amount is negative
    /// - `DuplicateTransaction` if the ID is already used by this customer
    /// - `ArithmeticOverflow` if the balance leaves the decimal range
    pub fn create_transaction_with_id(
        &self,
        customer_id: &CustomerId,
        transaction_id: TransactionId,
        amount: Decimal,
        tx_type: TransactionType,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        let amount = ensure_valid_amount(amount)?;
        let now = ledger_now();

        let transaction = self.repository.update_and_promote(customer_id, |customer| {
            stage_creation(customer, transaction_id, amount, tx_type, description, now)
        })?;

        tracing::info!(
            customer = %customer_id,
            transaction = %transaction.id(),
            tx_type = %tx_type,
            amount = %amount,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Correct the amount of an existing transaction
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` if the customer does not exist
    /// - `TransactionNotFound` if the customer has no such transaction
    /// - `InvalidAmount` if the new amount is negative
    pub fn correct_transaction(
        &self,
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
        Ok(())
    }

    pub fn set_reminder(
        &self,
        customer_id: &CustomerId,
        reminder: Option<ReminderConfig>,
    ) -> Result<(), LedgerError> {
        self.repository.update(customer_id, |customer| {
            customer.reminder_config = reminder;
            Ok(())
        })
    }

    pub fn update_contact(
        &self,
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
        })
    }

    pub fn customer(&self, customer_id: &CustomerId) -> Option<Customer> {
        self.repository.get(customer_id)
    }

    /// All customers, most recently active first
    pub fn customers(&self) -> Vec<Customer> {
        self.repository.list()
    }

    pub fn search(&self, query: &str) -> Vec<Customer> {
        self.repository.search(query)
    }

    pub fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        LedgerSummary::from_customers(&self.repository.list())
    }
}

/// Implemented on a shared reference so that tasks holding an
/// `Arc<AsyncLedgerEngine>` can drive it through [`LedgerOperations`].
impl LedgerOperations for &AsyncLedgerEngine {
    fn register_customer(&mut self, customer: Customer) -> Result<(), LedgerError> {
        AsyncLedgerEngine::register_customer(*self, customer)
    }

    fn create_transaction_with_id(
        &mut self,
        customer_id: &CustomerId,
        transaction_id: TransactionId,
        amount: Decimal,
        tx_type: TransactionType,
        description: &str,
    ) -> Result<Transaction, LedgerError> {
        AsyncLedgerEngine::create_transaction_with_id(
            *self,
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
        AsyncLedgerEngine::correct_transaction(
            *self,
            customer_id,
            transaction_id,
            new_amount,
            reason,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconciliation::reconcile;
    use crate::types::{ActionOutcome, LedgerAction};
    use std::thread;

    fn dec(value: i64) -> Decimal {
        Decimal::new(value, 0)
    }

    #[test]
    fn test_scenarios_match_synchronous_engine() {
        let engine = AsyncLedgerEngine::new();
        let customer = engine
            .add_customer(NewCustomer::new("Ravi").with_loan_amount(dec(500)))
            .unwrap();
        let id = customer.id().clone();
        assert_eq!(engine.customer(&id).unwrap().balance(), dec(500));

        engine
            .create_transaction(&id, dec(200), TransactionType::Received, "")
            .unwrap();
        assert_eq!(engine.customer(&id).unwrap().balance(), dec(300));

        let loan_tx = customer.transactions()[0].id().clone();
        engine.correct_transaction(&id, &loan_tx, dec(450), "typo").unwrap();

        let after = engine.customer(&id).unwrap();
        assert_eq!(after.balance(), dec(250));
        let corrected = after.transaction(&loan_tx).unwrap();
        assert_eq!(corrected.history()[0].previous_value(), dec(500));
        assert!(corrected.is_edited());
    }

    #[test]
    fn test_failed_correction_leaves_customer_untouched() {
        let engine = AsyncLedgerEngine::new();
        let customer = engine
            .add_customer(NewCustomer::new("Ravi").with_loan_amount(dec(100)))
            .unwrap();

        let result = engine.correct_transaction(
            customer.id(),
            &TransactionId::from("not-here"),
            dec(5),
            "",
        );

        assert!(matches!(result, Err(LedgerError::TransactionNotFound { .. })));
        assert_eq!(engine.customer(customer.id()).unwrap(), customer);
    }

    #[test]
    fn test_creation_promotes_customer() {
        let engine = AsyncLedgerEngine::new();
        let ravi = engine.add_customer(NewCustomer::new("Ravi")).unwrap();
        engine.add_customer(NewCustomer::new("Meena")).unwrap();

        engine
            .create_transaction(ravi.id(), dec(1), TransactionType::Given, "")
            .unwrap();

        assert_eq!(engine.customers()[0].id(), ravi.id());
    }

    #[test]
    fn test_operations_through_shared_reference() {
        let engine = AsyncLedgerEngine::new();
        let customer = engine.add_customer(NewCustomer::new("Ravi")).unwrap();

        let mut ops = &engine;
        let outcome = ops
            .apply(
                customer.id(),
                LedgerAction::Add {
                    amount: dec(40),
                    tx_type: TransactionType::Given,
                    description: "flour".to_string(),
                },
            )
            .unwrap();

        assert!(matches!(outcome, ActionOutcome::Created(_)));
        assert_eq!(engine.customer(customer.id()).unwrap().balance(), dec(40));
    }

    #[test]
    fn test_concurrent_creations_on_one_customer_are_not_lost() {
        let engine = Arc::new(AsyncLedgerEngine::new());
        let customer = engine.add_customer(NewCustomer::new("Ravi")).unwrap();
        let id = customer.id().clone();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                let id = id.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let tx_type = if i % 2 == 0 {
                            TransactionType::Given
                        } else {
                            TransactionType::Received
                        };
                        engine.create_transaction(&id, dec(3), tx_type, "").unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let customer = engine.customer(&id).unwrap();
        assert_eq!(customer.transactions().len(), 200);
        assert_eq!(customer.balance(), Decimal::ZERO);
        assert_eq!(reconcile(customer.transactions()), Some(customer.balance()));
    }

    #[test]
    fn test_concurrent_customers_stay_consistent() {
        let engine = Arc::new(AsyncLedgerEngine::new());
        let ids: Vec<CustomerId> = (0..4)
            .map(|i| {
                engine
                    .add_customer(NewCustomer::new(format!("Customer {}", i)))
                    .unwrap()
                    .id()
                    .clone()
            })
            .collect();

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|id| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let tx = engine
                        .create_transaction(&id, dec(100), TransactionType::Given, "")
                        .unwrap();
                    engine.correct_transaction(&id, tx.id(), dec(60), "fix").unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        for id in &ids {
            assert_eq!(engine.customer(id).unwrap().balance(), dec(60));
        }
        assert_eq!(engine.summary().unwrap().net_balance, dec(240));
    }
}
