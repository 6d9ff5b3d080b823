//! Customer repository module
//!
//! This module provides the `CustomerRepository` struct which owns every
//! customer of the ledger and their display ordering.
//!
//! The CustomerRepository is responsible for:
//! - Keyed lookup of customers by ID
//! - Recency-first ordering (new customers and freshly active customers first)
//! - Staged updates that commit a customer only when the whole change succeeds
//! - Read-only views for search, export and persistence

use crate::core::reconciliation::validate_customer;
use crate::types::{Customer, CustomerId, LedgerError};
use std::collections::HashMap;

/// Keyed store of customers with recency-first ordering
///
/// `order` always holds exactly the keys of `customers`, most recently active
/// first.
#[derive(Debug, Clone, Default)]
pub struct CustomerRepository {
    /// Map of customer IDs to customer state
    customers: HashMap<CustomerId, Customer>,

    /// Display order, front is most recently active
    order: Vec<CustomerId>,
}

impl CustomerRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        CustomerRepository {
            customers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Build a repository from a loaded customer list, keeping its order
    ///
    /// # Errors
    ///
    /// - `DuplicateCustomer` if two customers share an ID
    /// - `InvalidAmount` or `DuplicateTransaction` if a customer carries a
    ///   negative amount or a repeated transaction ID
    /// - `InvariantViolation` if any customer's balance does not reconcile
    pub fn from_customers(customers: Vec<Customer>) -> Result<Self, LedgerError> {
        let mut repository = CustomerRepository::new();
        for customer in customers {
            validate_customer(&customer)?;
            if repository.customers.contains_key(customer.id()) {
                return Err(LedgerError::duplicate_customer(customer.id()));
            }
            repository.order.push(customer.id().clone());
            repository.customers.insert(customer.id().clone(), customer);
        }
        Ok(repository)
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn contains(&self, customer_id: &CustomerId) -> bool {
        self.customers.contains_key(customer_id)
    }

    /// Look up a customer by ID
    pub fn get(&self, customer_id: &CustomerId) -> Option<&Customer> {
        self.customers.get(customer_id)
    }

    /// All customers, most recently active first
    pub fn list(&self) -> Vec<&Customer> {
        self.order
            .iter()
            .filter_map(|id| self.customers.get(id))
            .collect()
    }

    /// Owned copy of all customers in order, for persistence and export
    pub fn snapshot(&self) -> Vec<Customer> {
        self.list().into_iter().cloned().collect()
    }

    /// Case-insensitive substring search over name and phone
    ///
    /// The query is trimmed and lowercased; an empty query returns every
    /// customer. Results keep the repository order.
    pub fn search(&self, query: &str) -> Vec<&Customer> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list();
        }
        self.list()
            .into_iter()
            .filter(|customer| customer.matches(&needle))
            .collect()
    }

    /// Insert a new customer or replace an existing one
    ///
    /// New customers go to the front; existing customers keep their position.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`validate_customer`]; the repository is left
    /// unchanged.
    pub fn upsert(&mut self, customer: Customer) -> Result<(), LedgerError> {
        validate_customer(&customer)?;
        let id = customer.id().clone();
        if self.customers.insert(id.clone(), customer).is_none() {
            self.order.insert(0, id);
        }
        Ok(())
    }

    /// Insert a customer that must not exist yet, at the front
    ///
    /// # Errors
    ///
    /// - `DuplicateCustomer` if the ID is already taken
    /// - `InvalidAmount` or `DuplicateTransaction` if the customer carries a
    ///   negative amount or a repeated transaction ID
    /// - `InvariantViolation` if the customer's balance does not reconcile
    pub fn insert_new(&mut self, customer: Customer) -> Result<(), LedgerError> {
        if self.contains(customer.id()) {
            return Err(LedgerError::duplicate_customer(customer.id()));
        }
        self.upsert(customer)
    }

    /// Move a customer to the front of the ordering
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` if the ID is unknown.
    pub fn promote(&mut self, customer_id: &CustomerId) -> Result<(), LedgerError> {
        let position = self
            .order
            .iter()
            .position(|id| id == customer_id)
            .ok_or_else(|| LedgerError::customer_not_found(customer_id))?;
        let id = self.order.remove(position);
        self.order.insert(0, id);
        Ok(())
    }

    /// Apply a change to a working copy of a customer and commit it on success
    ///
    /// The closure sees a clone; if it returns an error the stored customer is
    /// untouched, so a failed mutation never leaves partial state behind.
    /// Position in the ordering is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` if the ID is unknown, or whatever the
    /// closure returns.
    pub(crate) fn update<T, F>(&mut self, customer_id: &CustomerId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Customer) -> Result<T, LedgerError>,
    {
        let stored = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| LedgerError::customer_not_found(customer_id))?;

        let mut staged = stored.clone();
        let output = f(&mut staged)?;
        *stored = staged;

        Ok(output)
    }
}
