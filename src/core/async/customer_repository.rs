//! Thread-safe customer repository for concurrent journal replay
//!
//! This module provides the `AsyncCustomerRepository` struct, which keeps
//! customers in a `DashMap` so that mutations on different customers proceed
//! in parallel while mutations on the same customer are serialized.
//!
//! # Design
//!
//! Recency ordering is kept as an activity rank per customer instead of a
//! shared list. Ranks come from a single atomic counter; promoting a customer
//! only rewrites its own rank, so operations on different customers never
//! coordinate. Listing sorts by rank, highest first.
//!
//! # Thread Safety
//!
//! Every update runs while holding the customer's map entry, covering the
//! whole read-modify-write of transactions, balance and rank. No other
//! thread can observe a partially updated customer.

use crate::core::reconciliation::validate_customer;
use crate::types::{Customer, CustomerId, LedgerError};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A customer together with its activity rank
#[derive(Debug, Clone)]
struct Slot {
    rank: u64,
    customer: Customer,
}

/// Thread-safe keyed store of customers with rank-based recency ordering
#[derive(Debug)]
pub struct AsyncCustomerRepository {
    /// Concurrent map of customer state by ID
    customers: DashMap<CustomerId, Slot>,

    /// Next activity rank to hand out
    next_rank: AtomicU64,
}

impl AsyncCustomerRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            customers: DashMap::new(),
            next_rank: AtomicU64::new(1),
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
        let repository = Self::new();
        // Insert in reverse so the first customer ends with the highest rank
        for customer in customers.into_iter().rev() {
            repository.insert_new(customer)?;
        }
        Ok(repository)
    }

    fn bump_rank(&self) -> u64 {
        self.next_rank.fetch_add(1, Ordering::Relaxed)
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

    /// Snapshot of one customer
    ///
    /// A clone taken at call time; later updates by other threads are not
    /// reflected in it.
    pub fn get(&self, customer_id: &CustomerId) -> Option<Customer> {
        self.customers
            .get(customer_id)
            .map(|slot| slot.customer.clone())
    }

    /// Snapshot of all customers, most recently active first
    pub fn list(&self) -> Vec<Customer> {
        let mut slots: Vec<Slot> = self
            .customers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        slots.sort_by(|a, b| b.rank.cmp(&a.rank));
        slots.into_iter().map(|slot| slot.customer).collect()
    }

    /// Case-insensitive substring search over name and phone
    ///
    /// An empty (or blank) query returns every customer.
    pub fn search(&self, query: &str) -> Vec<Customer> {
        let needle = query.trim().to_lowercase();
        let customers = self.list();
        if needle.is_empty() {
            return customers;
        }
        customers
            .into_iter()
            .filter(|customer| customer.matches(&needle))
            .collect()
    }

    /// Insert a new customer or replace an existing one
    ///
    /// New customers get the highest rank; existing customers keep theirs.
    pub fn upsert(&self, customer: Customer) -> Result<(), LedgerError> {
        validate_customer(&customer)?;
        let mut slot = self
            .customers
            .entry(customer.id().clone())
            .or_insert_with(|| Slot {
                rank: self.bump_rank(),
                customer: customer.clone(),
            });
        slot.customer = customer;
        Ok(())
    }

    /// Insert a customer that must not exist yet
    ///
    /// # Errors
    ///
    /// - `DuplicateCustomer` if the ID is already taken
    /// - `InvalidAmount` or `DuplicateTransaction` if the customer carries a
    ///   negative amount or a repeated transaction ID
    /// - `InvariantViolation` if the customer's balance does not reconcile
    pub fn insert_new(&self, customer: Customer) -> Result<(), LedgerError> {
        validate_customer(&customer)?;
        let customer_id = customer.id().clone();

        let mut inserted = false;
        let _slot = self
            .customers
            .entry(customer_id.clone())
            .or_insert_with(|| {
                inserted = true;
                Slot {
                    rank: self.bump_rank(),
                    customer,
                }
            });

        if inserted {
            Ok(())
        } else {
            Err(LedgerError::duplicate_customer(&customer_id))
        }
    }

    /// Give a customer the highest rank
    pub fn promote(&self, customer_id: &CustomerId) -> Result<(), LedgerError> {
        let mut slot = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| LedgerError::customer_not_found(customer_id))?;
        slot.rank = self.bump_rank();
        Ok(())
    }

    /// Apply a change to a working copy of a customer and commit it on success
    ///
    /// The entry stays locked from the read of the working copy to the commit.
    /// The rank is unchanged.
    pub(crate) fn update<T, F>(&self, customer_id: &CustomerId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Customer) -> Result<T, LedgerError>,
    {
        self.stage(customer_id, false, f)
    }

    /// Same as [`AsyncCustomerRepository::update`], and give the customer the
    /// highest rank in the same critical section
    pub(crate) fn update_and_promote<T, F>(
        &self,
        customer_id: &CustomerId,
        f: F,
    ) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Customer) -> Result<T, LedgerError>,
    {
        self.stage(customer_id, true, f)
    }

    fn stage<T, F>(&self, customer_id: &CustomerId, promote: bool, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Customer) -> Result<T, LedgerError>,
    {
        let mut slot = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| LedgerError::customer_not_found(customer_id))?;

        let mut staged = slot.customer.clone();
        let output = f(&mut staged)?;
        slot.customer = staged;
        if promote {
            slot.rank = self.bump_rank();
        }

        Ok(output)
    }
}

impl Default for AsyncCustomerRepository {
    fn default() -> Self {
        Self::new()
    }
}
