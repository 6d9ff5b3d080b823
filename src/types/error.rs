//! Error types for the Udhaar ledger
//!
//! This module defines all error types that can occur while mutating, loading,
//! persisting or replaying the ledger. Errors are designed to be descriptive
//! and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: Unknown customer or transaction identifiers
//! - **Validation Errors**: Invalid amounts, invalid customer details, duplicates
//! - **Integrity Errors**: Cached balance drifted from the reconciled balance
//! - **Collaborator Errors**: File I/O, CSV parsing, persistence

use super::customer::CustomerId;
use super::transaction::TransactionId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
///
/// Every variant is local and recoverable by the caller: nothing here aborts
/// the surrounding process. `InvariantViolation` signals a latent bug and is
/// never repaired silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Referenced customer does not exist
    #[error("Customer {customer} not found")]
    CustomerNotFound {
        /// The customer ID that was looked up
        customer: CustomerId,
    },

    /// Referenced transaction does not exist within the customer's ledger
    ///
    /// Also raised when the transaction exists but belongs to another customer.
    #[error("Transaction {transaction} not found for customer {customer}")]
    TransactionNotFound {
        /// The customer whose ledger was searched
        customer: CustomerId,
        /// The transaction ID that was looked up
        transaction: TransactionId,
    },

    /// Amount is missing, negative, non-finite or fails numeric parsing
    ///
    /// Raised before any mutation is attempted.
    #[error("Invalid amount '{amount}': {reason}")]
    InvalidAmount {
        /// The offending amount as text
        amount: String,
        /// Why the amount was rejected
        reason: String,
    },

    /// Cached balance does not match the reconciled balance
    #[error("Balance invariant violated for customer {customer}: cached {cached}, reconciled {reconciled}")]
    InvariantViolation {
        /// The affected customer
        customer: CustomerId,
        /// Balance stored on the customer
        cached: Decimal,
        /// Balance recomputed from the transaction history
        reconciled: Decimal,
    },

    /// Customer details failed validation
    #[error("Invalid customer: {reason}")]
    InvalidCustomer {
        /// Why the customer was rejected
        reason: String,
    },

    /// A customer with the same ID already exists
    #[error("Customer {customer} already exists")]
    DuplicateCustomer {
        /// The duplicated customer ID
        customer: CustomerId,
    },

    /// A transaction with the same ID already exists for the customer
    #[error("Duplicate transaction ID {transaction} for customer {customer}")]
    DuplicateTransaction {
        /// Customer ID
        customer: CustomerId,
        /// Transaction ID that is duplicated
        transaction: TransactionId,
    },

    /// A message was requested for a customer without a phone number
    #[error("Customer {customer} has no phone number")]
    MissingPhone {
        /// Customer ID
        customer: CustomerId,
    },

    /// Decimal arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for customer {customer}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Customer ID
        customer: CustomerId,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// The persistence collaborator failed to load or store the ledger
    #[error("Persistence error: {message}")]
    Persistence {
        /// Description of the failure
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<csv_async::Error> for LedgerError {
    fn from(error: csv_async::Error) -> Self {
        LedgerError::ParseError {
            line: None,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::Persistence {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a CustomerNotFound error
    pub fn customer_not_found(customer: &CustomerId) -> Self {
        LedgerError::CustomerNotFound {
            customer: customer.clone(),
        }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(customer: &CustomerId, transaction: &TransactionId) -> Self {
        LedgerError::TransactionNotFound {
            customer: customer.clone(),
            transaction: transaction.clone(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl ToString, reason: &str) -> Self {
        LedgerError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an InvariantViolation error
    pub fn invariant_violation(
        customer: &CustomerId,
        cached: Decimal,
        reconciled: Decimal,
    ) -> Self {
        LedgerError::InvariantViolation {
            customer: customer.clone(),
            cached,
            reconciled,
        }
    }

    /// Create an InvalidCustomer error
    pub fn invalid_customer(reason: &str) -> Self {
        LedgerError::InvalidCustomer {
            reason: reason.to_string(),
        }
    }

    /// Create a DuplicateCustomer error
    pub fn duplicate_customer(customer: &CustomerId) -> Self {
        LedgerError::DuplicateCustomer {
            customer: customer.clone(),
        }
    }

    /// Create a DuplicateTransaction error
    pub fn duplicate_transaction(customer: &CustomerId, transaction: &TransactionId) -> Self {
        LedgerError::DuplicateTransaction {
            customer: customer.clone(),
            transaction: transaction.clone(),
        }
    }

    /// Create a MissingPhone error
    pub fn missing_phone(customer: &CustomerId) -> Self {
        LedgerError::MissingPhone {
            customer: customer.clone(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, customer: &CustomerId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            customer: customer.clone(),
        }
    }

    /// Create a ParseError
    pub fn parse_error(line: Option<u64>, message: impl ToString) -> Self {
        LedgerError::ParseError {
            line,
            message: message.to_string(),
        }
    }

    /// Create a Persistence error
    pub fn persistence(message: impl ToString) -> Self {
        LedgerError::Persistence {
            message: message.to_string(),
        }
    }

    /// True for both lookup failures (customer or transaction)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::CustomerNotFound { .. } | LedgerError::TransactionNotFound { .. }
        )
    }
}
