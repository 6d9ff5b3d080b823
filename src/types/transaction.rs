//! Transaction-related types for the Udhaar ledger
//!
//! This module defines transaction identifiers, directions, the transaction
//! record itself with its append-only correction history, and the typed
//! action union consumed by the mutation service.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Current instant at the precision the ledger persists (milliseconds)
///
/// Truncating up front keeps a persisted-then-loaded ledger identical to the
/// in-memory one.
pub fn ledger_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Transaction identifier
///
/// Opaque text. Generated identifiers are UUID v4 strings, but any unique
/// string is accepted (journal replay supplies its own).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a transaction ID from existing text
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, unique transaction ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Direction of a transaction
///
/// Amounts are stored as non-negative magnitudes; the direction decides
/// whether the amount adds to or subtracts from what the customer owes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Credit extended to the customer
    ///
    /// Increases the customer's balance.
    Given,

    /// Payment collected from the customer
    ///
    /// Decreases the customer's balance.
    Received,
}

impl TransactionType {
    /// Signed contribution of `amount` in this direction
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Given => amount,
            TransactionType::Received => -amount,
        }
    }

    /// Wire name (`GIVEN` / `RECEIVED`)
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Given => "GIVEN",
            TransactionType::Received => "RECEIVED",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "given" | "give" => Ok(TransactionType::Given),
            "received" | "receive" => Ok(TransactionType::Received),
            other => Err(format!("Invalid transaction type: '{}'", other)),
        }
    }
}

/// One correction of a transaction's amount
///
/// Records the value being replaced; the new value lives on the transaction.
/// Entries are written once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHistory {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    previous_value: Decimal,
    reason: String,
}

impl EditHistory {
    /// When the correction was made
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Amount the transaction carried before this correction
    pub fn previous_value(&self) -> Decimal {
        self.previous_value
    }

    /// Reason given for the correction, verbatim
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A single credit or payment entry in a customer's ledger
///
/// The ID, direction and creation timestamp are fixed at construction. The
/// amount can only change through [`Transaction::amend`], which is reachable
/// solely from the mutation service and always appends an audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    amount: Decimal,
    #[serde(rename = "type")]
    tx_type: TransactionType,
    description: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
    is_edited: bool,
    #[serde(default)]
    history: Vec<EditHistory>,
}

impl Transaction {
    /// Create a fresh, unedited transaction
    pub(crate) fn new(
        id: TransactionId,
        amount: Decimal,
        tx_type: TransactionType,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id,
            amount,
            tx_type,
            description: description.into(),
            timestamp,
            is_edited: false,
            history: Vec::new(),
        }
    }

    /// Correct the amount, recording the replaced value
    pub(crate) fn amend(&mut self, new_amount: Decimal, reason: &str, at: DateTime<Utc>) {
        self.history.push(EditHistory {
            timestamp: at,
            previous_value: self.amount,
            reason: reason.to_string(),
        });
        self.amount = new_amount;
        self.is_edited = true;
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Non-negative magnitude
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Creation instant (never changes)
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_edited(&self) -> bool {
        self.is_edited
    }

    /// Correction history, oldest first
    pub fn history(&self) -> &[EditHistory] {
        &self.history
    }

    pub fn edit_count(&self) -> usize {
        self.history.len()
    }

    /// Signed contribution to the customer's balance
    pub fn signed_amount(&self) -> Decimal {
        self.tx_type.signed(self.amount)
    }
}

/// A ledger mutation requested by a front end
///
/// Replaces loosely-typed pending-action payloads: the mutation service
/// dispatches on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerAction {
    /// Record a new credit or payment
    Add {
        amount: Decimal,
        tx_type: TransactionType,
        description: String,
    },

    /// Correct the amount of an existing transaction
    Correct {
        transaction_id: TransactionId,
        amount: Decimal,
        reason: String,
    },
}

/// Result of applying a [`LedgerAction`]
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// A transaction was created
    Created(Transaction),

    /// An existing transaction was corrected
    Corrected { transaction_id: TransactionId },
}
