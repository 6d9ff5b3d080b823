//! Customer-related types for the Udhaar ledger
//!
//! This module defines the Customer record, its identifier, the optional
//! reminder configuration, and the draft used to open a new customer.

use super::amount::ensure_valid_amount;
use super::error::LedgerError;
use super::transaction::{Transaction, TransactionId, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Description given to the transaction created for an initial loan
pub const INITIAL_LOAN_DESCRIPTION: &str = "Initial Loan Amount";

/// Customer identifier
///
/// Opaque text, generated once and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Create a customer ID from existing text
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, unique customer ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// How often a reminder should be sent
///
/// Stored only; the ledger never schedules anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    Monthly,
    #[serde(rename = "NONE")]
    Never,
}

impl FromStr for ReminderFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(ReminderFrequency::Daily),
            "weekly" => Ok(ReminderFrequency::Weekly),
            "monthly" => Ok(ReminderFrequency::Monthly),
            "none" | "never" => Ok(ReminderFrequency::Never),
            other => Err(format!("Invalid reminder frequency: '{}'", other)),
        }
    }
}

/// Reminder settings attached to a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderConfig {
    pub frequency: ReminderFrequency,
    /// Time of day, `HH:MM`
    pub time: String,
    pub enabled: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            frequency: ReminderFrequency::Daily,
            time: "09:00".to_string(),
            enabled: false,
        }
    }
}

/// Order in which a customer's transactions are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Details for opening a new customer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub avatar: Option<String>,
    /// Initial amount lent; recorded as a GIVEN transaction when positive
    pub loan_amount: Option<Decimal>,
    /// Monthly interest percentage, informational only
    pub interest_rate: Option<Decimal>,
    pub reminder: Option<ReminderConfig>,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>) -> Self {
        NewCustomer {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_loan_amount(mut self, amount: Decimal) -> Self {
        self.loan_amount = Some(amount);
        self
    }

    pub fn with_interest_rate(mut self, rate: Decimal) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }
}

/// A customer and their ledger
///
/// Profile fields are public. The balance, the transactions and the
/// last-updated instant are private: they change only through the mutation
/// service so that `balance` always equals the reconciled transaction sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Decimal>,
    balance: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    last_updated: DateTime<Utc>,
    #[serde(default)]
    transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_config: Option<ReminderConfig>,
}

impl Customer {
    /// Open a customer from a draft
    ///
    /// A positive initial loan becomes a GIVEN transaction and the opening
    /// balance; otherwise the customer starts with no transactions and a zero
    /// balance.
    ///
    /// # Errors
    ///
    /// - `InvalidCustomer` if the name is blank or the interest rate is negative
    /// - `InvalidAmount` if the loan amount is negative
    pub fn open(
        id: CustomerId,
        draft: NewCustomer,
        at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(LedgerError::invalid_customer("name must not be empty"));
        }

        let loan_amount = draft.loan_amount.map(ensure_valid_amount).transpose()?;

        if let Some(rate) = draft.interest_rate {
            if rate < Decimal::ZERO {
                return Err(LedgerError::invalid_customer(
                    "interest rate must not be negative",
                ));
            }
        }

        let mut transactions = Vec::new();
        let mut balance = Decimal::ZERO;
        if let Some(loan) = loan_amount.filter(|loan| *loan > Decimal::ZERO) {
            transactions.push(Transaction::new(
                TransactionId::generate(),
                loan,
                TransactionType::Given,
                INITIAL_LOAN_DESCRIPTION,
                at,
            ));
            balance = loan;
        }

        Ok(Customer {
            id,
            name: name.to_string(),
            phone: draft.phone.trim().to_string(),
            avatar: draft.avatar,
            loan_amount,
            interest_rate: draft.interest_rate,
            balance,
            last_updated: at,
            transactions,
            reminder_config: draft.reminder,
        })
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    /// Cached balance; positive means the customer owes money
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Transactions in ledger order, newest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, transaction_id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id() == transaction_id)
    }

    /// Transactions sorted by creation time for display
    ///
    /// The stored order is untouched.
    pub fn sorted_transactions(&self, order: SortOrder) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        match order {
            SortOrder::NewestFirst => sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp())),
            SortOrder::OldestFirst => sorted.sort_by_key(|tx| tx.timestamp()),
        }
        sorted
    }

    /// Phone number reduced to digits, for messaging collaborators
    pub fn messaging_number(&self) -> Option<String> {
        let digits: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            None
        } else {
            Some(digits)
        }
    }

    /// Case-insensitive match against name or phone
    ///
    /// `needle` must already be trimmed and lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.phone.to_lowercase().contains(needle)
    }

    pub(crate) fn transaction_mut(
        &mut self,
        transaction_id: &TransactionId,
    ) -> Option<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|tx| tx.id() == transaction_id)
    }

    /// Insert a transaction at the head of the ledger
    pub(crate) fn prepend_transaction(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
    }

    pub(crate) fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.last_updated = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::ledger_now;
    use rstest::rstest;

    #[test]
    fn test_open_with_loan_creates_initial_transaction() {
        let draft = NewCustomer::new("Ravi").with_loan_amount(Decimal::new(500, 0));

        let customer = Customer::open(CustomerId::from("c-1"), draft, ledger_now()).unwrap();

        assert_eq!(customer.balance(), Decimal::new(500, 0));
        assert_eq!(customer.transactions().len(), 1);
        let tx = &customer.transactions()[0];
        assert_eq!(tx.tx_type(), TransactionType::Given);
        assert_eq!(tx.amount(), Decimal::new(500, 0));
        assert_eq!(tx.description(), INITIAL_LOAN_DESCRIPTION);
        assert!(tx.history().is_empty());
    }

    #[rstest]
    #[case::no_loan(None)]
    #[case::zero_loan(Some(Decimal::ZERO))]
    fn test_open_without_positive_loan_has_no_transactions(#[case] loan: Option<Decimal>) {
        let mut draft = NewCustomer::new("Meena");
        draft.loan_amount = loan;

        let customer = Customer::open(CustomerId::from("c-2"), draft, ledger_now()).unwrap();

        assert_eq!(customer.balance(), Decimal::ZERO);
        assert!(customer.transactions().is_empty());
    }

    #[rstest]
    #[case::blank_name(NewCustomer::new("   "))]
    #[case::negative_rate(NewCustomer::new("Ravi").with_interest_rate(Decimal::new(-2, 0)))]
    fn test_open_rejects_invalid_customer(#[case] draft: NewCustomer) {
        let result = Customer::open(CustomerId::from("c-3"), draft, ledger_now());
        assert!(matches!(result, Err(LedgerError::InvalidCustomer { .. })));
    }

    #[test]
    fn test_open_rejects_negative_loan() {
        let draft = NewCustomer::new("Ravi").with_loan_amount(Decimal::new(-10, 0));
        let result = Customer::open(CustomerId::from("c-4"), draft, ledger_now());
        assert!(matches!(result, Err(LedgerError::InvalidAmount { .. })));
    }

    #[test]
    fn test_open_trims_name_and_phone() {
        let draft = NewCustomer::new("  Ravi Kumar ").with_phone(" +91 98765 43210 ");
        let customer = Customer::open(CustomerId::from("c-5"), draft, ledger_now()).unwrap();

        assert_eq!(customer.name, "Ravi Kumar");
        assert_eq!(customer.phone, "+91 98765 43210");
        assert_eq!(customer.messaging_number().as_deref(), Some("919876543210"));
    }

    #[test]
    fn test_messaging_number_none_without_digits() {
        let customer =
            Customer::open(CustomerId::from("c-6"), NewCustomer::new("Asha"), ledger_now())
                .unwrap();
        assert_eq!(customer.messaging_number(), None);
    }

    #[rstest]
    #[case("ravi", true)]
    #[case("kumar", true)]
    #[case("9876", true)]
    #[case("meena", false)]
    fn test_matches_name_or_phone(#[case] needle: &str, #[case] expected: bool) {
        let draft = NewCustomer::new("Ravi Kumar").with_phone("98765");
        let customer = Customer::open(CustomerId::from("c-7"), draft, ledger_now()).unwrap();
        assert_eq!(customer.matches(needle), expected);
    }

    #[rstest]
    #[case("DAILY", ReminderFrequency::Daily)]
    #[case("weekly", ReminderFrequency::Weekly)]
    #[case("Monthly", ReminderFrequency::Monthly)]
    #[case("none", ReminderFrequency::Never)]
    fn test_reminder_frequency_from_str(#[case] raw: &str, #[case] expected: ReminderFrequency) {
        assert_eq!(raw.parse::<ReminderFrequency>().unwrap(), expected);
    }

    #[test]
    fn test_reminder_frequency_serializes_none() {
        let json = serde_json::to_string(&ReminderFrequency::Never).unwrap();
        assert_eq!(json, "\"NONE\"");
    }

    #[test]
    fn test_sorted_transactions_does_not_reorder_ledger() {
        let json = r#"{
            "id": "c-8", "name": "Ravi", "phone": "", "balance": "30",
            "lastUpdated": 1700000002000,
            "transactions": [
                { "id": "t-2", "amount": "10", "type": "RECEIVED", "description": "",
                  "timestamp": 1700000002000, "isEdited": false, "history": [] },
                { "id": "t-1", "amount": "40", "type": "GIVEN", "description": "",
                  "timestamp": 1700000001000, "isEdited": false, "history": [] }
            ]
        }"#;
        let customer: Customer = serde_json::from_str(json).unwrap();

        let oldest: Vec<&str> = customer
            .sorted_transactions(SortOrder::OldestFirst)
            .iter()
            .map(|tx| tx.id().as_str())
            .collect();
        let newest: Vec<&str> = customer
            .sorted_transactions(SortOrder::NewestFirst)
            .iter()
            .map(|tx| tx.id().as_str())
            .collect();

        assert_eq!(oldest, vec!["t-1", "t-2"]);
        assert_eq!(newest, vec!["t-2", "t-1"]);
        assert_eq!(customer.transactions()[0].id().as_str(), "t-2");
    }
}
