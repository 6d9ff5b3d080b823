//! Notification text for messaging collaborators
//!
//! Builds plain message bodies addressed to a customer's phone. Delivery and
//! link generation belong to whoever consumes the [`Notification`].

use crate::types::{Customer, LedgerError, Transaction, TransactionType};
use rust_decimal::Decimal;
use std::fmt;

/// A message ready to hand to a messaging service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Customer phone reduced to digits, if the customer has one
    pub recipient: Option<String>,
    pub body: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.recipient {
            Some(recipient) => write!(f, "To: {}\n{}", recipient, self.body),
            None => f.write_str(&self.body),
        }
    }
}

fn rupees(amount: Decimal) -> String {
    format!("₹{}", amount.abs().normalize())
}

/// Alert sent after recording a transaction
///
/// `customer` must already include `transaction`, so its balance is the new
/// total.
pub fn transaction_alert(customer: &Customer, transaction: &Transaction) -> Notification {
    let kind = match transaction.tx_type() {
        TransactionType::Given => "credit",
        TransactionType::Received => "payment",
    };

    Notification {
        recipient: customer.messaging_number(),
        body: format!(
            "UdhaarBook Alert: I have added a {} of {} to your account. Your new total balance is {}.",
            kind,
            rupees(transaction.amount()),
            rupees(customer.balance())
        ),
    }
}

/// Friendly reminder of an outstanding balance
///
/// # Errors
///
/// Returns `MissingPhone` if the customer has no usable phone number.
pub fn balance_reminder(customer: &Customer) -> Result<Notification, LedgerError> {
    let recipient = customer
        .messaging_number()
        .ok_or_else(|| LedgerError::missing_phone(customer.id()))?;

    Ok(Notification {
        recipient: Some(recipient),
        body: format!(
            "Hello {}, a friendly reminder from UdhaarBook that you have an outstanding balance of {}. Please settle at your convenience.",
            customer.name,
            rupees(customer.balance())
        ),
    })
}

/// Notice that a bill summary has been prepared for the customer
///
/// # Errors
///
/// Returns `MissingPhone` if the customer has no usable phone number.
pub fn bill_summary(customer: &Customer) -> Result<Notification, LedgerError> {
    let recipient = customer
        .messaging_number()
        .ok_or_else(|| LedgerError::missing_phone(customer.id()))?;

    Ok(Notification {
        recipient: Some(recipient),
        body: format!(
            "Hi {}, your total bill summary from UdhaarBook has been generated. Balance: {}.",
            customer.name,
            rupees(customer.balance())
        ),
    })
}
