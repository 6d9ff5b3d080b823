//! Portfolio totals across all customers

use crate::types::{Customer, LedgerError};
use rust_decimal::Decimal;
use serde::Serialize;

/// Totals shown on the dashboard
///
/// `total_given` sums what customers owe (positive balances) and
/// `total_received` sums advances held for customers (negative balances, as
/// a magnitude). `net_balance` is the plain sum of all balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_given: Decimal,
    pub total_received: Decimal,
    pub net_balance: Decimal,
}

impl LedgerSummary {
    /// Total the balances of `customers`
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow`, naming the customer whose balance pushed
    /// a total out of the decimal range.
    pub fn from_customers<'a>(
        customers: impl IntoIterator<Item = &'a Customer>,
    ) -> Result<Self, LedgerError> {
        customers
            .into_iter()
            .try_fold(LedgerSummary::default(), |mut summary, customer| {
                let balance = customer.balance();
                let overflow = || LedgerError::arithmetic_overflow("summary", customer.id());

                if balance > Decimal::ZERO {
                    summary.total_given = summary
                        .total_given
                        .checked_add(balance)
                        .ok_or_else(overflow)?;
                } else {
                    summary.total_received = summary
                        .total_received
                        .checked_add(balance.abs())
                        .ok_or_else(overflow)?;
                }
                summary.net_balance = summary
                    .net_balance
                    .checked_add(balance)
                    .ok_or_else(overflow)?;
                Ok(summary)
            })
    }
}
