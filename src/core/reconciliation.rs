//! Balance reconciliation
//!
//! The authority on what a customer's balance should be. The balance stored
//! on a [`Customer`] is only a cache of [`reconcile`] over its transactions;
//! corrections overwrite it with a fresh reconciliation and every other
//! mutation is checked against one.

use crate::types::{ensure_valid_amount, Customer, LedgerError, Transaction};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Signed contribution of one transaction (+GIVEN, -RECEIVED)
pub fn signed_amount(transaction: &Transaction) -> Decimal {
    transaction.signed_amount()
}

/// Recompute a balance from scratch
///
/// Pure: the same transactions always give the same balance, regardless of
/// their order. Returns `None` if the sum leaves the decimal range.
pub fn reconcile(transactions: &[Transaction]) -> Option<Decimal> {
    transactions
        .iter()
        .try_fold(Decimal::ZERO, |balance, tx| balance.checked_add(signed_amount(tx)))
}

/// Recompute a customer's balance from its transactions
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the sum leaves the decimal range.
pub fn reconcile_customer(customer: &Customer) -> Result<Decimal, LedgerError> {
    reconcile(customer.transactions())
        .ok_or_else(|| LedgerError::arithmetic_overflow("reconcile", customer.id()))
}

/// Check the cached balance against a fresh reconciliation
///
/// # Errors
///
/// Returns `InvariantViolation` when the two disagree. The mismatch is never
/// repaired here.
pub fn verify_balance(customer: &Customer) -> Result<(), LedgerError> {
    let reconciled = reconcile_customer(customer)?;
    if reconciled != customer.balance() {
        tracing::error!(
            customer = %customer.id(),
            cached = %customer.balance(),
            reconciled = %reconciled,
            "balance drifted from transaction history"
        );
        return Err(LedgerError::invariant_violation(
            customer.id(),
            customer.balance(),
            reconciled,
        ));
    }
    Ok(())
}

/// Check a customer that was built outside the engine
///
/// Loaded and registered customers skip the checks the engine runs on its
/// own mutations, so they are repeated here before the balance is verified.
///
/// # Errors
///
/// - `InvalidAmount` for a negative loan, transaction amount or
///   previous value in the edit history
/// - `DuplicateTransaction` if two transactions share an ID
/// - `InvariantViolation` if the cached balance does not reconcile
pub fn validate_customer(customer: &Customer) -> Result<(), LedgerError> {
    if let Some(loan) = customer.loan_amount {
        ensure_valid_amount(loan)?;
    }

    let mut seen = HashSet::new();
    for tx in customer.transactions() {
        ensure_valid_amount(tx.amount())?;
        for edit in tx.history() {
            ensure_valid_amount(edit.previous_value())?;
        }
        if !seen.insert(tx.id()) {
            return Err(LedgerError::duplicate_transaction(customer.id(), tx.id()));
        }
    }

    verify_balance(customer)
}

/// Verify every customer of a loaded ledger
///
/// # Errors
///
/// Returns the first `InvariantViolation` (or overflow) encountered.
pub fn verify_all(customers: &[Customer]) -> Result<(), LedgerError> {
    customers.iter().try_for_each(verify_balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ledger_now, CustomerId, NewCustomer, TransactionId, TransactionType};

    fn tx(id: &str, amount: i64, tx_type: TransactionType) -> Transaction {
        Transaction::new(
            TransactionId::from(id),
            Decimal::new(amount, 0),
            tx_type,
            "",
            ledger_now(),
        )
    }

    fn customer_json(balance: &str) -> String {
        format!(
            r#"{{
                "id": "c-1", "name": "Ravi", "phone": "", "balance": "{}",
                "lastUpdated": 1700000000000,
                "transactions": [
                    {{ "id": "t-1", "amount": "100", "type": "GIVEN", "description": "",
                       "timestamp": 1700000000000, "isEdited": false, "history": [] }},
                    {{ "id": "t-2", "amount": "40", "type": "RECEIVED", "description": "",
                       "timestamp": 1700000000000, "isEdited": false, "history": [] }}
                ]
            }}"#,
            balance
        )
    }

    #[test]
    fn test_reconcile_empty_is_zero() {
        assert_eq!(reconcile(&[]), Some(Decimal::ZERO));
    }

    #[test]
    fn test_reconcile_sums_given_minus_received() {
        let transactions = vec![
            tx("t-1", 100, TransactionType::Given),
            tx("t-2", 40, TransactionType::Received),
            tx("t-3", 25, TransactionType::Given),
        ];

        assert_eq!(reconcile(&transactions).unwrap(), Decimal::new(85, 0));
    }

    #[test]
    fn test_reconcile_can_go_negative() {
        let transactions = vec![tx("t-1", 70, TransactionType::Received)];

        assert_eq!(reconcile(&transactions).unwrap(), Decimal::new(-70, 0));
    }

    #[test]
    fn test_reconcile_is_idempotent_and_order_independent() {
        let mut transactions = vec![
            tx("t-1", 100, TransactionType::Given),
            tx("t-2", 40, TransactionType::Received),
            tx("t-3", 3, TransactionType::Given),
        ];

        let first = reconcile(&transactions).unwrap();
        let second = reconcile(&transactions).unwrap();
        transactions.reverse();
        let reversed = reconcile(&transactions).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, reversed);
    }

    #[test]
    fn test_reconcile_overflow_yields_none() {
        let huge = Transaction::new(
            TransactionId::from("t-1"),
            Decimal::MAX,
            TransactionType::Given,
            "",
            ledger_now(),
        );
        let transactions = vec![huge.clone(), huge];

        assert_eq!(reconcile(&transactions), None);
    }

    #[test]
    fn test_verify_balance_accepts_consistent_customer() {
        let customer: Customer = serde_json::from_str(&customer_json("60")).unwrap();
        assert!(verify_balance(&customer).is_ok());
    }

    #[test]
    fn test_verify_balance_reports_drift() {
        let customer: Customer = serde_json::from_str(&customer_json("75")).unwrap();

        let result = verify_balance(&customer);

        assert_eq!(
            result,
            Err(LedgerError::InvariantViolation {
                customer: CustomerId::from("c-1"),
                cached: Decimal::new(75, 0),
                reconciled: Decimal::new(60, 0),
            })
        );
    }

    #[test]
    fn test_verify_all_stops_at_first_drift() {
        let good = Customer::open(CustomerId::from("c-0"), NewCustomer::new("Asha"), ledger_now())
            .unwrap();
        let bad: Customer = serde_json::from_str(&customer_json("1")).unwrap();

        assert!(verify_all(&[good.clone()]).is_ok());
        assert!(matches!(
            verify_all(&[good, bad]),
            Err(LedgerError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_validate_customer_accepts_consistent_customer() {
        let customer: Customer = serde_json::from_str(&customer_json("60")).unwrap();
        assert!(validate_customer(&customer).is_ok());
    }

    #[test]
    fn test_validate_customer_rejects_negative_amount() {
        // The cached balance agrees with the negative amount
        let json = customer_json("-90").replacen(r#""amount": "100""#, r#""amount": "-50""#, 1);
        let customer: Customer = serde_json::from_str(&json).unwrap();

        assert!(verify_balance(&customer).is_ok());
        assert!(matches!(
            validate_customer(&customer),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_validate_customer_rejects_negative_previous_value() {
        let json = customer_json("60").replacen(
            r#""history": []"#,
            r#""history": [{ "previousValue": "-5", "timestamp": 1700000000000, "reason": "" }]"#,
            1,
        );
        let customer: Customer = serde_json::from_str(&json).unwrap();

        assert!(matches!(
            validate_customer(&customer),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_validate_customer_rejects_duplicate_transaction_ids() {
        let json = customer_json("60").replace(r#""id": "t-2""#, r#""id": "t-1""#);
        let customer: Customer = serde_json::from_str(&json).unwrap();

        assert_eq!(
            validate_customer(&customer),
            Err(LedgerError::DuplicateTransaction {
                customer: CustomerId::from("c-1"),
                transaction: TransactionId::from("t-1"),
            })
        );
    }
}
