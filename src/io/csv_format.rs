//! CSV format handling for journal entries and ledger exports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for journal deserialization
//! - Conversion from CSV records to journal entries
//! - The customer backup export and the balances report
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{
    parse_amount, Customer, CustomerId, JournalCommand, JournalEntry, LedgerError, TransactionId,
    TransactionType,
};
use serde::Deserialize;
use std::io::Write;

/// Header of the customer backup export
pub const CUSTOMER_EXPORT_HEADERS: [&str; 9] = [
    "Customer Name",
    "Phone",
    "Total Balance",
    "Transaction Date",
    "Type",
    "Amount",
    "Description",
    "Is Edited",
    "Edit Count",
];

/// Header of the balances report
pub const BALANCE_HEADERS: [&str; 5] = ["customer", "name", "balance", "transactions", "edited"];

/// CSV record structure for journal deserialization
///
/// Matches the journal format with columns: action, customer, transaction,
/// amount, text. Everything after `customer` is optional; which fields are
/// required depends on the action.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub action: String,
    pub customer: String,
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Convert a CsvRecord to a JournalEntry
///
/// - `open` takes the name from `text` and an optional initial loan
/// - `give` / `receive` need an amount; the transaction ID is optional
/// - `correct` needs both a transaction ID and an amount; `text` is the reason
///
/// # Errors
///
/// - `ParseError` for unknown actions, a blank customer or a correction
///   without a transaction ID
/// - `InvalidAmount` for missing, unparsable or negative amounts
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<JournalEntry, LedgerError> {
    let customer = csv_record.customer.trim();
    if customer.is_empty() {
        return Err(LedgerError::parse_error(None, "customer is missing"));
    }
    let customer = CustomerId::from(customer);

    let transaction_id = non_empty(csv_record.transaction).map(TransactionId::from);
    let amount = csv_record.amount.unwrap_or_default();
    let text = csv_record.text.unwrap_or_default();

    let command = match csv_record.action.trim().to_lowercase().as_str() {
        "open" => {
            let loan = if amount.trim().is_empty() {
                None
            } else {
                Some(parse_amount(&amount)?)
            };
            JournalCommand::Open {
                name: text.trim().to_string(),
                loan,
            }
        }
        action @ ("give" | "receive") => {
            let tx_type: TransactionType = action
                .parse()
                .map_err(|e: String| LedgerError::parse_error(None, e))?;
            JournalCommand::Record {
                transaction_id,
                amount: parse_amount(&amount)?,
                tx_type,
                description: text,
            }
        }
        "correct" => {
            let transaction_id = transaction_id.ok_or_else(|| {
                LedgerError::parse_error(
                    None,
                    format!("correct for customer {} requires a transaction", customer),
                )
            })?;
            JournalCommand::Correct {
                transaction_id,
                amount: parse_amount(&amount)?,
                reason: text,
            }
        }
        other => {
            return Err(LedgerError::parse_error(
                None,
                format!("Invalid action: '{}' for customer {}", other, customer),
            ))
        }
    };

    Ok(JournalEntry { customer, command })
}

/// Write the customer backup export
///
/// One row per transaction in ledger order; a customer with no transactions
/// still gets a single placeholder row. Customers are written in the order
/// given.
pub fn write_customers_csv(
    customers: &[Customer],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(CUSTOMER_EXPORT_HEADERS)?;

    for customer in customers {
        let balance = customer.balance().normalize().to_string();

        if customer.transactions().is_empty() {
            writer.write_record([
                customer.name.as_str(),
                customer.phone.as_str(),
                balance.as_str(),
                "N/A",
                "N/A",
                "0",
                "No transactions",
                "No",
                "0",
            ])?;
            continue;
        }

        for tx in customer.transactions() {
            writer.write_record([
                customer.name.clone(),
                customer.phone.clone(),
                balance.clone(),
                tx.timestamp().format("%Y-%m-%d %H:%M:%S").to_string(),
                tx.tx_type().to_string(),
                tx.amount().normalize().to_string(),
                tx.description().to_string(),
                if tx.is_edited() { "Yes" } else { "No" }.to_string(),
                tx.edit_count().to_string(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write one line per customer with its balance
///
/// Sorted by customer ID for deterministic output. `edited` counts the
/// customer's corrected transactions.
pub fn write_balances_csv(
    customers: &[Customer],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(BALANCE_HEADERS)?;

    let mut sorted: Vec<&Customer> = customers.iter().collect();
    sorted.sort_by(|a, b| a.id().cmp(b.id()));

    for customer in sorted {
        let edited = customer
            .transactions()
            .iter()
            .filter(|tx| tx.is_edited())
            .count();

        writer.write_record([
            customer.id().to_string(),
            customer.name.clone(),
            customer.balance().normalize().to_string(),
            customer.transactions().len().to_string(),
            edited.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LedgerEngine;
    use crate::types::NewCustomer;
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn csv_record(
        action: &str,
        customer: &str,
        transaction: Option<&str>,
        amount: Option<&str>,
        text: Option<&str>,
    ) -> CsvRecord {
        CsvRecord {
            action: action.to_string(),
            customer: customer.to_string(),
            transaction: transaction.map(str::to_string),
            amount: amount.map(str::to_string),
            text: text.map(str::to_string),
        }
    }

    #[rstest]
    #[case("give", TransactionType::Given)]
    #[case("GIVE", TransactionType::Given)]
    #[case("receive", TransactionType::Received)]
    fn test_convert_record_actions(#[case] action: &str, #[case] expected: TransactionType) {
        let record = csv_record(action, "c-1", Some("t-1"), Some(" 12.50 "), Some("milk"));
        let entry = convert_csv_record(record).unwrap();

        assert_eq!(entry.customer, CustomerId::from("c-1"));
        assert_eq!(
            entry.command,
            JournalCommand::Record {
                transaction_id: Some(TransactionId::from("t-1")),
                amount: Decimal::new(1250, 2),
                tx_type: expected,
                description: "milk".to_string(),
            }
        );
    }

    #[test]
    fn test_convert_record_without_transaction_id() {
        let entry =
            convert_csv_record(csv_record("receive", "c-1", Some("  "), Some("5"), None)).unwrap();

        assert!(matches!(
            entry.command,
            JournalCommand::Record { transaction_id: None, .. }
        ));
    }

    #[rstest]
    #[case::with_loan(Some("500"), Some(Decimal::new(500, 0)))]
    #[case::without_loan(None, None)]
    #[case::blank_loan(Some(" "), None)]
    fn test_convert_open(#[case] amount: Option<&str>, #[case] expected: Option<Decimal>) {
        let entry =
            convert_csv_record(csv_record("open", "c-1", None, amount, Some(" Ravi "))).unwrap();

        assert_eq!(
            entry.command,
            JournalCommand::Open {
                name: "Ravi".to_string(),
                loan: expected,
            }
        );
    }

    #[test]
    fn test_convert_correct() {
        let record = csv_record("correct", "c-1", Some("t-9"), Some("80"), Some("typo"));
        let entry = convert_csv_record(record).unwrap();

        assert_eq!(
            entry.command,
            JournalCommand::Correct {
                transaction_id: TransactionId::from("t-9"),
                amount: Decimal::new(80, 0),
                reason: "typo".to_string(),
            }
        );
    }

    #[rstest]
    #[case::unknown_action(csv_record("refund", "c-1", None, Some("1"), None), "Invalid action")]
    #[case::blank_customer(csv_record("give", " ", None, Some("1"), None), "customer is missing")]
    #[case::correct_without_tx(
        csv_record("correct", "c-1", None, Some("1"), None),
        "requires a transaction"
    )]
    #[case::missing_amount(csv_record("give", "c-1", None, None, None), "amount is missing")]
    #[case::bad_amount(csv_record("receive", "c-1", None, Some("ten"), None), "not a number")]
    #[case::negative_amount(
        csv_record("give", "c-1", None, Some("-4"), None),
        "must not be negative"
    )]
    #[case::negative_loan(
        csv_record("open", "c-1", None, Some("-4"), Some("Ravi")),
        "must not be negative"
    )]
    fn test_convert_record_errors(#[case] record: CsvRecord, #[case] expected_error: &str) {
        let error = convert_csv_record(record).unwrap_err();
        assert!(
            error.to_string().contains(expected_error),
            "unexpected error: {}",
            error
        );
    }

    #[test]
    fn test_write_balances_csv_sorted_by_id() {
        let customers: Vec<Customer> = serde_json::from_str(
            r#"[
                { "id": "b", "name": "Meena", "balance": "-40", "lastUpdated": 1700000000000,
                  "transactions": [
                    { "id": "t-2", "amount": "40.00", "type": "RECEIVED", "description": "",
                      "timestamp": 1700000000000, "isEdited": true,
                      "history": [{ "timestamp": 1700000000000, "previousValue": "30", "reason": "" }] }
                  ] },
                { "id": "a", "name": "Ravi", "balance": "0", "lastUpdated": 1700000000000 }
            ]"#,
        )
        .unwrap();

        let mut output = Vec::new();
        write_balances_csv(&customers, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "customer,name,balance,transactions,edited\na,Ravi,0,0,0\nb,Meena,-40,1,1\n"
        );
    }

    #[test]
    fn test_write_balances_csv_empty() {
        let mut output = Vec::new();
        write_balances_csv(&[], &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "customer,name,balance,transactions,edited\n"
        );
    }

    #[test]
    fn test_write_customers_csv() {
        let mut engine = LedgerEngine::new();
        let ravi = engine
            .add_customer(
                NewCustomer::new("Ravi, Jr.")
                    .with_phone("555")
                    .with_loan_amount(Decimal::new(100, 0)),
            )
            .unwrap();
        engine
            .correct_transaction(
                ravi.id(),
                ravi.transactions()[0].id(),
                Decimal::new(90, 0),
                "typo",
            )
            .unwrap();
        engine.add_customer(NewCustomer::new("Meena")).unwrap();

        let mut output = Vec::new();
        write_customers_csv(&engine.snapshot(), &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Customer Name,Phone,Total Balance,Transaction Date,Type,Amount,Description,Is Edited,Edit Count"
        );
        assert_eq!(lines[1], "Meena,,0,N/A,N/A,0,No transactions,No,0");
        assert!(lines[2].starts_with("\"Ravi, Jr.\",555,90,"));
        assert!(lines[2].ends_with(",GIVEN,90,Initial Loan Amount,Yes,1"));
    }
}
