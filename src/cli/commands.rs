use super::args::{CliArgs, Command, MessageKind, RecordArgs, ReplayArgs, StrategyType};
use crate::core::notification::{balance_reminder, bill_summary, transaction_alert};
use crate::core::traits::{LedgerSink, LedgerSource};
use crate::core::LedgerEngine;
use crate::io::{write_balances_csv, write_customers_csv, JsonFileStore};
use crate::strategy::create_strategy;
use crate::types::{
    Customer, CustomerId, LedgerError, NewCustomer, ReminderConfig, SortOrder, TransactionId,
    TransactionType,
};
use std::fs::File;
use std::io::{BufWriter, Write};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Execute a parsed command against the ledger file, writing output to `out`
pub fn run(args: &CliArgs, out: &mut dyn Write) -> Result<(), LedgerError> {
    let store = JsonFileStore::new(&args.ledger);

    match &args.command {
        Command::AddCustomer {
            name,
            phone,
            loan,
            interest,
            avatar,
        } => {
            let mut draft = NewCustomer::new(name.as_str()).with_phone(phone.as_str());
            draft.loan_amount = *loan;
            draft.interest_rate = *interest;
            draft.avatar = avatar.clone();

            let mut engine = open_engine(&store)?;
            let customer = engine.add_customer(draft)?;
            writeln!(out, "Added {} ({})", customer.name, customer.id())?;
        }

        Command::Customers { search } => {
            let engine = LedgerEngine::load(&store)?;
            let customers = match search {
                Some(query) => engine.search(query),
                None => engine.customers(),
            };
            for customer in customers {
                writeln!(
                    out,
                    "{}  {:<24} {:<14} {:>12}",
                    customer.id(),
                    customer.name,
                    customer.phone,
                    customer.balance().normalize()
                )?;
            }
        }

        Command::Give(record) => record_transaction(&store, record, TransactionType::Given, out)?,

        Command::Receive(record) => {
            record_transaction(&store, record, TransactionType::Received, out)?
        }

        Command::Correct {
            customer,
            transaction,
            amount,
            reason,
        } => {
            let mut engine = open_engine(&store)?;
            let customer_id = resolve_customer(&engine, customer)?;
            let transaction_id = TransactionId::from(transaction.trim());
            engine.correct_transaction(&customer_id, &transaction_id, *amount, reason)?;

            if let Some(customer) = engine.customer(&customer_id) {
                writeln!(
                    out,
                    "Corrected {}; balance of {} is now {}",
                    transaction_id,
                    customer.name,
                    customer.balance().normalize()
                )?;
            }
        }

        Command::Edit {
            customer,
            name,
            phone,
        } => {
            let mut engine = open_engine(&store)?;
            let customer_id = resolve_customer(&engine, customer)?;
            let (current_name, current_phone) = engine
                .customer(&customer_id)
                .map(|c| (c.name.clone(), c.phone.clone()))
                .ok_or_else(|| LedgerError::customer_not_found(&customer_id))?;

            engine.update_contact(
                &customer_id,
                name.as_deref().unwrap_or(&current_name),
                phone.as_deref().unwrap_or(&current_phone),
            )?;
            writeln!(out, "Updated {}", customer_id)?;
        }

        Command::Show { customer, order } => {
            let engine = LedgerEngine::load(&store)?;
            let customer_id = resolve_customer(&engine, customer)?;
            let customer = engine
                .customer(&customer_id)
                .ok_or_else(|| LedgerError::customer_not_found(&customer_id))?;
            write_statement(customer, (*order).into(), out)?;
        }

        Command::Remind {
            customer,
            frequency,
            time,
            disable,
        } => {
            let mut engine = open_engine(&store)?;
            let customer_id = resolve_customer(&engine, customer)?;

            let reminder = if *disable {
                None
            } else {
                let mut config = engine
                    .customer(&customer_id)
                    .and_then(|c| c.reminder_config.clone())
                    .unwrap_or_default();
                if let Some(frequency) = frequency {
                    config.frequency = *frequency;
                }
                if let Some(time) = time {
                    config.time = time.clone();
                }
                config.enabled = true;
                Some(config)
            };

            engine.set_reminder(&customer_id, reminder.clone())?;
            match reminder {
                Some(ReminderConfig {
                    frequency, time, ..
                }) => writeln!(out, "Reminder set: {:?} at {}", frequency, time)?,
                None => writeln!(out, "Reminder disabled")?,
            }
        }

        Command::Message { customer, kind } => {
            let engine = LedgerEngine::load(&store)?;
            let customer_id = resolve_customer(&engine, customer)?;
            let customer = engine
                .customer(&customer_id)
                .ok_or_else(|| LedgerError::customer_not_found(&customer_id))?;

            let notification = match kind {
                MessageKind::Reminder => balance_reminder(customer)?,
                MessageKind::Bill => bill_summary(customer)?,
            };
            writeln!(out, "{}", notification)?;
        }

        Command::Export { output, balances } => {
            let engine = LedgerEngine::load(&store)?;
            let customers = engine.snapshot();

            match output {
                Some(path) => {
                    let mut file = BufWriter::new(File::create(path)?);
                    export(&customers, *balances, &mut file)?;
                    file.flush()?;
                    tracing::info!(
                        path = %path.display(),
                        customers = customers.len(),
                        "ledger exported"
                    );
                }
                None => export(&customers, *balances, out)?,
            }
        }

        Command::Summary => {
            let engine = LedgerEngine::load(&store)?;
            let summary = engine.summary()?;
            writeln!(out, "To collect:  {}", summary.total_given.normalize())?;
            writeln!(out, "Advances:    {}", summary.total_received.normalize())?;
            writeln!(out, "Net balance: {}", summary.net_balance.normalize())?;
        }

        Command::Replay(replay) => replay_journal(&store, replay, out)?,
    }

    Ok(())
}

/// Load the ledger with the store attached as its sink
fn open_engine(store: &JsonFileStore) -> Result<LedgerEngine, LedgerError> {
    Ok(LedgerEngine::load(store)?.with_sink(store.clone()))
}

/// Find a customer by ID, or by a unique case-insensitive name
fn resolve_customer(engine: &LedgerEngine, key: &str) -> Result<CustomerId, LedgerError> {
    let id = CustomerId::from(key.trim());
    if engine.customer(&id).is_some() {
        return Ok(id);
    }

    let needle = key.trim().to_lowercase();
    let mut named = engine
        .customers()
        .into_iter()
        .filter(|customer| customer.name.to_lowercase() == needle);

    match (named.next(), named.next()) {
        (Some(customer), None) => Ok(customer.id().clone()),
        (Some(_), Some(_)) => Err(LedgerError::invalid_customer(&format!(
            "more than one customer is named '{}', use the customer ID",
            key.trim()
        ))),
        _ => Err(LedgerError::customer_not_found(&id)),
    }
}

fn record_transaction(
    store: &JsonFileStore,
    record: &RecordArgs,
    tx_type: TransactionType,
    out: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut engine = open_engine(store)?;
    let customer_id = resolve_customer(&engine, &record.customer)?;
    let transaction =
        engine.create_transaction(&customer_id, record.amount, tx_type, &record.description)?;

    let customer = engine
        .customer(&customer_id)
        .ok_or_else(|| LedgerError::customer_not_found(&customer_id))?;
    writeln!(
        out,
        "Recorded {} {} ({}); balance of {} is now {}",
        transaction.tx_type(),
        transaction.amount().normalize(),
        transaction.id(),
        customer.name,
        customer.balance().normalize()
    )?;

    if record.notify {
        writeln!(out, "{}", transaction_alert(customer, &transaction))?;
    }
    Ok(())
}

fn write_statement(
    customer: &Customer,
    order: SortOrder,
    out: &mut dyn Write,
) -> Result<(), LedgerError> {
    writeln!(out, "{} ({})", customer.name, customer.id())?;
    if !customer.phone.is_empty() {
        writeln!(out, "Phone: {}", customer.phone)?;
    }
    if let Some(rate) = customer.interest_rate {
        writeln!(out, "Interest: {}% per month", rate.normalize())?;
    }
    writeln!(out, "Balance: {}", customer.balance().normalize())?;
    writeln!(
        out,
        "Last updated: {}",
        customer.last_updated().format(TIMESTAMP_FORMAT)
    )?;

    for tx in customer.sorted_transactions(order) {
        writeln!(
            out,
            "{}  {:<8} {:>12}  {}{}  [{}]",
            tx.timestamp().format(TIMESTAMP_FORMAT),
            tx.tx_type(),
            tx.amount().normalize(),
            tx.description(),
            if tx.is_edited() { " (edited)" } else { "" },
            tx.id()
        )?;
        for edit in tx.history() {
            writeln!(
                out,
                "    was {} until {}: {}",
                edit.previous_value().normalize(),
                edit.timestamp().format(TIMESTAMP_FORMAT),
                edit.reason()
            )?;
        }
    }
    Ok(())
}

fn export(customers: &[Customer], balances: bool, out: &mut dyn Write) -> Result<(), LedgerError> {
    if balances {
        write_balances_csv(customers, out)
    } else {
        write_customers_csv(customers, out)
    }
}

fn replay_journal(
    store: &JsonFileStore,
    replay: &ReplayArgs,
    out: &mut dyn Write,
) -> Result<(), LedgerError> {
    let config = match replay.strategy {
        StrategyType::Async => Some(replay.to_batch_config()),
        StrategyType::Sync => None,
    };
    let strategy = create_strategy(replay.strategy, config);

    let report = strategy.process(store.load()?, &replay.journal)?;

    if replay.dry_run {
        write_balances_csv(&report.customers, out)?;
    } else {
        store.persist(&report.customers)?;
    }
    writeln!(
        out,
        "Replayed {}: {} applied, {} rejected",
        replay.journal.display(),
        report.applied,
        report.rejected
    )?;
    Ok(())
}
