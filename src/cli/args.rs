use crate::io::DEFAULT_LEDGER_PATH;
use crate::strategy::BatchConfig;
use crate::types::{parse_amount, ReminderFrequency, SortOrder};
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Keep track of money lent to and received from customers
#[derive(Parser, Debug)]
#[command(name = "udhaar")]
#[command(about = "Personal credit ledger for informal lenders", long_about = None, version)]
pub struct CliArgs {
    /// Ledger file
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env = "UDHAAR_LEDGER",
        default_value = DEFAULT_LEDGER_PATH
    )]
    pub ledger: PathBuf,

    /// Log filter, e.g. `info` or `udhaar_ledger=debug`; falls back to RUST_LOG
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a new customer
    AddCustomer {
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Initial amount lent
        #[arg(long, value_parser = amount_arg)]
        loan: Option<Decimal>,
        /// Monthly interest percentage
        #[arg(long, value_parser = amount_arg)]
        interest: Option<Decimal>,
        #[arg(long)]
        avatar: Option<String>,
    },

    /// List customers, most recently active first
    Customers {
        /// Filter by name or phone
        #[arg(long)]
        search: Option<String>,
    },

    /// Record money given to a customer
    Give(RecordArgs),

    /// Record money received from a customer
    Receive(RecordArgs),

    /// Correct the amount of an existing transaction
    Correct {
        customer: String,
        transaction: String,
        #[arg(value_parser = amount_arg)]
        amount: Decimal,
        #[arg(long, default_value = "")]
        reason: String,
    },

    /// Change a customer's name or phone
    Edit {
        customer: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Show a customer's transactions and edit history
    Show {
        customer: String,
        #[arg(long, value_enum, default_value = "newest")]
        order: SortArg,
    },

    /// Configure the reminder schedule of a customer
    Remind {
        customer: String,
        #[arg(long, value_parser = frequency_arg)]
        frequency: Option<ReminderFrequency>,
        /// Time of day, HH:MM
        #[arg(long, value_parser = time_arg)]
        time: Option<String>,
        /// Remove the reminder
        #[arg(long, conflicts_with_all = ["frequency", "time"])]
        disable: bool,
    },

    /// Print a message for a customer
    Message {
        customer: String,
        #[arg(value_enum)]
        kind: MessageKind,
    },

    /// Export the ledger as CSV
    Export {
        /// Output file; stdout when omitted
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// One row per customer instead of one per transaction
        #[arg(long)]
        balances: bool,
    },

    /// Show portfolio totals
    Summary,

    /// Replay a CSV journal onto the ledger
    Replay(ReplayArgs),
}

#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    pub customer: String,
    #[arg(value_parser = amount_arg)]
    pub amount: Decimal,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Print the alert message for the customer
    #[arg(long)]
    pub notify: bool,
}

#[derive(clap::Args, Debug)]
pub struct ReplayArgs {
    /// Journal CSV with header `action,customer,transaction,amount,text`
    #[arg(value_name = "JOURNAL")]
    pub journal: PathBuf,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Replay strategy: 'sync' for single-threaded or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of journal rows per batch (async mode only)
    #[arg(long = "batch-size", value_name = "SIZE")]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(long = "max-concurrent", value_name = "COUNT")]
    pub max_concurrent_batches: Option<usize>,

    /// Print the resulting balances without saving the ledger
    #[arg(long)]
    pub dry_run: bool,
}

/// Available replay strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Newest,
    Oldest,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Newest => SortOrder::NewestFirst,
            SortArg::Oldest => SortOrder::OldestFirst,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageKind {
    Reminder,
    Bill,
}

impl ReplayArgs {
    /// Build a BatchConfig from the replay flags
    ///
    /// Unset flags take the defaults; zero values fall back with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none() && self.max_concurrent_batches.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
        )
    }
}

fn amount_arg(raw: &str) -> Result<Decimal, String> {
    parse_amount(raw).map_err(|e| e.to_string())
}

fn frequency_arg(raw: &str) -> Result<ReminderFrequency, String> {
    raw.parse()
}

fn time_arg(raw: &str) -> Result<String, String> {
    chrono::NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|_| format!("Invalid time '{}', expected HH:MM", raw))
}
