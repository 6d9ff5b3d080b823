//! Udhaar Ledger CLI
//!
//! # Usage
//!
//! ```bash
//! udhaar add-customer "Ravi Kumar" --phone 98765 --loan 500
//! udhaar receive "Ravi Kumar" 200 --description cash --notify
//! udhaar show "Ravi Kumar" --order oldest
//! udhaar --ledger book.json export --output backup.csv
//! udhaar replay --strategy async --batch-size 2000 journal.csv
//! ```
//!
//! Logs go to stderr; command output goes to stdout.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (unknown customer, invalid amount, unreadable ledger, etc.)

use std::process;
use tracing_subscriber::EnvFilter;
use udhaar_ledger::cli;

fn main() {
    let args = cli::parse_args();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut output = std::io::stdout().lock();
    if let Err(e) = cli::run(&args, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
