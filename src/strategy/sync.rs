//! Synchronous replay strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. It streams the journal through `JournalReader`
//! and replays each entry on a `LedgerEngine`, one row at a time.

use crate::core::traits::LedgerOperations;
use crate::core::LedgerEngine;
use crate::io::JournalReader;
use crate::strategy::{ProcessingStrategy, ReplayReport};
use crate::types::{Customer, LedgerError};
use std::path::Path;

/// Synchronous replay strategy
///
/// ```no_run
/// use udhaar_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
///
/// let report = SyncProcessingStrategy
///     .process(Vec::new(), Path::new("journal.csv"))
///     .expect("replay failed");
/// println!("{} applied, {} rejected", report.applied, report.rejected);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        customers: Vec<Customer>,
        journal: &Path,
    ) -> Result<ReplayReport, LedgerError> {
        let mut engine = LedgerEngine::from_customers(customers)?;
        let reader = JournalReader::open(journal)?;

        let mut applied = 0;
        let mut rejected = 0;

        for result in reader {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    rejected += 1;
                    tracing::warn!(error = %e, "skipping journal row");
                    continue;
                }
            };

            let customer = entry.customer.clone();
            let action = entry.action_name();
            match engine.replay(entry) {
                Ok(()) => applied += 1,
                Err(e) => {
                    rejected += 1;
                    tracing::warn!(%customer, action, error = %e, "journal entry refused");
                }
            }
        }

        tracing::info!(applied, rejected, "journal replayed");

        Ok(ReplayReport {
            customers: engine.snapshot(),
            applied,
            rejected,
        })
    }
}
