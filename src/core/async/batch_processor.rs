//! Batch processing with customer-based partitioning for concurrent replay
//!
//! This module provides the `BatchProcessor` struct, which replays journal
//! batches concurrently while keeping each customer's entries in order.
//!
//! # Design
//!
//! A batch is partitioned by customer ID. Each partition is replayed
//! sequentially inside its own tokio task, and partitions run in parallel.
//! An `open` entry and the entries that follow it for the same customer land
//! in the same partition, so they are applied in journal order.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<AsyncLedgerEngine>  (shared mutation engine)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::AsyncLedgerEngine;
use crate::core::traits::LedgerOperations;
use crate::types::{CustomerId, JournalEntry, LedgerError};

/// Result of replaying a single journal entry
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The entry that was replayed
    pub entry: JournalEntry,

    /// The result of replaying it
    pub result: Result<(), LedgerError>,
}

/// Batch processor with customer-based partitioning
///
/// Cloneable; clones share the same engine.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: Arc<AsyncLedgerEngine>,
}

impl BatchProcessor {
    pub fn new(engine: Arc<AsyncLedgerEngine>) -> Self {
        Self { engine }
    }

    /// Partition a batch of entries by customer ID
    ///
    /// # Guarantees
    ///
    /// - Each entry appears in exactly one partition
    /// - Entries for each customer keep their original order
    pub fn partition_by_customer(
        &self,
        batch: Vec<JournalEntry>,
    ) -> HashMap<CustomerId, Vec<JournalEntry>> {
        let mut partitions: HashMap<CustomerId, Vec<JournalEntry>> = HashMap::new();

        for entry in batch {
            partitions
                .entry(entry.customer.clone())
                .or_default()
                .push(entry);
        }

        partitions
    }

    /// Replay all entries of one customer in order
    ///
    /// Every entry is attempted; a failure is captured in its result and does
    /// not stop the rest.
    pub async fn process_customer_entries(
        &self,
        entries: Vec<JournalEntry>,
    ) -> Vec<ProcessingResult> {
        let mut ops = &*self.engine;
        let mut results = Vec::with_capacity(entries.len());

        for entry in entries {
            let result = ops.replay(entry.clone());
            results.push(ProcessingResult { entry, result });
        }

        results
    }

    /// Replay a batch with one task per customer
    ///
    /// Results are grouped by customer; the order across customers is not
    /// defined.
    pub async fn process_batch(&self, batch: Vec<JournalEntry>) -> Vec<ProcessingResult> {
        let partitions = self.partition_by_customer(batch);

        let mut tasks = Vec::with_capacity(partitions.len());
        for (_customer, entries) in partitions {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_customer_entries(entries).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(customer_results) => results.extend(customer_results),
                Err(e) => tracing::error!(error = %e, "replay task panicked"),
            }
        }

        results
    }
}
