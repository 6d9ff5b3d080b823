//! Concurrent batch replay strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. It reads the journal in batches and replays each
//! batch with one task per customer.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncJournalReader (batch CSV reading)
//!     ├── BatchProcessor (customer partitioning + tasks)
//!     └── AsyncLedgerEngine (thread-safe mutations)
//!         └── AsyncCustomerRepository (DashMap-backed ledger state)
//! ```
//!
//! Batches are processed one after another, so a customer whose entries span
//! several batches still sees them in journal order. Within a batch,
//! different customers are replayed in parallel.

use crate::core::r#async::{AsyncLedgerEngine, BatchProcessor};
use crate::io::AsyncJournalReader;
use crate::strategy::{ProcessingStrategy, ReplayReport};
use crate::types::{Customer, LedgerError};
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch replay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of journal rows per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                requested = batch_size,
                using = default.batch_size,
                "invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                requested = max_concurrent_batches,
                using = default.max_concurrent_batches,
                "invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Concurrent batch replay strategy
///
/// Builds its own tokio runtime, so `process` must not be called from inside
/// another runtime.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        customers: Vec<Customer>,
        journal: &Path,
    ) -> Result<ReplayReport, LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let engine = Arc::new(AsyncLedgerEngine::from_customers(customers)?);
            let processor = BatchProcessor::new(Arc::clone(&engine));

            let file = tokio::fs::File::open(journal)
                .await
                .map_err(|e| LedgerError::IoError {
                    message: format!("Failed to open file '{}': {}", journal.display(), e),
                })?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncJournalReader::new(compat_file);

            let mut applied = 0;
            let mut refused = 0;

            while let Some(batch) = reader.read_batch(self.config.batch_size).await {
                for outcome in processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(()) => applied += 1,
                        Err(e) => {
                            refused += 1;
                            tracing::warn!(
                                customer = %outcome.entry.customer,
                                action = outcome.entry.action_name(),
                                error = %e,
                                "journal entry refused"
                            );
                        }
                    }
                }
            }

            let rejected = refused + reader.rejected();
            tracing::info!(applied, rejected, "journal replayed");

            Ok(ReplayReport {
                customers: engine.customers(),
                applied,
                rejected,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SyncProcessingStrategy;
    use crate::types::CustomerId;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[rstest]
    #[case::zero_batch(0, 4, 1000, 4)]
    #[case::zero_workers(10, 0, 10, num_cpus::get())]
    #[case::explicit(10, 2, 10, 2)]
    fn test_batch_config_fallbacks(
        #[case] batch_size: usize,
        #[case] workers: usize,
        #[case] expected_batch: usize,
        #[case] expected_workers: usize,
    ) {
        let config = BatchConfig::new(batch_size, workers);
        assert_eq!(config.batch_size, expected_batch);
        assert_eq!(config.max_concurrent_batches, expected_workers);
    }

    #[rstest]
    #[case::tiny_batches(1)]
    #[case::split_batches(3)]
    #[case::single_batch(100)]
    fn test_matches_sync_strategy(#[case] batch_size: usize) {
        let file = create_temp_csv(
            "action,customer,transaction,amount,text\n\
             open,a,,100,Asha\n\
             open,b,,,Bilal\n\
             give,b,tb-1,40,\n\
             receive,a,ta-1,30,\n\
             give,a,ta-2,5,\n\
             correct,a,ta-1,20,typo\n\
             receive,b,,oops,\n\
             receive,b,tb-2,15,\n",
        );

        let strategy = AsyncProcessingStrategy::new(BatchConfig::new(batch_size, 2));
        let concurrent = strategy.process(Vec::new(), file.path()).unwrap();
        let sequential = SyncProcessingStrategy
            .process(Vec::new(), file.path())
            .unwrap();

        assert_eq!(concurrent.applied, sequential.applied);
        assert_eq!(concurrent.rejected, 1);

        let balance = |report: &ReplayReport, id: &str| {
            report
                .customers
                .iter()
                .find(|c| c.id() == &CustomerId::from(id))
                .map(|c| c.balance())
        };
        assert_eq!(balance(&concurrent, "a"), Some(Decimal::new(85, 0)));
        assert_eq!(balance(&concurrent, "b"), Some(Decimal::new(25, 0)));
        assert_eq!(balance(&concurrent, "a"), balance(&sequential, "a"));
        assert_eq!(balance(&concurrent, "b"), balance(&sequential, "b"));
    }

    #[test]
    fn test_missing_journal_is_fatal() {
        let strategy = AsyncProcessingStrategy::new(BatchConfig::default());
        let result = strategy.process(Vec::new(), Path::new("nonexistent.csv"));
        assert!(matches!(result, Err(LedgerError::IoError { .. })));
    }
}
