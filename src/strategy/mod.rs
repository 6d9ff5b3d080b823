//! Replay strategy module
//!
//! This module defines the Strategy pattern for journal replay pipelines,
//! covering both journal parsing and engine processing. Different
//! implementations (synchronous, concurrent batch) can be selected at
//! runtime and produce the same ledger.

use crate::cli::StrategyType;
use crate::types::{Customer, LedgerError};
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Outcome of replaying a journal
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// The resulting ledger, most recently active first
    pub customers: Vec<Customer>,
    /// Entries applied successfully
    pub applied: usize,
    /// Rows that could not be parsed or were refused by the engine
    pub rejected: usize,
}

/// Replay strategy trait
///
/// Each strategy starts from an existing ledger, replays every entry of a
/// journal file through a mutation engine and returns the resulting ledger.
pub trait ProcessingStrategy: Send + Sync {
    /// Replay `journal` on top of `customers`
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal problems: the starting ledger does not
    /// reconcile, the journal cannot be opened, or the runtime cannot start.
    /// Individual bad rows and refused entries are logged with
    /// `tracing::warn!`, counted in [`ReplayReport::rejected`] and skipped.
    fn process(&self, customers: Vec<Customer>, journal: &Path)
        -> Result<ReplayReport, LedgerError>;
}

/// Create a replay strategy based on the specified strategy type
///
/// `config` is only used by the async strategy.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
