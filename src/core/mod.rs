//! Core ledger logic
//!
//! - `traits` - Seams for persistence and for driving either engine
//! - `reconciliation` - Balance recomputation and invariant checks
//! - `customer_repository` - Ordered customer collection
//! - `engine` - Mutation engine (staged changes, verify, commit, persist)
//! - `summary` - Portfolio totals
//! - `notification` - Outgoing message text
//! - `async` - Thread-safe engine and batch replay

pub mod r#async;
pub mod customer_repository;
pub mod engine;
pub mod notification;
pub mod reconciliation;
pub mod summary;
pub mod traits;

pub use customer_repository::CustomerRepository;
pub use engine::LedgerEngine;
pub use notification::Notification;
pub use r#async::{AsyncCustomerRepository, AsyncLedgerEngine, BatchProcessor};
pub use summary::LedgerSummary;
pub use traits::{LedgerOperations, LedgerSink, LedgerSource};
