//! Concurrent implementations of core components
//!
//! This module provides thread-safe counterparts of the repository and the
//! mutation engine, built on DashMap, plus the batch processor used by
//! concurrent journal replay.
//!
//! # Architecture
//!
//! - **AsyncCustomerRepository**: customer state in a DashMap, recency kept as
//!   an activity rank
//! - **AsyncLedgerEngine**: the mutation rules over the shared repository
//! - **BatchProcessor**: partitions journal batches by customer and replays
//!   each partition in its own task
//!
//! # Thread Safety
//!
//! - Operations on different customers proceed in parallel
//! - Operations on the same customer are serialized by its map entry
//! - No global locks

pub mod batch_processor;
pub mod customer_repository;
pub mod engine;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use customer_repository::AsyncCustomerRepository;
pub use engine::AsyncLedgerEngine;
