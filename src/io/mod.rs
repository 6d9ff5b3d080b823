//! I/O module
//!
//! Handles journal parsing, exports and ledger persistence.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (journal conversion, exports)
//! - `sync_reader` - Synchronous journal reader with iterator interface
//! - `async_reader` - Asynchronous journal reader with batch interface
//! - `store` - JSON file and in-memory ledger stores

pub mod async_reader;
pub mod csv_format;
pub mod store;
pub mod sync_reader;

pub use async_reader::AsyncJournalReader;
pub use csv_format::{convert_csv_record, write_balances_csv, write_customers_csv, CsvRecord};
pub use store::{JsonFileStore, MemoryStore, DEFAULT_LEDGER_PATH};
pub use sync_reader::JournalReader;
