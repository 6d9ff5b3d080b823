//! Synchronous journal reader with iterator interface
//!
//! Provides a streaming iterator over journal entries from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The JournalReader uses csv::Reader to read and deserialize rows one at a
//! time, so memory use does not grow with the journal.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `open()`
//! - Row errors are yielded as `ParseError` items carrying the line number,
//!   and iteration continues with the next row

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{JournalEntry, LedgerError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Synchronous journal reader
///
/// ```no_run
/// use udhaar_ledger::io::JournalReader;
/// use std::path::Path;
///
/// let reader = JournalReader::open(Path::new("journal.csv")).unwrap();
/// let entries: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Parsed {} entries", entries.len());
/// ```
#[derive(Debug)]
pub struct JournalReader<R: Read = File> {
    reader: csv::Reader<R>,
    line_num: u64,
}

impl JournalReader<File> {
    /// Open a journal file
    ///
    /// The CSV reader trims whitespace from all fields and accepts rows with
    /// fewer columns than the header.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> JournalReader<R> {
    /// Read a journal from any byte source
    pub fn from_reader(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        Self {
            reader,
            line_num: 1,
        }
    }
}

impl<R: Read> Iterator for JournalReader<R> {
    type Item = Result<JournalEntry, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.reader.deserialize::<CsvRecord>().next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(
            row.map_err(LedgerError::from)
                .and_then(convert_csv_record)
                .map_err(|e| match e {
                    LedgerError::ParseError { line: Some(_), .. } => e,
                    other => LedgerError::parse_error(Some(line), other),
                }),
        )
    }
}
