//! Asynchronous journal reader with batch interface
//!
//! Provides batch reading of journal entries for concurrent replay.
//!
//! # Design
//!
//! The AsyncJournalReader uses:
//! - csv-async for streaming CSV parsing
//! - any `futures::io::AsyncRead` source (a tokio file via `tokio-util` compat)
//! - the csv_format module for row conversion
//!
//! ```text
//! CSV source → AsyncJournalReader → batches of JournalEntry
//!                    ↓
//!             csv_format module
//!       (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::JournalEntry;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous journal reader
///
/// Rows that fail to parse or convert are logged and skipped; their number
/// is available from [`AsyncJournalReader::rejected`].
pub struct AsyncJournalReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    rows: u64,
    rejected: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncJournalReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            rows: 0,
            rejected: 0,
        }
    }

    /// Read the next batch of at most `batch_size` rows
    ///
    /// Returns `None` once the journal is exhausted. A batch may hold fewer
    /// entries than rows read when some rows were rejected.
    pub async fn read_batch(&mut self, batch_size: usize) -> Option<Vec<JournalEntry>> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut read = 0;
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while read < batch_size {
            let Some(row) = records.next().await else {
                break;
            };
            read += 1;
            self.rows += 1;
            let line = self.rows + 1;

            match row {
                Ok(csv_record) => match convert_csv_record(csv_record) {
                    Ok(entry) => batch.push(entry),
                    Err(e) => {
                        self.rejected += 1;
                        tracing::warn!(line, error = %e, "skipping journal row");
                    }
                },
                Err(e) => {
                    self.rejected += 1;
                    tracing::warn!(line, error = %e, "skipping unreadable journal row");
                }
            }
        }

        if read == 0 {
            None
        } else {
            Some(batch)
        }
    }

    /// Number of rows skipped so far
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
