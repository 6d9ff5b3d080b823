//! Ledger persistence collaborators
//!
//! - `JsonFileStore` keeps the ordered customer list in a pretty-printed JSON
//!   file with the same field names the web app keeps in browser storage
//! - `MemoryStore` keeps it in memory, for tests and dry runs

use crate::core::traits::{LedgerSink, LedgerSource};
use crate::types::{Customer, LedgerError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Default ledger file name, relative to the working directory
pub const DEFAULT_LEDGER_PATH: &str = "udhaar_ledger.json";

/// JSON file holding the whole ledger
///
/// A missing file loads as an empty ledger. Writes go to a sibling temporary
/// file which is then renamed over the ledger, so a crash mid-write leaves
/// the previous ledger intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, action: &str, error: std::io::Error) -> LedgerError {
        LedgerError::persistence(format!(
            "failed to {} '{}': {}",
            action,
            self.path.display(),
            error
        ))
    }
}

impl LedgerSource for JsonFileStore {
    fn load(&self) -> Result<Vec<Customer>, LedgerError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger file yet, starting empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error("read", err)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }
}

impl LedgerSink for JsonFileStore {
    fn persist(&self, customers: &[Customer]) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", e))?;
        }

        let payload = serde_json::to_string_pretty(customers)?;
        let temp = self.temp_path();
        fs::write(&temp, payload).map_err(|e| self.io_error("write", e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.io_error("replace", e))?;

        tracing::debug!(path = %self.path.display(), customers = customers.len(), "ledger saved");
        Ok(())
    }
}

/// In-memory ledger store
///
/// Clones share the same contents, so a test can hand one clone to an engine
/// as its sink and inspect what was persisted through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    customers: Arc<Mutex<Vec<Customer>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(customers: Vec<Customer>) -> Self {
        Self {
            customers: Arc::new(Mutex::new(customers)),
        }
    }
}

impl LedgerSource for MemoryStore {
    fn load(&self) -> Result<Vec<Customer>, LedgerError> {
        self.customers
            .lock()
            .map(|customers| customers.clone())
            .map_err(|_| LedgerError::persistence("memory store lock poisoned"))
    }
}

impl LedgerSink for MemoryStore {
    fn persist(&self, customers: &[Customer]) -> Result<(), LedgerError> {
        let mut stored = self
            .customers
            .lock()
            .map_err(|_| LedgerError::persistence("memory store lock poisoned"))?;
        *stored = customers.to_vec();
        Ok(())
    }
}
