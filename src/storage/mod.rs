//! Ledger persistence: the sheet schema, raw tabular backends, and the
//! cached/retrying store the services read and write through.

pub mod cache;
pub mod csv_backend;
pub mod memory;
pub mod retry;
pub mod schema;
pub mod store;

use std::{collections::HashMap, io, sync::Arc};

use thiserror::Error;

use crate::{
    domain::{Record, Table},
    errors::OpsError,
};

pub use cache::ReadCache;
pub use csv_backend::CsvBackend;
pub use memory::MemoryBackend;
pub use retry::RetryPolicy;
pub use schema::Sheet;
pub use store::{SheetStore, Snapshot};

/// HTTP-style statuses treated as rate limiting or transient server failure.
pub const RETRYABLE_STATUSES: [u16; 3] = [429, 500, 503];

/// Failure reported by a raw backend call.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("sheet `{0}` does not exist")]
    SheetMissing(String),
    #[error("{0}")]
    Fatal(String),
}

impl BackendError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        BackendError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Api { status, .. } if RETRYABLE_STATUSES.contains(status))
    }
}

impl From<io::Error> for BackendError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => {
                BackendError::api(503, err.to_string())
            }
            _ => BackendError::Fatal(err.to_string()),
        }
    }
}

impl From<csv::Error> for BackendError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => io.into(),
            _ => BackendError::Fatal(message),
        }
    }
}

/// Raw tabular transport, modelled on a remote spreadsheet API.
///
/// Rows are plain string cells; the first row of a sheet is its header.
pub trait LedgerBackend: Send + Sync {
    /// Fetches several sheets in one call, at most `max_rows` rows each
    /// (header included). Sheets that do not exist are absent from the map.
    fn batch_get(
        &self,
        sheets: &[&str],
        max_rows: usize,
    ) -> Result<HashMap<String, Vec<Vec<String>>>, BackendError>;

    /// All rows of one sheet, header included.
    fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, BackendError>;

    fn append_row(&self, sheet: &str, values: Vec<String>) -> Result<(), BackendError>;

    /// Clears the sheet and writes `headers` followed by `rows`.
    fn replace_all(
        &self,
        sheet: &str,
        headers: &[&str],
        rows: Vec<Vec<String>>,
    ) -> Result<(), BackendError>;

    /// First row of the sheet; `None` when the sheet does not exist.
    fn header_row(&self, sheet: &str) -> Result<Option<Vec<String>>, BackendError>;

    fn create_sheet(&self, sheet: &str, headers: &[&str]) -> Result<(), BackendError>;

    /// Overwrites the first row, keeping data rows in place.
    fn set_header(&self, sheet: &str, headers: &[&str]) -> Result<(), BackendError>;
}

/// What `ensure_schema` had to do to a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaAction {
    Created,
    Repaired,
    Unchanged,
}

/// The ledger store contract the services depend on.
pub trait LedgerStore: Send + Sync {
    /// Every sheet, served from the read cache while fresh.
    fn read_all(&self) -> Result<Arc<Snapshot>, OpsError>;

    /// Appends one row; unset columns become "". Invalidates the read cache.
    fn append(&self, sheet: Sheet, record: &Record) -> Result<(), OpsError>;

    /// Replaces all data rows, keeping the header. Invalidates the read cache.
    fn overwrite(&self, sheet: Sheet, table: &Table) -> Result<(), OpsError>;

    /// Creates the sheet with `headers` if absent, or rewrites a drifted header.
    fn ensure_schema(&self, sheet: Sheet, headers: &[&str]) -> Result<SchemaAction, OpsError>;

    /// Drops cached reads; the next `read_all` goes to the backend.
    fn invalidate(&self);

    fn ensure_all(&self) -> Result<Vec<(Sheet, SchemaAction)>, OpsError> {
        Sheet::ALL
            .iter()
            .map(|sheet| {
                self.ensure_schema(*sheet, sheet.headers())
                    .map(|action| (*sheet, action))
            })
            .collect()
    }
}
