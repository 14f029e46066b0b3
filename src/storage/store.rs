use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use crate::{
    domain::{Record, Table},
    errors::OpsError,
};

use super::{
    BackendError, LedgerBackend, LedgerStore, ReadCache, RetryPolicy, SchemaAction, Sheet,
};

const DEFAULT_MAX_ROWS: usize = 20_000;

/// Every sheet of the ledger as read in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    tables: Vec<Table>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Snapshot {
    /// All sheets present, no data rows.
    pub fn empty() -> Self {
        Self {
            tables: Sheet::ALL
                .iter()
                .map(|sheet| Table::new(sheet.headers()))
                .collect(),
        }
    }

    pub fn table(&self, sheet: Sheet) -> &Table {
        &self.tables[sheet.index()]
    }

    pub fn set(&mut self, sheet: Sheet, table: Table) {
        self.tables[sheet.index()] = table;
    }

    pub fn with(mut self, sheet: Sheet, table: Table) -> Self {
        self.set(sheet, table);
        self
    }
}

/// [`LedgerStore`] over a raw backend: batched cached reads, retried calls,
/// and cache invalidation on every write.
pub struct SheetStore<B> {
    backend: B,
    cache: ReadCache<Snapshot>,
    retry: RetryPolicy,
    max_rows: usize,
}

impl<B: LedgerBackend> SheetStore<B> {
    pub fn new(backend: B, ttl: Duration, retry: RetryPolicy) -> Self {
        Self {
            backend,
            cache: ReadCache::new(ttl),
            retry,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }

    /// Row window of the batched read; a sheet that fills it is re-read whole.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &ReadCache<Snapshot> {
        &self.cache
    }

    fn fetch_all(&self) -> Result<Snapshot, BackendError> {
        let names: Vec<&str> = Sheet::ALL.iter().map(|sheet| sheet.name()).collect();
        match self
            .retry
            .run("batch_get", || self.backend.batch_get(&names, self.max_rows))
        {
            Ok(mut values) => {
                let mut snapshot = Snapshot::empty();
                for sheet in Sheet::ALL {
                    if let Some(mut rows) = values.remove(sheet.name()) {
                        if rows.len() >= self.max_rows {
                            warn!(
                                sheet = %sheet,
                                max_rows = self.max_rows,
                                "batched read hit the row window, reading the full sheet"
                            );
                            rows = self
                                .retry
                                .run("get_values", || self.backend.get_values(sheet.name()))?;
                        }
                        snapshot.set(sheet, Table::from_values(sheet.headers(), rows));
                    }
                }
                Ok(snapshot)
            }
            Err(err) if err.is_retryable() => Err(err),
            Err(err) => {
                warn!(error = %err, "batched read failed, reading sheets one by one");
                self.fetch_each()
            }
        }
    }

    fn fetch_each(&self) -> Result<Snapshot, BackendError> {
        let mut snapshot = Snapshot::empty();
        for sheet in Sheet::ALL {
            match self
                .retry
                .run("get_values", || self.backend.get_values(sheet.name()))
            {
                Ok(rows) => snapshot.set(sheet, Table::from_values(sheet.headers(), rows)),
                Err(BackendError::SheetMissing(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(snapshot)
    }
}

fn unavailable(operation: &str, sheet: Option<Sheet>, err: BackendError) -> OpsError {
    match sheet {
        Some(sheet) => OpsError::Connectivity(format!("{operation} on `{sheet}` failed: {err}")),
        None => OpsError::Connectivity(format!("{operation} failed: {err}")),
    }
}

impl<B: LedgerBackend> LedgerStore for SheetStore<B> {
    fn read_all(&self) -> Result<Arc<Snapshot>, OpsError> {
        self.cache
            .get_or_load(|| self.fetch_all())
            .map_err(|err| unavailable("read", None, err))
    }

    fn append(&self, sheet: Sheet, record: &Record) -> Result<(), OpsError> {
        let values = record.values_for(sheet.headers());
        let result = self.retry.run("append_row", || {
            self.backend.append_row(sheet.name(), values.clone())
        });
        self.cache.invalidate();
        result.map_err(|err| unavailable("append", Some(sheet), err))?;
        info!(sheet = %sheet, "row appended");
        Ok(())
    }

    fn overwrite(&self, sheet: Sheet, table: &Table) -> Result<(), OpsError> {
        let headers = sheet.headers();
        let rows = table.aligned_to(headers);
        let count = rows.len();
        let result = self.retry.run("replace_all", || {
            self.backend.replace_all(sheet.name(), headers, rows.clone())
        });
        self.cache.invalidate();
        result.map_err(|err| unavailable("overwrite", Some(sheet), err))?;
        info!(sheet = %sheet, rows = count, "sheet overwritten");
        Ok(())
    }

    fn ensure_schema(&self, sheet: Sheet, headers: &[&str]) -> Result<SchemaAction, OpsError> {
        let name = sheet.name();
        let current = self
            .retry
            .run("header_row", || self.backend.header_row(name))
            .map_err(|err| unavailable("ensure_schema", Some(sheet), err))?;
        let action = match current {
            None => {
                self.retry
                    .run("create_sheet", || self.backend.create_sheet(name, headers))
                    .map_err(|err| unavailable("create_sheet", Some(sheet), err))?;
                info!(sheet = %sheet, "sheet created");
                SchemaAction::Created
            }
            Some(found) if found.iter().map(String::as_str).eq(headers.iter().copied()) => {
                SchemaAction::Unchanged
            }
            Some(found) => {
                warn!(sheet = %sheet, ?found, "header row drifted, rewriting");
                self.retry
                    .run("set_header", || self.backend.set_header(name, headers))
                    .map_err(|err| unavailable("set_header", Some(sheet), err))?;
                SchemaAction::Repaired
            }
        };
        if action != SchemaAction::Unchanged {
            self.cache.invalidate();
        }
        Ok(action)
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }
}
