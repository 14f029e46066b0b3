use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, RwLock,
    },
};

use super::{BackendError, LedgerBackend};

type Rows = Vec<Vec<String>>;

/// In-process backend with call counters and injectable failures.
#[derive(Default)]
pub struct MemoryBackend {
    sheets: RwLock<BTreeMap<String, Rows>>,
    failures: Mutex<VecDeque<BackendError>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    batch_disabled: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a sheet with raw rows (header first).
    pub fn with_sheet(self, sheet: &str, rows: Rows) -> Self {
        self.write_sheets().insert(sheet.to_string(), rows);
        self
    }

    /// Makes the next `count` calls fail with the given status.
    pub fn fail_next(&self, count: usize, status: u16) {
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        for _ in 0..count {
            failures.push_back(BackendError::api(status, "injected failure"));
        }
    }

    /// Makes `batch_get` unsupported, forcing per-sheet reads.
    pub fn disable_batch_get(&self) {
        self.batch_disabled.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Raw rows of a sheet, header included.
    pub fn rows(&self, sheet: &str) -> Option<Rows> {
        self.read_sheets().get(sheet).cloned()
    }

    fn enter(&self, operation: &'static str) -> Result<(), BackendError> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(operation)
            .or_insert(0) += 1;
        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn read_sheets(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Rows>> {
        self.sheets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_sheets(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, Rows>> {
        self.sheets.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn owned(headers: &[&str]) -> Vec<String> {
    headers.iter().map(|h| h.to_string()).collect()
}

impl LedgerBackend for MemoryBackend {
    fn batch_get(&self, sheets: &[&str], max_rows: usize) -> Result<HashMap<String, Rows>, BackendError> {
        self.enter("batch_get")?;
        if self.batch_disabled.load(Ordering::SeqCst) {
            return Err(BackendError::Fatal("batch reads are not supported".into()));
        }
        let data = self.read_sheets();
        Ok(sheets
            .iter()
            .filter_map(|name| {
                data.get(*name).map(|rows| {
                    (
                        name.to_string(),
                        rows.iter().take(max_rows).cloned().collect(),
                    )
                })
            })
            .collect())
    }

    fn get_values(&self, sheet: &str) -> Result<Rows, BackendError> {
        self.enter("get_values")?;
        self.read_sheets()
            .get(sheet)
            .cloned()
            .ok_or_else(|| BackendError::SheetMissing(sheet.to_string()))
    }

    fn append_row(&self, sheet: &str, values: Vec<String>) -> Result<(), BackendError> {
        self.enter("append_row")?;
        self.write_sheets()
            .get_mut(sheet)
            .ok_or_else(|| BackendError::SheetMissing(sheet.to_string()))?
            .push(values);
        Ok(())
    }

    fn replace_all(&self, sheet: &str, headers: &[&str], rows: Rows) -> Result<(), BackendError> {
        self.enter("replace_all")?;
        let mut data = self.write_sheets();
        let target = data
            .get_mut(sheet)
            .ok_or_else(|| BackendError::SheetMissing(sheet.to_string()))?;
        target.clear();
        target.push(owned(headers));
        target.extend(rows);
        Ok(())
    }

    fn header_row(&self, sheet: &str) -> Result<Option<Vec<String>>, BackendError> {
        self.enter("header_row")?;
        Ok(self
            .read_sheets()
            .get(sheet)
            .map(|rows| rows.first().cloned().unwrap_or_default()))
    }

    fn create_sheet(&self, sheet: &str, headers: &[&str]) -> Result<(), BackendError> {
        self.enter("create_sheet")?;
        self.write_sheets()
            .insert(sheet.to_string(), vec![owned(headers)]);
        Ok(())
    }

    fn set_header(&self, sheet: &str, headers: &[&str]) -> Result<(), BackendError> {
        self.enter("set_header")?;
        let mut data = self.write_sheets();
        let rows = data
            .get_mut(sheet)
            .ok_or_else(|| BackendError::SheetMissing(sheet.to_string()))?;
        match rows.first_mut() {
            Some(first) => *first = owned(headers),
            None => rows.push(owned(headers)),
        }
        Ok(())
    }
}
