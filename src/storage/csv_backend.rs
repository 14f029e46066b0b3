use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::BufWriter,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, WriterBuilder};

use crate::utils::paths::{ensure_dir, tmp_path};

use super::{BackendError, LedgerBackend};

type Rows = Vec<Vec<String>>;

/// Local backend keeping each sheet in `<dir>/<sheet>.csv`.
#[derive(Debug, Clone)]
pub struct CsvBackend {
    dir: PathBuf,
}

impl CsvBackend {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet))
    }

    fn existing_path(&self, sheet: &str) -> Result<PathBuf, BackendError> {
        let path = self.sheet_path(sheet);
        if path.exists() {
            Ok(path)
        } else {
            Err(BackendError::SheetMissing(sheet.to_string()))
        }
    }

    fn read_rows(path: &Path, limit: usize) -> Result<Rows, BackendError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.records().take(limit) {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    /// Writes the full sheet to a temp file, then renames it into place.
    fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), BackendError> {
        let tmp = tmp_path(path);
        {
            let file = File::create(&tmp)?;
            let mut writer = WriterBuilder::new()
                .flexible(true)
                .from_writer(BufWriter::new(file));
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl LedgerBackend for CsvBackend {
    fn batch_get(&self, sheets: &[&str], max_rows: usize) -> Result<HashMap<String, Rows>, BackendError> {
        let mut out = HashMap::new();
        for sheet in sheets {
            let path = self.sheet_path(sheet);
            if path.exists() {
                out.insert(sheet.to_string(), Self::read_rows(&path, max_rows)?);
            }
        }
        Ok(out)
    }

    fn get_values(&self, sheet: &str) -> Result<Rows, BackendError> {
        let path = self.existing_path(sheet)?;
        Self::read_rows(&path, usize::MAX)
    }

    fn append_row(&self, sheet: &str, values: Vec<String>) -> Result<(), BackendError> {
        let path = self.existing_path(sheet)?;
        let file = OpenOptions::new().append(true).open(&path)?;
        let mut writer = WriterBuilder::new().flexible(true).from_writer(file);
        writer.write_record(&values)?;
        writer.flush()?;
        Ok(())
    }

    fn replace_all(&self, sheet: &str, headers: &[&str], rows: Rows) -> Result<(), BackendError> {
        let path = self.existing_path(sheet)?;
        let mut all = Vec::with_capacity(rows.len() + 1);
        all.push(headers.iter().map(|h| h.to_string()).collect());
        all.extend(rows);
        Self::write_rows(&path, &all)
    }

    fn header_row(&self, sheet: &str) -> Result<Option<Vec<String>>, BackendError> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(
            Self::read_rows(&path, 1)?.into_iter().next().unwrap_or_default(),
        ))
    }

    fn create_sheet(&self, sheet: &str, headers: &[&str]) -> Result<(), BackendError> {
        let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        Self::write_rows(&self.sheet_path(sheet), &[header])
    }

    fn set_header(&self, sheet: &str, headers: &[&str]) -> Result<(), BackendError> {
        let path = self.existing_path(sheet)?;
        let mut rows = Self::read_rows(&path, usize::MAX)?;
        let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        match rows.first_mut() {
            Some(first) => *first = header,
            None => rows.push(header),
        }
        Self::write_rows(&path, &rows)
    }
}
