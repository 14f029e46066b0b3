use std::collections::BTreeMap;

use super::common::coerce_number;

/// A sheet's data rows aligned to a fixed header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from raw cell values as fetched from the store.
    ///
    /// A leading row equal to the header row is dropped; every data row is
    /// padded with empty cells or truncated to the header width.
    pub fn from_values(headers: &[&str], values: Vec<Vec<String>>) -> Self {
        let mut table = Self::new(headers);
        let width = headers.len();
        let mut iter = values.into_iter().peekable();
        if let Some(first) = iter.peek() {
            if first.iter().map(String::as_str).eq(headers.iter().copied()) {
                iter.next();
            }
        }
        for mut row in iter {
            row.resize(width, String::new());
            table.rows.push(row);
        }
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn raw_rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(move |values| RowView {
            headers: &self.headers,
            values,
        })
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn push(&mut self, record: &Record) {
        self.rows.push(record.values_for(&self.headers));
    }

    /// Index of the first row matching `pred`.
    pub fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&RowView<'_>) -> bool,
    {
        self.rows().position(|row| pred(&row))
    }

    /// Replaces row `index` with `record`; `false` when out of range.
    pub fn replace(&mut self, index: usize, record: &Record) -> bool {
        let values = record.values_for(&self.headers);
        match self.rows.get_mut(index) {
            Some(row) => {
                *row = values;
                true
            }
            None => false,
        }
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&RowView<'_>) -> bool,
    {
        let headers = &self.headers;
        self.rows.retain(|values| keep(&RowView { headers, values }));
    }

    /// Rows restricted to those matching `keep`, as a new table.
    pub fn filtered<F>(&self, keep: F) -> Table
    where
        F: FnMut(&RowView<'_>) -> bool,
    {
        let mut out = self.clone();
        out.retain(keep);
        out
    }

    /// Cells re-laid out in the order of `headers`; unknown columns become "".
    pub fn aligned_to(&self, headers: &[&str]) -> Vec<Vec<String>> {
        let indices: Vec<Option<usize>> = headers.iter().map(|h| self.column_index(h)).collect();
        self.rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| {
                        idx.and_then(|i| row.get(i))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }
}

/// Borrowed view of one row with by-name access.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn number(&self, column: &str) -> f64 {
        coerce_number(self.get(column))
    }

    pub fn values(&self) -> &'a [String] {
        self.values
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        for (header, value) in self.headers.iter().zip(self.values) {
            record.set(header, value.clone());
        }
        record
    }
}

/// A row keyed by column name, as handed to `append`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Values in header order; columns the record does not set become "".
    pub fn values_for<S: AsRef<str>>(&self, headers: &[S]) -> Vec<String> {
        headers
            .iter()
            .map(|h| self.fields.get(h.as_ref()).cloned().unwrap_or_default())
            .collect()
    }
}
