use chrono::NaiveDate;

use super::{
    common::{day_key, format_number},
    table::{Record, RowView},
};

/// Start-of-day balances; one row per calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyOpening {
    pub date: NaiveDate,
    pub attendant: String,
    pub cash_open: f64,
    pub pos_open: f64,
    pub transfer_open: f64,
    pub gas_open_kg: f64,
    pub notes: String,
}

impl DailyOpening {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            attendant: String::new(),
            cash_open: 0.0,
            pos_open: 0.0,
            transfer_open: 0.0,
            gas_open_kg: 0.0,
            notes: String::new(),
        }
    }

    pub fn from_row(row: &RowView<'_>) -> Option<Self> {
        let date = NaiveDate::parse_from_str(row.get("date").trim(), "%Y-%m-%d").ok()?;
        Some(Self {
            date,
            attendant: row.get("attendant").to_string(),
            cash_open: row.number("cash_open"),
            pos_open: row.number("pos_open"),
            transfer_open: row.number("transfer_open"),
            gas_open_kg: row.number("gas_open_kg"),
            notes: row.get("notes").to_string(),
        })
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("date", day_key(self.date))
            .with("attendant", self.attendant.clone())
            .with("cash_open", format_number(self.cash_open))
            .with("pos_open", format_number(self.pos_open))
            .with("transfer_open", format_number(self.transfer_open))
            .with("gas_open_kg", format_number(self.gas_open_kg))
            .with("notes", self.notes.clone())
    }
}
