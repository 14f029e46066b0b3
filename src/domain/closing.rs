use chrono::NaiveDate;

use super::{
    common::{day_key, format_number},
    table::Record,
};

/// End-of-day physical count, compared against expected balances.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingCount {
    pub date: NaiveDate,
    pub cash_counted: f64,
    pub gas_measured_kg: f64,
    pub notes: String,
}

impl ClosingCount {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("date", day_key(self.date))
            .with("cash_counted", format_number(self.cash_counted))
            .with("gas_measured_kg", format_number(self.gas_measured_kg))
            .with("notes", self.notes.clone())
    }
}
