use super::{
    common::format_number,
    table::{Record, RowView},
};

/// Amount band with an inclusive `[min_amount, max_amount]` range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeTier {
    pub min_amount: f64,
    pub max_amount: f64,
    pub fee: f64,
}

impl FeeTier {
    pub fn new(min_amount: f64, max_amount: f64, fee: f64) -> Self {
        Self {
            min_amount,
            max_amount,
            fee,
        }
    }

    /// Non-numeric cells coerce to zero.
    pub fn from_row(row: &RowView<'_>) -> Self {
        Self {
            min_amount: row.number("min_amount"),
            max_amount: row.number("max_amount"),
            fee: row.number("fee"),
        }
    }

    pub fn contains(&self, amount: f64) -> bool {
        self.min_amount <= amount && amount <= self.max_amount
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("min_amount", format_number(self.min_amount))
            .with("max_amount", format_number(self.max_amount))
            .with("fee", format_number(self.fee))
    }
}
