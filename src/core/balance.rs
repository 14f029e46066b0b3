use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{day_key, ChannelDeltas, Table};

/// Opening balance plus the sum of that day's deltas, per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExpectedBalances {
    pub cash: f64,
    pub pos: f64,
    pub transfer: f64,
    pub gas_kg: f64,
}

impl ExpectedBalances {
    pub fn apply(self, deltas: ChannelDeltas) -> Self {
        Self {
            cash: self.cash + deltas.cash,
            pos: self.pos + deltas.pos,
            transfer: self.transfer + deltas.transfer,
            gas_kg: self.gas_kg + deltas.gas_kg,
        }
    }
}

/// Opening values for `date`; all zero when the day was never opened.
pub fn opening_balances(date: NaiveDate, openings: &Table) -> ExpectedBalances {
    let key = day_key(date);
    openings
        .rows()
        .find(|row| row.get("date") == key)
        .map(|row| ExpectedBalances {
            cash: row.number("cash_open"),
            pos: row.number("pos_open"),
            transfer: row.number("transfer_open"),
            gas_kg: row.number("gas_open_kg"),
        })
        .unwrap_or_default()
}

/// Sum of the delta columns over every transaction dated `date`.
pub fn day_deltas(date: NaiveDate, transactions: &Table) -> ChannelDeltas {
    let key = day_key(date);
    transactions
        .rows()
        .filter(|row| row.get("date") == key)
        .fold(ChannelDeltas::default(), |acc, row| {
            acc + ChannelDeltas {
                cash: row.number("cash_delta"),
                pos: row.number("pos_delta"),
                transfer: row.number("transfer_delta"),
                gas_kg: row.number("gas_kg_delta"),
            }
        })
}

pub fn expected_balances(date: NaiveDate, openings: &Table, transactions: &Table) -> ExpectedBalances {
    opening_balances(date, openings).apply(day_deltas(date, transactions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use crate::storage::schema::{OPENING_HEADERS, TRANSACTION_HEADERS};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn openings() -> Table {
        let mut table = Table::new(OPENING_HEADERS);
        table.push(
            &Record::new()
                .with("date", "2024-05-01")
                .with("cash_open", "10000")
                .with("pos_open", "2000")
                .with("gas_open_kg", "50"),
        );
        table
    }

    fn tx(date: &str, cash: &str, pos: &str, gas: &str) -> Record {
        Record::new()
            .with("date", date)
            .with("cash_delta", cash)
            .with("pos_delta", pos)
            .with("gas_kg_delta", gas)
    }

    #[test]
    fn sums_only_the_target_day() {
        let mut transactions = Table::new(TRANSACTION_HEADERS);
        transactions.push(&tx("2024-05-01", "-3000", "3100", "0"));
        transactions.push(&tx("2024-05-01", "2500", "0", "-5"));
        transactions.push(&tx("2024-05-02", "-999", "0", "0"));

        let balances = expected_balances(day(1), &openings(), &transactions);
        assert_eq!(balances.cash, 9500.0);
        assert_eq!(balances.pos, 5100.0);
        assert_eq!(balances.transfer, 0.0);
        assert_eq!(balances.gas_kg, 45.0);
    }

    #[test]
    fn missing_opening_defaults_to_zero() {
        let mut transactions = Table::new(TRANSACTION_HEADERS);
        transactions.push(&tx("2024-05-02", "-999", "0", "0"));
        let balances = expected_balances(day(2), &openings(), &transactions);
        assert_eq!(balances, ExpectedBalances { cash: -999.0, ..Default::default() });
    }

    #[test]
    fn malformed_cells_count_as_zero() {
        let mut transactions = Table::new(TRANSACTION_HEADERS);
        transactions.push(&tx("2024-05-01", "oops", "", "1,5"));
        let balances = expected_balances(day(1), &openings(), &transactions);
        assert_eq!(balances.cash, 10000.0);
        assert_eq!(balances.gas_kg, 50.0);
    }
}
