//! Key/value settings stored in the `config_prices` sheet.

use crate::{
    domain::is_truthy,
    storage::{Sheet, Snapshot},
};

pub const GAS_PRICE_KEY: &str = "gas_price_per_kg";
pub const ATTENDANT_STOCK_IN_FLAG: &str = "allow_attendant_stock_in_today";

/// Raw value of the first row with `key`.
pub fn config_value<'a>(snapshot: &'a Snapshot, key: &str) -> Option<&'a str> {
    snapshot
        .table(Sheet::ConfigPrices)
        .rows()
        .find(|row| row.get("key") == key)
        .map(|row| row.get("value"))
}

/// Numeric setting; `default` when missing or not a number.
pub fn price(snapshot: &Snapshot, key: &str, default: f64) -> f64 {
    config_value(snapshot, key)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .unwrap_or(default)
}

pub fn flag(snapshot: &Snapshot, key: &str, default: bool) -> bool {
    config_value(snapshot, key).map(is_truthy).unwrap_or(default)
}
