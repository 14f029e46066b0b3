//! Fee lookup over the `config_fees_*` tables. Pure functions; a lookup
//! miss is a zero fee, never an error.

use crate::{
    domain::{FeeTier, Table},
    storage::{Sheet, Snapshot},
};

/// Fee of the first tier, ordered by `(min_amount, max_amount)`, whose
/// inclusive range contains `amount`; `0.0` when none does.
pub fn tier_fee(amount: f64, tiers: &Table) -> f64 {
    tier_fee_from(amount, &tiers_from_table(tiers))
}

pub fn tiers_from_table(table: &Table) -> Vec<FeeTier> {
    table.rows().map(|row| FeeTier::from_row(&row)).collect()
}

/// Tiers in lookup order: ascending `(min_amount, max_amount)`.
fn sorted_tiers(tiers: &[FeeTier]) -> Vec<FeeTier> {
    let mut sorted = tiers.to_vec();
    sorted.sort_by(|a, b| {
        a.min_amount
            .total_cmp(&b.min_amount)
            .then_with(|| a.max_amount.total_cmp(&b.max_amount))
    });
    sorted
}

pub fn tier_fee_from(amount: f64, tiers: &[FeeTier]) -> f64 {
    sorted_tiers(tiers)
        .iter()
        .find(|tier| tier.contains(amount))
        .map(|tier| tier.fee)
        .unwrap_or(0.0)
}

/// Case-insensitive exact match of `key` in `key_column`; the matching
/// row's `fee_column` as a number, or `0.0` if absent or unparsable.
pub fn fixed_fee(key: &str, table: &Table, key_column: &str, fee_column: &str) -> f64 {
    if table.column_index(key_column).is_none() || table.column_index(fee_column).is_none() {
        return 0.0;
    }
    let needle = key.to_lowercase();
    table
        .rows()
        .find(|row| row.get(key_column).to_lowercase() == needle)
        .and_then(|row| row.get(fee_column).trim().parse::<f64>().ok())
        .filter(|fee| fee.is_finite())
        .unwrap_or(0.0)
}

pub fn bill_fee(bill_type: &str, table: &Table) -> f64 {
    fixed_fee(bill_type, table, "bill_type", "fee")
}

pub fn charging_fee(device_category: &str, table: &Table) -> f64 {
    fixed_fee(device_category, table, "category", "fee")
}

/// The four fee tables, borrowed from one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FeeSchedule<'a> {
    pub withdrawal: &'a Table,
    pub deposit: &'a Table,
    pub bill: &'a Table,
    pub charging: &'a Table,
}

impl<'a> FeeSchedule<'a> {
    pub fn from_snapshot(snapshot: &'a Snapshot) -> Self {
        Self {
            withdrawal: snapshot.table(Sheet::FeesWithdrawal),
            deposit: snapshot.table(Sheet::FeesDeposit),
            bill: snapshot.table(Sheet::FeesBill),
            charging: snapshot.table(Sheet::FeesCharging),
        }
    }
}

/// Overlapping or touching tiers, as `(earlier, later)` pairs in lookup order.
///
/// Each tier is checked against the widest-reaching tier before it, so a
/// broad band overlapping several later ones yields one pair per overlap.
pub fn overlapping_tiers(tiers: &[FeeTier]) -> Vec<(FeeTier, FeeTier)> {
    let sorted = sorted_tiers(tiers);
    let mut overlaps = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(mut reach) = iter.next() else {
        return overlaps;
    };
    for tier in iter {
        if tier.min_amount <= reach.max_amount {
            overlaps.push((reach, tier));
        }
        if tier.max_amount > reach.max_amount {
            reach = tier;
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use crate::storage::schema::{BILL_FEE_HEADERS, TIER_HEADERS};

    fn tiers(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new(TIER_HEADERS);
        for (min, max, fee) in rows {
            table.push(
                &Record::new()
                    .with("min_amount", *min)
                    .with("max_amount", *max)
                    .with("fee", *fee),
            );
        }
        table
    }

    fn standard() -> Table {
        tiers(&[
            ("5000.01", "10000", "200"),
            ("500", "5000", "100"),
            ("10000.01", "20000", "300"),
        ])
    }

    #[test]
    fn boundaries_are_inclusive() {
        let table = standard();
        assert_eq!(tier_fee(500.0, &table), 100.0);
        assert_eq!(tier_fee(5000.0, &table), 100.0);
        assert_eq!(tier_fee(5000.01, &table), 200.0);
        assert_eq!(tier_fee(20000.0, &table), 300.0);
    }

    #[test]
    fn misses_are_zero() {
        let table = standard();
        assert_eq!(tier_fee(499.99, &table), 0.0);
        assert_eq!(tier_fee(5000.005, &table), 0.0);
        assert_eq!(tier_fee(25000.0, &table), 0.0);
        assert_eq!(tier_fee(3000.0, &Table::new(TIER_HEADERS)), 0.0);
    }

    #[test]
    fn overlapping_tiers_resolve_to_first_in_sorted_order() {
        let table = tiers(&[("0", "10000", "250"), ("0", "5000", "150")]);
        assert_eq!(tier_fee(3000.0, &table), 150.0);
        assert_eq!(tier_fee(7000.0, &table), 250.0);
        assert_eq!(overlapping_tiers(&tiers_from_table(&table)).len(), 1);
    }

    #[test]
    fn wide_tier_overlaps_every_tier_it_spans() {
        let table = tiers(&[("300", "400", "5"), ("0", "10000", "50"), ("100", "200", "3")]);
        let overlaps = overlapping_tiers(&tiers_from_table(&table));
        assert_eq!(overlaps.len(), 2);
        assert!(overlaps
            .iter()
            .all(|(earlier, _)| earlier.max_amount == 10000.0));

        let disjoint = overlapping_tiers(&tiers_from_table(&standard()));
        assert!(disjoint.is_empty());
    }

    #[test]
    fn non_numeric_tier_cells_coerce_to_zero() {
        let table = tiers(&[("abc", "1000", "50")]);
        assert_eq!(tier_fee(0.0, &table), 50.0);
        assert_eq!(tier_fee(1000.0, &table), 50.0);
    }

    #[test]
    fn fixed_fee_ignores_case() {
        let mut table = Table::new(BILL_FEE_HEADERS);
        table.push(&Record::new().with("bill_type", "Cable").with("fee", "100"));
        assert_eq!(bill_fee("cable", &table), bill_fee("Cable", &table));
        assert_eq!(bill_fee("CABLE", &table), 100.0);
    }

    #[test]
    fn fixed_fee_misses_and_garbage_are_zero() {
        let mut table = Table::new(BILL_FEE_HEADERS);
        table.push(&Record::new().with("bill_type", "Cable").with("fee", "n/a"));
        assert_eq!(bill_fee("Electricity", &table), 0.0);
        assert_eq!(bill_fee("Cable", &table), 0.0);
        assert_eq!(charging_fee("Powerbank", &table), 0.0);
    }
}
