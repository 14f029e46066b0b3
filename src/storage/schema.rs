//! Fixed sheet names and header rows. Header order is significant.

use std::{fmt, str::FromStr};

pub const USER_HEADERS: &[&str] = &["username", "role", "display_name", "active"];
pub const PRICE_HEADERS: &[&str] = &["key", "value"];
pub const TIER_HEADERS: &[&str] = &["min_amount", "max_amount", "fee"];
pub const BILL_FEE_HEADERS: &[&str] = &["bill_type", "fee"];
pub const CHARGING_FEE_HEADERS: &[&str] = &["category", "fee"];
pub const OPENING_HEADERS: &[&str] = &[
    "date",
    "attendant",
    "cash_open",
    "pos_open",
    "transfer_open",
    "gas_open_kg",
    "notes",
];
pub const TRANSACTION_HEADERS: &[&str] = &[
    "id",
    "datetime",
    "date",
    "user",
    "role",
    "category",
    "sub_type",
    "customer_method",
    "provider_method",
    "amount_value",
    "gas_kg",
    "price_per_kg",
    "fee",
    "total_paid_by_customer",
    "cash_delta",
    "pos_delta",
    "transfer_delta",
    "gas_kg_delta",
    "note",
    "ref",
];
pub const CLOSING_HEADERS: &[&str] = &["date", "cash_counted", "gas_measured_kg", "notes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sheet {
    ConfigUsers,
    ConfigPrices,
    FeesWithdrawal,
    FeesDeposit,
    FeesBill,
    FeesCharging,
    DailyOpenings,
    Transactions,
    ClosingCounts,
}

impl Sheet {
    pub const ALL: [Sheet; 9] = [
        Sheet::ConfigUsers,
        Sheet::ConfigPrices,
        Sheet::FeesWithdrawal,
        Sheet::FeesDeposit,
        Sheet::FeesBill,
        Sheet::FeesCharging,
        Sheet::DailyOpenings,
        Sheet::Transactions,
        Sheet::ClosingCounts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sheet::ConfigUsers => "config_users",
            Sheet::ConfigPrices => "config_prices",
            Sheet::FeesWithdrawal => "config_fees_withdrawal",
            Sheet::FeesDeposit => "config_fees_deposit",
            Sheet::FeesBill => "config_fees_bill",
            Sheet::FeesCharging => "config_fees_charging",
            Sheet::DailyOpenings => "daily_openings",
            Sheet::Transactions => "transactions",
            Sheet::ClosingCounts => "closing_counts",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Sheet::ConfigUsers => USER_HEADERS,
            Sheet::ConfigPrices => PRICE_HEADERS,
            Sheet::FeesWithdrawal | Sheet::FeesDeposit => TIER_HEADERS,
            Sheet::FeesBill => BILL_FEE_HEADERS,
            Sheet::FeesCharging => CHARGING_FEE_HEADERS,
            Sheet::DailyOpenings => OPENING_HEADERS,
            Sheet::Transactions => TRANSACTION_HEADERS,
            Sheet::ClosingCounts => CLOSING_HEADERS,
        }
    }

    /// Position in `Sheet::ALL`.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sheet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sheet::ALL
            .into_iter()
            .find(|sheet| sheet.name() == s.trim())
            .ok_or_else(|| format!("unknown sheet `{}`", s))
    }
}
