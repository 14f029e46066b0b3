use std::{
    fmt,
    ops::{Add, AddAssign},
    str::FromStr,
};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{
    common::{day_key, format_number},
    table::Record,
    user::Role,
};

/// Kind of business event a ledger row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CashWithdrawal,
    CashDeposit,
    BillPayment,
    GasSale,
    Charging,
    GasStockIn,
    Correction,
    Refund,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::CashWithdrawal,
        Category::CashDeposit,
        Category::BillPayment,
        Category::GasSale,
        Category::Charging,
        Category::GasStockIn,
        Category::Correction,
        Category::Refund,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CashWithdrawal => "cash_withdrawal",
            Category::CashDeposit => "cash_deposit",
            Category::BillPayment => "bill_payment",
            Category::GasSale => "gas_sale",
            Category::Charging => "charging",
            Category::GasStockIn => "gas_stock_in",
            Category::Correction => "correction",
            Category::Refund => "refund",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| format!("unknown category `{}`", s))
    }
}

/// Payment channel a customer or provider settles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pos,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Pos => "pos",
            PaymentMethod::Transfer => "transfer",
        }
    }

    /// Column value for an optional method; unset is the empty string.
    pub fn cell(method: Option<PaymentMethod>) -> &'static str {
        method.map(|m| m.as_str()).unwrap_or("")
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "pos" => Ok(PaymentMethod::Pos),
            "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(format!("unknown payment method `{}`", other)),
        }
    }
}

/// Signed changes to the four tracked channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelDeltas {
    pub cash: f64,
    pub pos: f64,
    pub transfer: f64,
    pub gas_kg: f64,
}

impl ChannelDeltas {
    pub fn cash(amount: f64) -> Self {
        Self {
            cash: amount,
            ..Self::default()
        }
    }

    pub fn pos(amount: f64) -> Self {
        Self {
            pos: amount,
            ..Self::default()
        }
    }

    pub fn transfer(amount: f64) -> Self {
        Self {
            transfer: amount,
            ..Self::default()
        }
    }

    pub fn gas(kg: f64) -> Self {
        Self {
            gas_kg: kg,
            ..Self::default()
        }
    }

    /// Delta routed to a single money channel.
    pub fn on(method: PaymentMethod, amount: f64) -> Self {
        match method {
            PaymentMethod::Cash => Self::cash(amount),
            PaymentMethod::Pos => Self::pos(amount),
            PaymentMethod::Transfer => Self::transfer(amount),
        }
    }

    /// Net money movement across cash, POS and transfer.
    pub fn value_total(&self) -> f64 {
        self.cash + self.pos + self.transfer
    }
}

impl Add for ChannelDeltas {
    type Output = ChannelDeltas;

    fn add(self, rhs: ChannelDeltas) -> ChannelDeltas {
        ChannelDeltas {
            cash: self.cash + rhs.cash,
            pos: self.pos + rhs.pos,
            transfer: self.transfer + rhs.transfer,
            gas_kg: self.gas_kg + rhs.gas_kg,
        }
    }
}

impl AddAssign for ChannelDeltas {
    fn add_assign(&mut self, rhs: ChannelDeltas) {
        *self = *self + rhs;
    }
}

/// One normalized `transactions` row. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub datetime: DateTime<FixedOffset>,
    pub date: NaiveDate,
    pub user: String,
    pub role: Role,
    pub category: Category,
    pub sub_type: String,
    pub customer_method: Option<PaymentMethod>,
    pub provider_method: Option<PaymentMethod>,
    pub amount_value: f64,
    pub gas_kg: Option<f64>,
    pub price_per_kg: Option<f64>,
    pub fee: f64,
    pub total_paid_by_customer: f64,
    pub deltas: ChannelDeltas,
    pub note: String,
    pub reference: String,
}

impl TransactionRecord {
    pub fn to_record(&self) -> Record {
        let optional = |value: Option<f64>| value.map(format_number).unwrap_or_default();
        Record::new()
            .with("id", self.id.clone())
            .with("datetime", self.datetime.to_rfc3339())
            .with("date", day_key(self.date))
            .with("user", self.user.clone())
            .with("role", self.role.as_str())
            .with("category", self.category.as_str())
            .with("sub_type", self.sub_type.clone())
            .with("customer_method", PaymentMethod::cell(self.customer_method))
            .with("provider_method", PaymentMethod::cell(self.provider_method))
            .with("amount_value", format_number(self.amount_value))
            .with("gas_kg", optional(self.gas_kg))
            .with("price_per_kg", optional(self.price_per_kg))
            .with("fee", format_number(self.fee))
            .with("total_paid_by_customer", format_number(self.total_paid_by_customer))
            .with("cash_delta", format_number(self.deltas.cash))
            .with("pos_delta", format_number(self.deltas.pos))
            .with("transfer_delta", format_number(self.deltas.transfer))
            .with("gas_kg_delta", format_number(self.deltas.gas_kg))
            .with("note", self.note.clone())
            .with("ref", self.reference.clone())
    }
}
