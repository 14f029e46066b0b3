//! Settlement of each transaction category into channel deltas, and the
//! shaping of a complete `transactions` row.

use chrono::{DateTime, FixedOffset};

use crate::{
    domain::{Category, ChannelDeltas, PaymentMethod, TransactionRecord},
    errors::OpsError,
};

use super::{
    clock::mint_id,
    fees::{bill_fee, charging_fee, tier_fee, FeeSchedule},
    session::{Action, Session},
};

pub const TRANSACTION_ID_PREFIX: &str = "tx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentKind {
    Correction,
    Refund,
}

/// Category-specific inputs of one business event.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionInput {
    CashWithdrawal {
        amount: f64,
        customer_method: PaymentMethod,
    },
    CashDeposit {
        amount: f64,
    },
    BillPayment {
        bill_type: String,
        amount: f64,
        customer_method: PaymentMethod,
    },
    GasSale {
        kg: f64,
        price_per_kg: f64,
        customer_method: PaymentMethod,
    },
    Charging {
        device_category: String,
        customer_method: PaymentMethod,
    },
    GasStockIn {
        kg: f64,
        cost: f64,
        paid_by: PaymentMethod,
    },
    /// Caller-supplied deltas, recorded as-is.
    Adjustment {
        kind: AdjustmentKind,
        deltas: ChannelDeltas,
    },
}

/// Free-text fields attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memo {
    pub note: String,
    pub reference: String,
}

impl Memo {
    pub fn new(note: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            reference: reference.into(),
        }
    }
}

/// Monetary outcome of one input at a known fee.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub sub_type: String,
    pub customer_method: Option<PaymentMethod>,
    pub provider_method: Option<PaymentMethod>,
    pub amount_value: f64,
    pub gas_kg: Option<f64>,
    pub price_per_kg: Option<f64>,
    pub fee: f64,
    pub total_paid_by_customer: f64,
    pub deltas: ChannelDeltas,
}

impl Settlement {
    fn new(fee: f64) -> Self {
        Self {
            sub_type: String::new(),
            customer_method: None,
            provider_method: None,
            amount_value: 0.0,
            gas_kg: None,
            price_per_kg: None,
            fee,
            total_paid_by_customer: 0.0,
            deltas: ChannelDeltas::default(),
        }
    }
}

fn positive(label: &str, value: f64) -> Result<(), OpsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OpsError::InvalidInput(format!("{label} must be greater than zero")))
    }
}

fn non_negative(label: &str, value: f64) -> Result<(), OpsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OpsError::InvalidInput(format!("{label} must be zero or more")))
    }
}

fn method_in(category: Category, method: PaymentMethod, allowed: &[PaymentMethod]) -> Result<(), OpsError> {
    if allowed.contains(&method) {
        Ok(())
    } else {
        let names: Vec<&str> = allowed.iter().map(PaymentMethod::as_str).collect();
        Err(OpsError::InvalidInput(format!(
            "{category} cannot be paid by {method}; use {}",
            names.join(" or ")
        )))
    }
}

fn named(label: &str, value: &str) -> Result<(), OpsError> {
    if value.trim().is_empty() {
        Err(OpsError::InvalidInput(format!("{label} is required")))
    } else {
        Ok(())
    }
}

impl TransactionInput {
    pub fn category(&self) -> Category {
        match self {
            TransactionInput::CashWithdrawal { .. } => Category::CashWithdrawal,
            TransactionInput::CashDeposit { .. } => Category::CashDeposit,
            TransactionInput::BillPayment { .. } => Category::BillPayment,
            TransactionInput::GasSale { .. } => Category::GasSale,
            TransactionInput::Charging { .. } => Category::Charging,
            TransactionInput::GasStockIn { .. } => Category::GasStockIn,
            TransactionInput::Adjustment {
                kind: AdjustmentKind::Correction,
                ..
            } => Category::Correction,
            TransactionInput::Adjustment {
                kind: AdjustmentKind::Refund,
                ..
            } => Category::Refund,
        }
    }

    /// Permission required to record this input.
    pub fn action(&self) -> Action {
        match self {
            TransactionInput::GasStockIn { .. } => Action::RecordStockIn,
            TransactionInput::Adjustment { .. } => Action::RecordAdjustment,
            _ => Action::RecordSale,
        }
    }

    pub fn validate(&self) -> Result<(), OpsError> {
        use PaymentMethod::{Cash, Pos, Transfer};
        let category = self.category();
        match self {
            TransactionInput::CashWithdrawal {
                amount,
                customer_method,
            } => {
                positive("amount", *amount)?;
                method_in(category, *customer_method, &[Pos, Transfer])
            }
            TransactionInput::CashDeposit { amount } => positive("amount", *amount),
            TransactionInput::BillPayment {
                bill_type,
                amount,
                customer_method,
            } => {
                named("bill type", bill_type)?;
                non_negative("amount", *amount)?;
                method_in(category, *customer_method, &[Cash, Transfer])
            }
            TransactionInput::GasSale {
                kg, price_per_kg, ..
            } => {
                positive("kg", *kg)?;
                non_negative("price per kg", *price_per_kg)
            }
            TransactionInput::Charging {
                device_category,
                customer_method,
            } => {
                named("device category", device_category)?;
                method_in(category, *customer_method, &[Cash, Transfer])
            }
            TransactionInput::GasStockIn { kg, cost, paid_by } => {
                positive("kg", *kg)?;
                non_negative("cost", *cost)?;
                method_in(category, *paid_by, &[Cash, Transfer])
            }
            TransactionInput::Adjustment { deltas, .. } => {
                let all = [deltas.cash, deltas.pos, deltas.transfer, deltas.gas_kg];
                if all.iter().all(|value| value.is_finite()) {
                    Ok(())
                } else {
                    Err(OpsError::InvalidInput("adjustment deltas must be numbers".into()))
                }
            }
        }
    }

    /// Fee charged for this input under `schedule`.
    pub fn fee(&self, schedule: &FeeSchedule<'_>) -> f64 {
        match self {
            TransactionInput::CashWithdrawal { amount, .. } => tier_fee(*amount, schedule.withdrawal),
            TransactionInput::CashDeposit { amount } => tier_fee(*amount, schedule.deposit),
            TransactionInput::BillPayment { bill_type, .. } => {
                bill_fee(bill_type.trim(), schedule.bill)
            }
            TransactionInput::Charging {
                device_category, ..
            } => charging_fee(device_category.trim(), schedule.charging),
            TransactionInput::GasSale { .. }
            | TransactionInput::GasStockIn { .. }
            | TransactionInput::Adjustment { .. } => 0.0,
        }
    }

    /// Channel deltas and derived amounts at the given fee.
    pub fn settle(&self, fee: f64) -> Settlement {
        use PaymentMethod::{Cash, Pos, Transfer};
        let mut out = Settlement::new(fee);
        match self {
            TransactionInput::CashWithdrawal {
                amount,
                customer_method,
            } => {
                let paid = amount + fee;
                out.customer_method = Some(*customer_method);
                out.provider_method = Some(Cash);
                out.amount_value = *amount;
                out.total_paid_by_customer = paid;
                out.deltas = ChannelDeltas::cash(-amount)
                    + match customer_method {
                        Pos => ChannelDeltas::pos(paid),
                        Transfer => ChannelDeltas::transfer(paid),
                        Cash => ChannelDeltas::default(),
                    };
            }
            TransactionInput::CashDeposit { amount } => {
                let paid = amount + fee;
                out.customer_method = Some(Cash);
                out.provider_method = Some(Transfer);
                out.amount_value = *amount;
                out.total_paid_by_customer = paid;
                out.deltas = ChannelDeltas::cash(paid) + ChannelDeltas::transfer(-amount);
            }
            TransactionInput::BillPayment {
                bill_type,
                amount,
                customer_method,
            } => {
                let paid = amount + fee;
                out.sub_type = bill_type.trim().to_string();
                out.customer_method = Some(*customer_method);
                out.provider_method = Some(Transfer);
                out.amount_value = *amount;
                out.total_paid_by_customer = paid;
                out.deltas = match customer_method {
                    Cash => ChannelDeltas::cash(paid) + ChannelDeltas::transfer(-amount),
                    _ => ChannelDeltas::transfer(fee),
                };
            }
            TransactionInput::GasSale {
                kg,
                price_per_kg,
                customer_method,
            } => {
                let total = kg * price_per_kg;
                out.customer_method = Some(*customer_method);
                out.amount_value = total;
                out.gas_kg = Some(*kg);
                out.price_per_kg = Some(*price_per_kg);
                out.total_paid_by_customer = total;
                out.deltas = ChannelDeltas::on(*customer_method, total) + ChannelDeltas::gas(-kg);
            }
            TransactionInput::Charging {
                device_category,
                customer_method,
            } => {
                out.sub_type = device_category.trim().to_string();
                out.customer_method = Some(*customer_method);
                out.total_paid_by_customer = fee;
                out.deltas = match customer_method {
                    Cash | Transfer => ChannelDeltas::on(*customer_method, fee),
                    Pos => ChannelDeltas::default(),
                };
            }
            TransactionInput::GasStockIn { kg, cost, paid_by } => {
                out.provider_method = Some(*paid_by);
                out.amount_value = *cost;
                out.gas_kg = Some(*kg);
                out.deltas = ChannelDeltas::gas(*kg);
                if *cost > 0.0 {
                    out.deltas += match paid_by {
                        Cash | Transfer => ChannelDeltas::on(*paid_by, -cost),
                        Pos => ChannelDeltas::default(),
                    };
                }
            }
            TransactionInput::Adjustment { deltas, .. } => {
                out.deltas = *deltas;
            }
        }
        out
    }
}

/// Validates `input`, prices it and shapes the row it will be appended as.
pub fn build_transaction(
    input: &TransactionInput,
    schedule: &FeeSchedule<'_>,
    session: &Session,
    now: DateTime<FixedOffset>,
    memo: Memo,
) -> Result<TransactionRecord, OpsError> {
    input.validate()?;
    let settlement = input.settle(input.fee(schedule));
    Ok(TransactionRecord {
        id: mint_id(TRANSACTION_ID_PREFIX, now),
        datetime: now,
        date: now.date_naive(),
        user: session.username.clone(),
        role: session.role,
        category: input.category(),
        sub_type: settlement.sub_type,
        customer_method: settlement.customer_method,
        provider_method: settlement.provider_method,
        amount_value: settlement.amount_value,
        gas_kg: settlement.gas_kg,
        price_per_kg: settlement.price_per_kg,
        fee: settlement.fee,
        total_paid_by_customer: settlement.total_paid_by_customer,
        deltas: settlement.deltas,
        note: memo.note,
        reference: memo.reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, Role, Table};
    use crate::storage::schema::{BILL_FEE_HEADERS, CHARGING_FEE_HEADERS, TIER_HEADERS};
    use chrono::NaiveDate;

    fn tiers() -> Table {
        let mut table = Table::new(TIER_HEADERS);
        for (min, max, fee) in [("500", "5000", "100"), ("5000.01", "10000", "200")] {
            table.push(
                &Record::new()
                    .with("min_amount", min)
                    .with("max_amount", max)
                    .with("fee", fee),
            );
        }
        table
    }

    struct Tables {
        tiers: Table,
        bill: Table,
        charging: Table,
    }

    impl Tables {
        fn new() -> Self {
            let mut bill = Table::new(BILL_FEE_HEADERS);
            bill.push(&Record::new().with("bill_type", "Cable").with("fee", "100"));
            let mut charging = Table::new(CHARGING_FEE_HEADERS);
            charging.push(&Record::new().with("category", "Laptop").with("fee", "300"));
            Self {
                tiers: tiers(),
                bill,
                charging,
            }
        }

        fn schedule(&self) -> FeeSchedule<'_> {
            FeeSchedule {
                withdrawal: &self.tiers,
                deposit: &self.tiers,
                bill: &self.bill,
                charging: &self.charging,
            }
        }
    }

    fn build(input: TransactionInput) -> Result<TransactionRecord, OpsError> {
        let tables = Tables::new();
        let session = Session::new("attendant", "SALES", Role::Attendant);
        let now = DateTime::parse_from_rfc3339("2024-05-01T09:15:30.000042+01:00").unwrap();
        build_transaction(&input, &tables.schedule(), &session, now, Memo::default())
    }

    #[test]
    fn withdrawal_via_pos_nets_only_the_fee() {
        let record = build(TransactionInput::CashWithdrawal {
            amount: 3000.0,
            customer_method: PaymentMethod::Pos,
        })
        .unwrap();
        assert_eq!(record.fee, 100.0);
        assert_eq!(record.deltas.cash, -3000.0);
        assert_eq!(record.deltas.pos, 3100.0);
        assert_eq!(record.deltas.transfer, 0.0);
        assert_eq!(record.deltas.value_total(), record.fee);
        assert_eq!(record.total_paid_by_customer, 3100.0);
        assert_eq!(record.id, "tx_20240501091530000042");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(record.user, "attendant");
    }

    #[test]
    fn deposit_moves_principal_from_transfer_to_cash() {
        let record = build(TransactionInput::CashDeposit { amount: 6000.0 }).unwrap();
        assert_eq!(record.fee, 200.0);
        assert_eq!(record.deltas.cash, 6200.0);
        assert_eq!(record.deltas.transfer, -6000.0);
        assert_eq!(record.deltas.value_total(), 200.0);
    }

    #[test]
    fn bill_payment_depends_on_channel() {
        let by_cash = build(TransactionInput::BillPayment {
            bill_type: "cable".into(),
            amount: 5000.0,
            customer_method: PaymentMethod::Cash,
        })
        .unwrap();
        assert_eq!(by_cash.fee, 100.0);
        assert_eq!(by_cash.deltas.cash, 5100.0);
        assert_eq!(by_cash.deltas.transfer, -5000.0);

        let by_transfer = build(TransactionInput::BillPayment {
            bill_type: "Electricity".into(),
            amount: 5000.0,
            customer_method: PaymentMethod::Transfer,
        })
        .unwrap();
        assert_eq!(by_transfer.fee, 0.0);
        assert_eq!(by_transfer.deltas, ChannelDeltas::default());
        assert_eq!(by_transfer.sub_type, "Electricity");
    }

    #[test]
    fn gas_sale_charges_kg_times_price() {
        let record = build(TransactionInput::GasSale {
            kg: 5.0,
            price_per_kg: 500.0,
            customer_method: PaymentMethod::Cash,
        })
        .unwrap();
        assert_eq!(record.amount_value, 2500.0);
        assert_eq!(record.total_paid_by_customer, 2500.0);
        assert_eq!(record.deltas.cash, 2500.0);
        assert_eq!(record.deltas.gas_kg, -5.0);
        assert_eq!(record.fee, 0.0);
    }

    #[test]
    fn charging_collects_only_the_fee() {
        let record = build(TransactionInput::Charging {
            device_category: "LAPTOP".into(),
            customer_method: PaymentMethod::Transfer,
        })
        .unwrap();
        assert_eq!(record.fee, 300.0);
        assert_eq!(record.amount_value, 0.0);
        assert_eq!(record.total_paid_by_customer, 300.0);
        assert_eq!(record.deltas, ChannelDeltas::transfer(300.0));
    }

    #[test]
    fn padded_names_are_priced_as_recorded() {
        let bill = build(TransactionInput::BillPayment {
            bill_type: " Cable ".into(),
            amount: 2000.0,
            customer_method: PaymentMethod::Cash,
        })
        .unwrap();
        assert_eq!(bill.sub_type, "Cable");
        assert_eq!(bill.fee, 100.0);

        let charge = build(TransactionInput::Charging {
            device_category: "laptop  ".into(),
            customer_method: PaymentMethod::Cash,
        })
        .unwrap();
        assert_eq!(charge.sub_type, "laptop");
        assert_eq!(charge.fee, 300.0);
    }

    #[test]
    fn stock_in_adds_gas_and_pays_cost() {
        let record = build(TransactionInput::GasStockIn {
            kg: 25.0,
            cost: 20000.0,
            paid_by: PaymentMethod::Transfer,
        })
        .unwrap();
        assert_eq!(record.deltas.gas_kg, 25.0);
        assert_eq!(record.deltas.transfer, -20000.0);
        assert_eq!(record.total_paid_by_customer, 0.0);

        let free = build(TransactionInput::GasStockIn {
            kg: 10.0,
            cost: 0.0,
            paid_by: PaymentMethod::Cash,
        })
        .unwrap();
        assert_eq!(free.deltas, ChannelDeltas::gas(10.0));
    }

    #[test]
    fn adjustments_keep_caller_deltas() {
        let deltas = ChannelDeltas::cash(-150.0) + ChannelDeltas::pos(150.0);
        let record = build(TransactionInput::Adjustment {
            kind: AdjustmentKind::Refund,
            deltas,
        })
        .unwrap();
        assert_eq!(record.category, Category::Refund);
        assert_eq!(record.deltas, deltas);
        assert_eq!(record.fee, 0.0);
        assert_eq!(record.total_paid_by_customer, 0.0);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let cases = [
            TransactionInput::CashWithdrawal {
                amount: 0.0,
                customer_method: PaymentMethod::Pos,
            },
            TransactionInput::CashWithdrawal {
                amount: 1000.0,
                customer_method: PaymentMethod::Cash,
            },
            TransactionInput::CashDeposit { amount: f64::NAN },
            TransactionInput::GasSale {
                kg: -1.0,
                price_per_kg: 500.0,
                customer_method: PaymentMethod::Pos,
            },
            TransactionInput::Charging {
                device_category: " ".into(),
                customer_method: PaymentMethod::Cash,
            },
            TransactionInput::GasStockIn {
                kg: 5.0,
                cost: 100.0,
                paid_by: PaymentMethod::Pos,
            },
        ];
        for input in cases {
            assert!(
                matches!(build(input.clone()), Err(OpsError::InvalidInput(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn every_sale_conserves_value_up_to_the_fee() {
        let sales = [
            TransactionInput::CashWithdrawal {
                amount: 7500.0,
                customer_method: PaymentMethod::Transfer,
            },
            TransactionInput::CashDeposit { amount: 1200.0 },
            TransactionInput::BillPayment {
                bill_type: "Cable".into(),
                amount: 4000.0,
                customer_method: PaymentMethod::Cash,
            },
            TransactionInput::Charging {
                device_category: "Laptop".into(),
                customer_method: PaymentMethod::Cash,
            },
        ];
        for input in sales {
            let record = build(input).unwrap();
            assert!((record.deltas.value_total() - record.fee).abs() < 1e-9);
        }
    }
}
