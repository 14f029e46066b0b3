use agent_ledger::{
    core::{build_transaction, expected_balances, Clock, FeeSchedule, FixedClock, Memo, TransactionInput},
    domain::{ChannelDeltas, DailyOpening, FeeTier, PaymentMethod, Record, Table},
    storage::schema::{
        BILL_FEE_HEADERS, CHARGING_FEE_HEADERS, OPENING_HEADERS, TIER_HEADERS, TRANSACTION_HEADERS,
    },
};
use chrono::NaiveDate;

mod common;

struct Tables {
    withdrawal: Table,
    deposit: Table,
    bill: Table,
    charging: Table,
}

impl Tables {
    fn new() -> Self {
        let mut withdrawal = Table::new(TIER_HEADERS);
        withdrawal.push(&FeeTier::new(500.0, 5000.0, 100.0).to_record());
        withdrawal.push(&FeeTier::new(5000.01, 10000.0, 200.0).to_record());
        let mut charging = Table::new(CHARGING_FEE_HEADERS);
        charging.push(&Record::new().with("category", "Powerbank").with("fee", "300"));
        Self {
            deposit: withdrawal.clone(),
            withdrawal,
            bill: Table::new(BILL_FEE_HEADERS),
            charging,
        }
    }

    fn schedule(&self) -> FeeSchedule<'_> {
        FeeSchedule {
            withdrawal: &self.withdrawal,
            deposit: &self.deposit,
            bill: &self.bill,
            charging: &self.charging,
        }
    }
}

fn clock() -> FixedClock {
    common::clock()
}

#[test]
fn withdrawal_by_pos_pays_out_cash_and_collects_fee_on_pos() {
    let tables = Tables::new();
    let input = TransactionInput::CashWithdrawal {
        amount: 3000.0,
        customer_method: PaymentMethod::Pos,
    };
    let record = build_transaction(
        &input,
        &tables.schedule(),
        &common::attendant(),
        clock().now(),
        Memo::default(),
    )
    .unwrap();

    assert_eq!(record.fee, 100.0);
    assert_eq!(record.total_paid_by_customer, 3100.0);
    assert_eq!(record.deltas.cash, -3000.0);
    assert_eq!(record.deltas.pos, 3100.0);
    assert_eq!(record.deltas.transfer, 0.0);
    assert_eq!(record.user, "attendant");
}

#[test]
fn gas_sale_moves_stock_out_and_value_in() {
    let tables = Tables::new();
    let input = TransactionInput::GasSale {
        kg: 5.0,
        price_per_kg: 500.0,
        customer_method: PaymentMethod::Cash,
    };
    let record = build_transaction(
        &input,
        &tables.schedule(),
        &common::attendant(),
        clock().now(),
        Memo::default(),
    )
    .unwrap();

    assert_eq!(record.amount_value, 2500.0);
    assert_eq!(record.deltas.gas_kg, -5.0);
    assert_eq!(record.deltas.cash, 2500.0);
    assert_eq!(record.fee, 0.0);
}

#[test]
fn opening_plus_withdrawal_gives_expected_cash() {
    let tables = Tables::new();
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let mut openings = Table::new(OPENING_HEADERS);
    let mut opening = DailyOpening::new(day);
    opening.cash_open = 10_000.0;
    openings.push(&opening.to_record());

    let mut transactions = Table::new(TRANSACTION_HEADERS);
    let withdrawal = build_transaction(
        &TransactionInput::CashWithdrawal {
            amount: 3000.0,
            customer_method: PaymentMethod::Transfer,
        },
        &tables.schedule(),
        &common::attendant(),
        clock().now(),
        Memo::default(),
    )
    .unwrap();
    transactions.push(&withdrawal.to_record());

    let balances = expected_balances(day, &openings, &transactions);
    assert_eq!(balances.cash, 7000.0);
    assert_eq!(balances.transfer, 3100.0);
    assert_eq!(balances.pos, 0.0);
}

#[test]
fn bill_without_fee_row_costs_nothing_extra() {
    let tables = Tables::new();
    let input = TransactionInput::BillPayment {
        bill_type: "Electricity".into(),
        amount: 4000.0,
        customer_method: PaymentMethod::Cash,
    };
    let record = build_transaction(
        &input,
        &tables.schedule(),
        &common::attendant(),
        clock().now(),
        Memo::new("meter 123", "ref-9"),
    )
    .unwrap();

    assert_eq!(record.fee, 0.0);
    assert_eq!(record.total_paid_by_customer, 4000.0);
    assert_eq!(record.deltas.cash, 4000.0);
    assert_eq!(record.deltas.transfer, -4000.0);
    assert_eq!(record.reference, "ref-9");
}

#[test]
fn every_fee_bearing_event_nets_to_its_fee() {
    let tables = Tables::new();
    let inputs = [
        TransactionInput::CashWithdrawal {
            amount: 7000.0,
            customer_method: PaymentMethod::Transfer,
        },
        TransactionInput::CashDeposit { amount: 2000.0 },
        TransactionInput::BillPayment {
            bill_type: "Cable".into(),
            amount: 6500.0,
            customer_method: PaymentMethod::Transfer,
        },
        TransactionInput::Charging {
            device_category: "powerbank".into(),
            customer_method: PaymentMethod::Cash,
        },
    ];
    for input in inputs {
        let record = build_transaction(
            &input,
            &tables.schedule(),
            &common::admin(),
            clock().now(),
            Memo::default(),
        )
        .unwrap();
        let net = record.deltas.value_total();
        assert!(
            (net - record.fee).abs() < 1e-9,
            "{input:?} nets {net}, fee {}",
            record.fee
        );
    }
}

#[test]
fn amounts_outside_all_tiers_are_free() {
    let tables = Tables::new();
    let input = TransactionInput::CashWithdrawal {
        amount: 250.0,
        customer_method: PaymentMethod::Pos,
    };
    let record = build_transaction(
        &input,
        &tables.schedule(),
        &common::attendant(),
        clock().now(),
        Memo::default(),
    )
    .unwrap();
    assert_eq!(record.fee, 0.0);
    assert_eq!(record.deltas, ChannelDeltas {
        cash: -250.0,
        pos: 250.0,
        transfer: 0.0,
        gas_kg: 0.0,
    });
}
