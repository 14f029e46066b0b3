//! Commands that append transactions.

use crate::cli::core::{parse_amount, parse_method, Args, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::kilograms;
use crate::cli::registry::{Access, CommandEntry};
use crate::core::{
    recorder::{AdjustmentKind, Memo, TransactionInput},
    services::{PricingService, TransactionService},
};
use crate::domain::{ChannelDeltas, TransactionRecord};

const WITHDRAW_USAGE: &str = "withdraw <amount> <pos|transfer> [--note=..] [--ref=..]";
const DEPOSIT_USAGE: &str = "deposit <amount> [--note=..] [--ref=..]";
const BILL_USAGE: &str = "bill <bill type> <amount> <cash|transfer> [--note=..] [--ref=..]";
const GAS_USAGE: &str = "gas <kg> <cash|pos|transfer> [--price=<per kg>] [--note=..]";
const CHARGE_USAGE: &str = "charge <device category> <cash|transfer> [--note=..]";
const STOCK_IN_USAGE: &str = "stock-in <kg> <cost> <cash|transfer> [--note=..]";
const ADJUST_USAGE: &str = "adjust <correction|refund> <cash> <pos> <transfer> <gas kg> [--note=..]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "withdraw",
            "Cash out to a customer paying by POS or transfer",
            WITHDRAW_USAGE,
            Access::LoggedIn,
            cmd_withdraw,
        ),
        CommandEntry::new(
            "deposit",
            "Take cash and send it on by transfer",
            DEPOSIT_USAGE,
            Access::LoggedIn,
            cmd_deposit,
        ),
        CommandEntry::new("bill", "Pay a bill for a customer", BILL_USAGE, Access::LoggedIn, cmd_bill),
        CommandEntry::new("gas", "Sell gas by the kilogram", GAS_USAGE, Access::LoggedIn, cmd_gas),
        CommandEntry::new(
            "charge",
            "Charge a customer's device",
            CHARGE_USAGE,
            Access::LoggedIn,
            cmd_charge,
        ),
        CommandEntry::new(
            "stock-in",
            "Record a gas delivery",
            STOCK_IN_USAGE,
            Access::LoggedIn,
            cmd_stock_in,
        ),
        CommandEntry::new(
            "adjust",
            "Record a correction or refund with explicit deltas",
            ADJUST_USAGE,
            Access::Admin,
            cmd_adjust,
        ),
    ]
}

fn memo(args: &Args<'_>) -> Memo {
    Memo::new(args.option("note").unwrap_or(""), args.option("ref").unwrap_or(""))
}

fn record(context: &mut ShellContext, input: TransactionInput, memo: Memo) -> CommandResult {
    let ctx = context.op()?;
    let record = TransactionService::record(&ctx, &input, memo)?;
    report(context, &record);
    Ok(())
}

fn report(context: &ShellContext, record: &TransactionRecord) {
    let label = if record.sub_type.is_empty() {
        record.category.to_string()
    } else {
        format!("{} ({})", record.category, record.sub_type)
    };
    io::print_success(format!("Recorded {} as {}.", label, record.id));
    io::print_info(format!(
        "  Fee {}, customer pays {}",
        context.money(record.fee),
        context.money(record.total_paid_by_customer)
    ));
    let ChannelDeltas {
        cash,
        pos,
        transfer,
        gas_kg,
    } = record.deltas;
    io::print_info(format!(
        "  Cash {}  POS {}  Transfer {}  Gas {}",
        context.money(cash),
        context.money(pos),
        context.money(transfer),
        kilograms(gas_kg)
    ));
}

fn cmd_withdraw(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let amount = parse_amount("amount", args.require(0, WITHDRAW_USAGE)?)?;
    let customer_method = parse_method(args.require(1, WITHDRAW_USAGE)?)?;
    record(
        context,
        TransactionInput::CashWithdrawal {
            amount,
            customer_method,
        },
        memo(&args),
    )
}

fn cmd_deposit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let amount = parse_amount("amount", args.require(0, DEPOSIT_USAGE)?)?;
    record(context, TransactionInput::CashDeposit { amount }, memo(&args))
}

fn cmd_bill(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let bill_type = args.require(0, BILL_USAGE)?.to_string();
    let amount = parse_amount("amount", args.require(1, BILL_USAGE)?)?;
    let customer_method = parse_method(args.require(2, BILL_USAGE)?)?;
    record(
        context,
        TransactionInput::BillPayment {
            bill_type,
            amount,
            customer_method,
        },
        memo(&args),
    )
}

fn cmd_gas(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let kg = parse_amount("kg", args.require(0, GAS_USAGE)?)?;
    let customer_method = parse_method(args.require(1, GAS_USAGE)?)?;
    let price_per_kg = match args.option("price") {
        Some(raw) => parse_amount("price", raw)?,
        None => {
            let snapshot = context.store.read_all()?;
            PricingService::gas_price(&snapshot)
        }
    };
    if price_per_kg <= 0.0 {
        io::print_warning("Gas price is zero; set it with `price gas_price_per_kg <amount>`.");
    }
    record(
        context,
        TransactionInput::GasSale {
            kg,
            price_per_kg,
            customer_method,
        },
        memo(&args),
    )
}

fn cmd_charge(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let device_category = args.require(0, CHARGE_USAGE)?.to_string();
    let customer_method = parse_method(args.require(1, CHARGE_USAGE)?)?;
    record(
        context,
        TransactionInput::Charging {
            device_category,
            customer_method,
        },
        memo(&args),
    )
}

fn cmd_stock_in(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let kg = parse_amount("kg", args.require(0, STOCK_IN_USAGE)?)?;
    let cost = parse_amount("cost", args.require(1, STOCK_IN_USAGE)?)?;
    let paid_by = parse_method(args.require(2, STOCK_IN_USAGE)?)?;
    record(
        context,
        TransactionInput::GasStockIn { kg, cost, paid_by },
        memo(&args),
    )
}

fn cmd_adjust(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let kind = match args.require(0, ADJUST_USAGE)?.to_ascii_lowercase().as_str() {
        "correction" => AdjustmentKind::Correction,
        "refund" => AdjustmentKind::Refund,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown adjustment `{other}`; use correction or refund"
            )))
        }
    };
    let deltas = ChannelDeltas {
        cash: parse_amount("cash", args.require(1, ADJUST_USAGE)?)?,
        pos: parse_amount("pos", args.require(2, ADJUST_USAGE)?)?,
        transfer: parse_amount("transfer", args.require(3, ADJUST_USAGE)?)?,
        gas_kg: parse_amount("gas kg", args.require(4, ADJUST_USAGE)?)?,
    };
    record(context, TransactionInput::Adjustment { kind, deltas }, memo(&args))
}
