//! Day-level views: balances, openings, the transaction list and closing.

use chrono::NaiveDate;

use crate::cli::core::{parse_amount, parse_date, Args, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{kilograms, render_table, section};
use crate::cli::registry::{Access, CommandEntry};
use crate::core::{
    services::{ClosingService, OpeningService, SummaryService, TransactionService},
    ExpectedBalances,
};
use crate::domain::{day_key, DailyOpening};

const OPEN_DAY_USAGE: &str = "open-day <cash> <pos> <transfer> <gas kg> [--date=YYYY-MM-DD] [--notes=..]";
const UPDATE_OPENING_USAGE: &str =
    "update-opening <cash> <pos> <transfer> <gas kg> [--date=YYYY-MM-DD] [--notes=..]";
const CLOSE_DAY_USAGE: &str = "close-day <cash counted> <gas kg measured> [--date=YYYY-MM-DD] [--notes=..]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "balances",
            "Expected cash, POS, transfer and gas balances",
            "balances [YYYY-MM-DD]",
            Access::LoggedIn,
            cmd_balances,
        ),
        CommandEntry::new(
            "today",
            "List the day's transactions",
            "today [YYYY-MM-DD]",
            Access::LoggedIn,
            cmd_today,
        ),
        CommandEntry::new(
            "opening",
            "Show the day's opening balances",
            "opening [YYYY-MM-DD]",
            Access::LoggedIn,
            cmd_opening,
        ),
        CommandEntry::new(
            "open-day",
            "Set opening balances for a day",
            OPEN_DAY_USAGE,
            Access::Admin,
            cmd_open_day,
        ),
        CommandEntry::new(
            "update-opening",
            "Correct a day's opening balances",
            UPDATE_OPENING_USAGE,
            Access::Admin,
            cmd_update_opening,
        ),
        CommandEntry::new(
            "dashboard",
            "Fees, gas revenue, balances and service mix",
            "dashboard [YYYY-MM-DD]",
            Access::Admin,
            cmd_dashboard,
        ),
        CommandEntry::new(
            "close-day",
            "Record physical counts and show the variance",
            CLOSE_DAY_USAGE,
            Access::Admin,
            cmd_close_day,
        ),
    ]
}

fn date_arg(context: &ShellContext, args: &Args<'_>) -> Result<NaiveDate, CommandError> {
    match args.get(0) {
        Some(raw) => parse_date(raw),
        None => Ok(context.clock.today()),
    }
}

fn print_balances(context: &ShellContext, balances: &ExpectedBalances) {
    io::print_info(format!("  Cash     : {}", context.money(balances.cash)));
    io::print_info(format!("  POS      : {}", context.money(balances.pos)));
    io::print_info(format!("  Transfer : {}", context.money(balances.transfer)));
    io::print_info(format!("  Gas      : {}", kilograms(balances.gas_kg)));
}

fn cmd_balances(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let date = date_arg(context, &args)?;
    let balances = SummaryService::expected(&context.op()?, date)?;
    section(format!("Expected balances {}", day_key(date)));
    print_balances(context, &balances);
    Ok(())
}

fn cmd_today(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let date = date_arg(context, &args)?;
    let table = TransactionService::list_for_day(&context.op()?, date)?;
    if table.is_empty() {
        io::print_info(format!("No transactions for {}.", day_key(date)));
        return Ok(());
    }
    section(format!("Transactions {}", day_key(date)));
    let rows: Vec<Vec<String>> = table
        .rows()
        .map(|row| {
            let time = row.get("datetime").get(11..19).unwrap_or("").to_string();
            vec![
                time,
                row.get("category").to_string(),
                row.get("sub_type").to_string(),
                row.get("customer_method").to_string(),
                context.money(row.number("amount_value")),
                context.money(row.number("fee")),
                row.get("user").to_string(),
                row.get("id").to_string(),
            ]
        })
        .collect();
    render_table(
        &["time", "category", "detail", "method", "amount", "fee", "user", "id"],
        &rows,
    );
    io::print_info(format!("{} transaction(s).", rows.len()));
    Ok(())
}

fn cmd_opening(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let date = date_arg(context, &args)?;
    match OpeningService::get(&context.op()?, date)? {
        Some(opening) => {
            section(format!("Opening {}", day_key(date)));
            print_balances(
                context,
                &ExpectedBalances {
                    cash: opening.cash_open,
                    pos: opening.pos_open,
                    transfer: opening.transfer_open,
                    gas_kg: opening.gas_open_kg,
                },
            );
            if !opening.attendant.is_empty() {
                io::print_info(format!("  Attendant: {}", opening.attendant));
            }
            if !opening.notes.is_empty() {
                io::print_info(format!("  Notes    : {}", opening.notes));
            }
        }
        None => io::print_info(format!("{} has not been opened.", day_key(date))),
    }
    Ok(())
}

fn opening_from(
    context: &ShellContext,
    args: &Args<'_>,
    usage: &str,
) -> Result<DailyOpening, CommandError> {
    let date = args.date_option("date")?.unwrap_or_else(|| context.clock.today());
    Ok(DailyOpening {
        cash_open: parse_amount("cash", args.require(0, usage)?)?,
        pos_open: parse_amount("pos", args.require(1, usage)?)?,
        transfer_open: parse_amount("transfer", args.require(2, usage)?)?,
        gas_open_kg: parse_amount("gas kg", args.require(3, usage)?)?,
        attendant: args.option("attendant").unwrap_or("").to_string(),
        notes: args.option("notes").unwrap_or("").to_string(),
        ..DailyOpening::new(date)
    })
}

fn cmd_open_day(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let opening = opening_from(context, &args, OPEN_DAY_USAGE)?;
    let saved = OpeningService::open_day(&context.op()?, opening)?;
    io::print_success(format!("Opened {}.", day_key(saved.date)));
    Ok(())
}

fn cmd_update_opening(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let mut opening = opening_from(context, &args, UPDATE_OPENING_USAGE)?;
    if opening.attendant.is_empty() {
        opening.attendant = context
            .session
            .as_ref()
            .map(|s| s.username.clone())
            .unwrap_or_default();
    }
    let date = opening.date;
    OpeningService::update(&context.op()?, opening)?;
    io::print_success(format!("Opening for {} updated.", day_key(date)));
    Ok(())
}

fn cmd_dashboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let date = date_arg(context, &args)?;
    let summary = SummaryService::day_summary(&context.op()?, date)?;
    section(format!("Dashboard {}", day_key(date)));
    io::print_info(format!("  Transactions : {}", summary.count));
    io::print_info(format!("  Fees         : {}", context.money(summary.fees_total)));
    io::print_info(format!("  Gas revenue  : {}", context.money(summary.gas_revenue)));
    print_balances(context, &summary.balances);
    if !summary.service_mix.is_empty() {
        let rows: Vec<Vec<String>> = summary
            .service_mix
            .iter()
            .map(|(category, count)| vec![category.clone(), count.to_string()])
            .collect();
        render_table(&["service", "count"], &rows);
    }
    Ok(())
}

fn cmd_close_day(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let cash = parse_amount("cash counted", args.require(0, CLOSE_DAY_USAGE)?)?;
    let gas = parse_amount("gas measured", args.require(1, CLOSE_DAY_USAGE)?)?;
    let date = args.date_option("date")?.unwrap_or_else(|| context.clock.today());
    let notes = args.option("notes").unwrap_or("");
    let variance = ClosingService::record(&context.op()?, date, cash, gas, notes)?;
    section(format!("Closing {}", day_key(date)));
    io::print_info(format!(
        "  Cash expected {} counted {} variance {}",
        context.money(variance.expected.cash),
        context.money(variance.cash_counted),
        context.money(variance.cash_variance)
    ));
    io::print_info(format!(
        "  Gas expected {} measured {} variance {}",
        kilograms(variance.expected.gas_kg),
        kilograms(variance.gas_measured_kg),
        kilograms(variance.gas_variance_kg)
    ));
    if variance.is_balanced() {
        io::print_success("Day balances.");
    } else {
        io::print_warning("Counts differ from the ledger.");
    }
    Ok(())
}
