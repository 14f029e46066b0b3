use crate::cli::core::{parse_amount, parse_switch, Args, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section};
use crate::cli::registry::{Access, CommandEntry};
use crate::core::{
    fees::tiers_from_table,
    services::{FeeKind, PricingService},
    settings::config_value,
};
use crate::domain::FeeTier;
use crate::storage::Sheet;

const PRICE_USAGE: &str = "price [key] [value]";
const FLAG_USAGE: &str = "flag <key> [on|off]";
const FEES_USAGE: &str = "fees <withdrawal|deposit|bill|charging>";
const SET_TIER_USAGE: &str = "set-tier <withdrawal|deposit> <min> <max> <fee>";
const SET_FIXED_USAGE: &str = "set-fixed <bill|charging> <name> <fee>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "price",
            "Show settings, or set a numeric one",
            PRICE_USAGE,
            Access::LoggedIn,
            cmd_price,
        ),
        CommandEntry::new(
            "flag",
            "Show or switch a feature flag",
            FLAG_USAGE,
            Access::LoggedIn,
            cmd_flag,
        ),
        CommandEntry::new("fees", "Show a fee table", FEES_USAGE, Access::LoggedIn, cmd_fees),
        CommandEntry::new(
            "set-tier",
            "Add or change a withdrawal/deposit fee tier",
            SET_TIER_USAGE,
            Access::Admin,
            cmd_set_tier,
        ),
        CommandEntry::new(
            "set-fixed",
            "Add or change a bill or charging fee",
            SET_FIXED_USAGE,
            Access::Admin,
            cmd_set_fixed,
        ),
    ]
}

fn fee_kind(raw: &str) -> Result<FeeKind, CommandError> {
    raw.parse().map_err(CommandError::InvalidArguments)
}

fn cmd_price(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    match (args.get(0), args.get(1)) {
        (Some(key), Some(raw)) => {
            let value = parse_amount(key, raw)?;
            PricingService::set_price(&context.op()?, key, value)?;
            io::print_success(format!("{key} set to {raw}."));
        }
        (Some(key), None) => {
            let snapshot = context.store.read_all()?;
            match config_value(&snapshot, key) {
                Some(value) => io::print_info(format!("{key} = {value}")),
                None => io::print_info(format!("{key} is not set.")),
            }
        }
        _ => {
            let snapshot = context.store.read_all()?;
            let rows: Vec<Vec<String>> = snapshot
                .table(Sheet::ConfigPrices)
                .rows()
                .map(|row| vec![row.get("key").to_string(), row.get("value").to_string()])
                .collect();
            section("Settings");
            render_table(&["key", "value"], &rows);
        }
    }
    Ok(())
}

fn cmd_flag(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let key = args.require(0, FLAG_USAGE)?;
    match args.get(1) {
        Some(raw) => {
            let on = parse_switch(raw)?;
            PricingService::set_flag(&context.op()?, key, on)?;
            io::print_success(format!("{key} is now {}.", if on { "on" } else { "off" }));
        }
        None => {
            let snapshot = context.store.read_all()?;
            let on = PricingService::flag(&snapshot, key, false);
            io::print_info(format!("{key} is {}.", if on { "on" } else { "off" }));
        }
    }
    Ok(())
}

fn cmd_fees(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let kind = fee_kind(args.require(0, FEES_USAGE)?)?;
    let snapshot = context.store.read_all()?;
    let table = PricingService::fee_table(&snapshot, kind);
    section(format!("{kind} fees"));
    if kind.is_tiered() {
        let mut tiers = tiers_from_table(&table);
        tiers.sort_by(|a, b| a.min_amount.total_cmp(&b.min_amount));
        let rows: Vec<Vec<String>> = tiers
            .iter()
            .map(|tier| {
                vec![
                    context.money(tier.min_amount),
                    context.money(tier.max_amount),
                    context.money(tier.fee),
                ]
            })
            .collect();
        render_table(&["from", "to", "fee"], &rows);
    } else {
        let key_column = kind.key_column().unwrap_or("name");
        let rows: Vec<Vec<String>> = table
            .rows()
            .map(|row| vec![row.get(key_column).to_string(), context.money(row.number("fee"))])
            .collect();
        render_table(&[key_column, "fee"], &rows);
    }
    Ok(())
}

fn cmd_set_tier(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let kind = fee_kind(args.require(0, SET_TIER_USAGE)?)?;
    let tier = FeeTier::new(
        parse_amount("min", args.require(1, SET_TIER_USAGE)?)?,
        parse_amount("max", args.require(2, SET_TIER_USAGE)?)?,
        parse_amount("fee", args.require(3, SET_TIER_USAGE)?)?,
    );
    PricingService::set_tier(&context.op()?, kind, tier)?;
    io::print_success(format!(
        "{kind} tier {}..{} now charges {}.",
        context.money(tier.min_amount),
        context.money(tier.max_amount),
        context.money(tier.fee)
    ));
    Ok(())
}

fn cmd_set_fixed(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args);
    let kind = fee_kind(args.require(0, SET_FIXED_USAGE)?)?;
    let name = args.require(1, SET_FIXED_USAGE)?;
    let fee = parse_amount("fee", args.require(2, SET_FIXED_USAGE)?)?;
    PricingService::set_fixed(&context.op()?, kind, name, fee)?;
    io::print_success(format!("{kind} fee for {name} is now {}.", context.money(fee)));
    Ok(())
}
