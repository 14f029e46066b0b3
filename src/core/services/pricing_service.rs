//! Gas price, feature flags and the four fee tables.

use std::{fmt, str::FromStr};

use tracing::{info, warn};

use crate::{
    core::{
        fees::{overlapping_tiers, tiers_from_table},
        session::Action,
        settings::{self, GAS_PRICE_KEY},
    },
    domain::{format_number, FeeTier, Record, Table},
    errors::OpsError,
    storage::{LedgerStore, Sheet, Snapshot},
};

use super::{OpContext, ServiceResult};

/// Which fee table a change targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeKind {
    Withdrawal,
    Deposit,
    Bill,
    Charging,
}

impl FeeKind {
    pub const ALL: [FeeKind; 4] = [
        FeeKind::Withdrawal,
        FeeKind::Deposit,
        FeeKind::Bill,
        FeeKind::Charging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeKind::Withdrawal => "withdrawal",
            FeeKind::Deposit => "deposit",
            FeeKind::Bill => "bill",
            FeeKind::Charging => "charging",
        }
    }

    pub fn sheet(&self) -> Sheet {
        match self {
            FeeKind::Withdrawal => Sheet::FeesWithdrawal,
            FeeKind::Deposit => Sheet::FeesDeposit,
            FeeKind::Bill => Sheet::FeesBill,
            FeeKind::Charging => Sheet::FeesCharging,
        }
    }

    pub fn is_tiered(&self) -> bool {
        matches!(self, FeeKind::Withdrawal | FeeKind::Deposit)
    }

    /// Name column of a fixed-fee table.
    pub fn key_column(&self) -> Option<&'static str> {
        match self {
            FeeKind::Bill => Some("bill_type"),
            FeeKind::Charging => Some("category"),
            FeeKind::Withdrawal | FeeKind::Deposit => None,
        }
    }
}

impl fmt::Display for FeeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        FeeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| format!("unknown fee table `{}`", s))
    }
}

const DEFAULT_TIERS: [(f64, f64, f64); 3] = [
    (500.0, 5000.0, 100.0),
    (5000.01, 10000.0, 200.0),
    (10000.01, 20000.0, 300.0),
];
const DEFAULT_BILLS: [&str; 2] = ["Electricity", "Cable"];
const DEFAULT_CHARGING: [&str; 3] = ["Small phones & gadgets", "Powerbank", "Laptop / Heavy devices"];
const DEFAULT_USERS: [(&str, &str, &str); 2] = [
    ("admin", "admin", "ADMIN"),
    ("attendant", "attendant", "SALES"),
];

fn check_amount(label: &str, value: f64) -> ServiceResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OpsError::InvalidInput(format!("{label} must be zero or more")))
    }
}

/// `table` with the row whose `key_column` matches `key` set to `record`,
/// or `record` appended when no row matches.
fn upsert(table: &Table, key_column: &str, key: &str, record: &Record) -> Table {
    let mut out = table.clone();
    let needle = key.to_lowercase();
    match out.position(|row| row.get(key_column).to_lowercase() == needle) {
        Some(index) => {
            out.replace(index, record);
        }
        None => out.push(record),
    }
    out
}

fn default_table(sheet: Sheet) -> Table {
    let mut table = Table::new(sheet.headers());
    match sheet {
        Sheet::ConfigUsers => {
            for (username, role, display_name) in DEFAULT_USERS {
                table.push(
                    &Record::new()
                        .with("username", username)
                        .with("role", role)
                        .with("display_name", display_name)
                        .with("active", "1"),
                );
            }
        }
        Sheet::ConfigPrices => {
            table.push(&Record::new().with("key", GAS_PRICE_KEY).with("value", "0"));
        }
        Sheet::FeesWithdrawal | Sheet::FeesDeposit => {
            for (min, max, fee) in DEFAULT_TIERS {
                table.push(&FeeTier::new(min, max, fee).to_record());
            }
        }
        Sheet::FeesBill => {
            for name in DEFAULT_BILLS {
                table.push(&Record::new().with("bill_type", name).with("fee", "0"));
            }
        }
        Sheet::FeesCharging => {
            for name in DEFAULT_CHARGING {
                table.push(&Record::new().with("category", name).with("fee", "0"));
            }
        }
        Sheet::DailyOpenings | Sheet::Transactions | Sheet::ClosingCounts => {}
    }
    table
}

pub struct PricingService;

impl PricingService {
    pub fn price(snapshot: &Snapshot, key: &str, default: f64) -> f64 {
        settings::price(snapshot, key, default)
    }

    pub fn gas_price(snapshot: &Snapshot) -> f64 {
        settings::price(snapshot, GAS_PRICE_KEY, 0.0)
    }

    pub fn flag(snapshot: &Snapshot, key: &str, default: bool) -> bool {
        settings::flag(snapshot, key, default)
    }

    pub fn set_price(ctx: &OpContext<'_>, key: &str, value: f64) -> ServiceResult<()> {
        check_amount(key, value)?;
        Self::set_value(ctx, key, &format_number(value))
    }

    /// Stores the flag as "1" or "0".
    pub fn set_flag(ctx: &OpContext<'_>, key: &str, on: bool) -> ServiceResult<()> {
        Self::set_value(ctx, key, if on { "1" } else { "0" })
    }

    fn set_value(ctx: &OpContext<'_>, key: &str, value: &str) -> ServiceResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(OpsError::InvalidInput("setting key is required".into()));
        }
        let snapshot = ctx.authorized(Action::EditPricing)?;
        let current = snapshot.table(Sheet::ConfigPrices);
        let record = Record::new().with("key", key).with("value", value);
        let mut table = current.clone();
        match current.position(|row| row.get("key") == key) {
            Some(index) => {
                table.replace(index, &record);
            }
            None => table.push(&record),
        }
        ctx.store.overwrite(Sheet::ConfigPrices, &table)?;
        info!(key, value, "setting saved");
        Ok(())
    }

    pub fn fee_table(snapshot: &Snapshot, kind: FeeKind) -> Table {
        snapshot.table(kind.sheet()).clone()
    }

    pub fn replace_tiers(ctx: &OpContext<'_>, kind: FeeKind, tiers: &[FeeTier]) -> ServiceResult<()> {
        if !kind.is_tiered() {
            return Err(OpsError::InvalidInput(format!("{kind} fees are not tiered")));
        }
        for tier in tiers {
            check_amount("min_amount", tier.min_amount)?;
            check_amount("max_amount", tier.max_amount)?;
            check_amount("fee", tier.fee)?;
            if tier.min_amount > tier.max_amount {
                return Err(OpsError::InvalidInput(format!(
                    "tier {}..{} has min above max",
                    tier.min_amount, tier.max_amount
                )));
            }
        }
        ctx.authorized(Action::EditPricing)?;
        let overlaps = overlapping_tiers(tiers);
        if !overlaps.is_empty() {
            warn!(kind = %kind, count = overlaps.len(), "fee tiers overlap; lowest tier wins");
        }
        let mut table = Table::new(kind.sheet().headers());
        for tier in tiers {
            table.push(&tier.to_record());
        }
        ctx.store.overwrite(kind.sheet(), &table)?;
        info!(kind = %kind, tiers = tiers.len(), "fee tiers replaced");
        Ok(())
    }

    /// Adds or updates one tier with exactly this range.
    pub fn set_tier(ctx: &OpContext<'_>, kind: FeeKind, tier: FeeTier) -> ServiceResult<()> {
        let snapshot = ctx.authorized(Action::EditPricing)?;
        let mut tiers = tiers_from_table(snapshot.table(kind.sheet()));
        match tiers
            .iter_mut()
            .find(|t| t.min_amount == tier.min_amount && t.max_amount == tier.max_amount)
        {
            Some(existing) => existing.fee = tier.fee,
            None => tiers.push(tier),
        }
        Self::replace_tiers(ctx, kind, &tiers)
    }

    pub fn replace_fixed(ctx: &OpContext<'_>, kind: FeeKind, rows: &[(String, f64)]) -> ServiceResult<()> {
        let key_column = kind
            .key_column()
            .ok_or_else(|| OpsError::InvalidInput(format!("{kind} fees are tiered")))?;
        for (name, fee) in rows {
            if name.trim().is_empty() {
                return Err(OpsError::InvalidInput(format!("{key_column} is required")));
            }
            check_amount("fee", *fee)?;
        }
        ctx.authorized(Action::EditPricing)?;
        let mut table = Table::new(kind.sheet().headers());
        for (name, fee) in rows {
            table.push(
                &Record::new()
                    .with(key_column, name.trim())
                    .with("fee", format_number(*fee)),
            );
        }
        ctx.store.overwrite(kind.sheet(), &table)?;
        info!(kind = %kind, rows = rows.len(), "fixed fees replaced");
        Ok(())
    }

    /// Adds or updates one fixed fee, matching the name case-insensitively.
    pub fn set_fixed(ctx: &OpContext<'_>, kind: FeeKind, name: &str, fee: f64) -> ServiceResult<()> {
        let key_column = kind
            .key_column()
            .ok_or_else(|| OpsError::InvalidInput(format!("{kind} fees are tiered")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(OpsError::InvalidInput(format!("{key_column} is required")));
        }
        check_amount("fee", fee)?;
        let snapshot = ctx.authorized(Action::EditPricing)?;
        let record = Record::new()
            .with(key_column, name)
            .with("fee", format_number(fee));
        let table = upsert(snapshot.table(kind.sheet()), key_column, name, &record);
        ctx.store.overwrite(kind.sheet(), &table)?;
        info!(kind = %kind, name, fee, "fixed fee saved");
        Ok(())
    }

    /// Writes the stock configuration into every config sheet that has no
    /// data rows. Returns the sheets it filled.
    pub fn seed_defaults(store: &dyn LedgerStore) -> ServiceResult<Vec<Sheet>> {
        let snapshot = store.read_all()?;
        let mut seeded = Vec::new();
        for sheet in [
            Sheet::ConfigUsers,
            Sheet::ConfigPrices,
            Sheet::FeesWithdrawal,
            Sheet::FeesDeposit,
            Sheet::FeesBill,
            Sheet::FeesCharging,
        ] {
            if snapshot.table(sheet).is_empty() {
                store.overwrite(sheet, &default_table(sheet))?;
                seeded.push(sheet);
            }
        }
        if !seeded.is_empty() {
            info!(sheets = seeded.len(), "default configuration seeded");
        }
        Ok(seeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::test_support::{admin, attendant, clock, store};
    use crate::core::fees::{bill_fee, tier_fee};

    #[test]
    fn defaults_are_seeded_once() {
        let store = store();
        let snapshot = store.read_all().unwrap();
        assert_eq!(tier_fee(5000.0, snapshot.table(Sheet::FeesWithdrawal)), 100.0);
        assert_eq!(tier_fee(15000.0, snapshot.table(Sheet::FeesDeposit)), 300.0);
        assert_eq!(snapshot.table(Sheet::FeesCharging).len(), 3);
        assert_eq!(PricingService::gas_price(&snapshot), 0.0);
        assert!(PricingService::seed_defaults(&store).unwrap().is_empty());
    }

    #[test]
    fn admin_edits_prices_and_flags() {
        let store = store();
        let clock = clock();
        let session = admin();
        let ctx = OpContext::new(&store, &clock, &session);

        PricingService::set_price(&ctx, GAS_PRICE_KEY, 1150.0).unwrap();
        PricingService::set_flag(&ctx, "allow_attendant_stock_in_today", true).unwrap();
        let snapshot = store.read_all().unwrap();
        assert_eq!(PricingService::gas_price(&snapshot), 1150.0);
        assert!(PricingService::flag(&snapshot, "allow_attendant_stock_in_today", false));
        assert_eq!(snapshot.table(Sheet::ConfigPrices).len(), 2);
    }

    #[test]
    fn attendants_cannot_edit_pricing() {
        let store = store();
        let clock = clock();
        let session = attendant();
        let ctx = OpContext::new(&store, &clock, &session);
        assert!(matches!(
            PricingService::set_price(&ctx, GAS_PRICE_KEY, 900.0),
            Err(OpsError::Unauthorized(_))
        ));
    }

    #[test]
    fn tiers_are_validated_and_replaced() {
        let store = store();
        let clock = clock();
        let session = admin();
        let ctx = OpContext::new(&store, &clock, &session);

        assert!(matches!(
            PricingService::replace_tiers(&ctx, FeeKind::Withdrawal, &[FeeTier::new(10.0, 5.0, 1.0)]),
            Err(OpsError::InvalidInput(_))
        ));
        assert!(PricingService::replace_tiers(&ctx, FeeKind::Bill, &[]).is_err());

        PricingService::set_tier(&ctx, FeeKind::Withdrawal, FeeTier::new(500.0, 5000.0, 150.0)).unwrap();
        let snapshot = store.read_all().unwrap();
        let table = PricingService::fee_table(&snapshot, FeeKind::Withdrawal);
        assert_eq!(table.len(), 3);
        assert_eq!(tier_fee(3000.0, &table), 150.0);
    }

    #[test]
    fn fixed_fees_upsert_case_insensitively() {
        let store = store();
        let clock = clock();
        let session = admin();
        let ctx = OpContext::new(&store, &clock, &session);

        PricingService::set_fixed(&ctx, FeeKind::Bill, "cable", 100.0).unwrap();
        PricingService::set_fixed(&ctx, FeeKind::Bill, "Water", 50.0).unwrap();
        let snapshot = store.read_all().unwrap();
        let bills = snapshot.table(Sheet::FeesBill);
        assert_eq!(bills.len(), 3);
        assert_eq!(bill_fee("CABLE", bills), 100.0);
        assert_eq!(bill_fee("water", bills), 50.0);

        PricingService::replace_fixed(&ctx, FeeKind::Bill, &[("Internet".into(), 25.0)]).unwrap();
        let snapshot = store.read_all().unwrap();
        assert_eq!(snapshot.table(Sheet::FeesBill).len(), 1);
        assert!(PricingService::replace_fixed(&ctx, FeeKind::Deposit, &[]).is_err());
    }
}
