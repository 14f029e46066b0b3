use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    core::{
        balance::{expected_balances, ExpectedBalances},
        session::{Action, Permissions},
    },
    domain::day_key,
    storage::{Sheet, Snapshot},
};

use super::{OpContext, ServiceResult};

/// Dashboard figures for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub count: usize,
    pub fees_total: f64,
    pub gas_revenue: f64,
    pub balances: ExpectedBalances,
    /// Category and row count, most frequent first.
    pub service_mix: Vec<(String, usize)>,
}

pub struct SummaryService;

impl SummaryService {
    /// Expected balances for `date`; identical for every role that may ask.
    pub fn expected(ctx: &OpContext<'_>, date: NaiveDate) -> ServiceResult<ExpectedBalances> {
        let snapshot = ctx.authorized(Action::ViewTransactions)?;
        if date != ctx.today() {
            ctx.session
                .authorize(Action::ViewAnyDate, Permissions::from_snapshot(&snapshot))?;
        }
        Ok(balances_for(&snapshot, date))
    }

    pub fn day_summary(ctx: &OpContext<'_>, date: NaiveDate) -> ServiceResult<DaySummary> {
        let snapshot = ctx.authorized(Action::ViewDashboard)?;
        Ok(summarize(&snapshot, date))
    }
}

pub(crate) fn balances_for(snapshot: &Snapshot, date: NaiveDate) -> ExpectedBalances {
    expected_balances(
        date,
        snapshot.table(Sheet::DailyOpenings),
        snapshot.table(Sheet::Transactions),
    )
}

fn summarize(snapshot: &Snapshot, date: NaiveDate) -> DaySummary {
    let key = day_key(date);
    let mut count = 0;
    let mut fees_total = 0.0;
    let mut gas_revenue = 0.0;
    let mut mix: BTreeMap<String, usize> = BTreeMap::new();
    for row in snapshot
        .table(Sheet::Transactions)
        .rows()
        .filter(|row| row.get("date") == key)
    {
        count += 1;
        fees_total += row.number("fee");
        if row.get("category") == "gas_sale" {
            gas_revenue += row.number("amount_value");
        }
        *mix.entry(row.get("category").to_string()).or_insert(0) += 1;
    }
    let mut service_mix: Vec<(String, usize)> = mix.into_iter().collect();
    service_mix.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    DaySummary {
        date,
        count,
        fees_total,
        gas_revenue,
        balances: balances_for(snapshot, date),
        service_mix,
    }
}
