//! Recording and listing ledger transactions.

use chrono::NaiveDate;
use tracing::info;

use crate::{
    core::{
        fees::FeeSchedule,
        recorder::{build_transaction, Memo, TransactionInput},
        session::{Action, Permissions},
    },
    domain::{day_key, Table, TransactionRecord},
    errors::OpsError,
    storage::Sheet,
};

use super::{OpContext, ServiceResult};

pub struct TransactionService;

impl TransactionService {
    /// Prices `input`, appends the row and returns what was written.
    pub fn record(
        ctx: &OpContext<'_>,
        input: &TransactionInput,
        memo: Memo,
    ) -> ServiceResult<TransactionRecord> {
        let snapshot = ctx.authorized(input.action())?;
        let schedule = FeeSchedule::from_snapshot(&snapshot);
        let record = build_transaction(input, &schedule, ctx.session, ctx.clock.now(), memo)?;
        ctx.store.append(Sheet::Transactions, &record.to_record())?;
        info!(
            id = %record.id,
            category = %record.category,
            user = %record.user,
            fee = record.fee,
            "transaction recorded"
        );
        Ok(record)
    }

    /// Rows dated `date`. Attendants only see today.
    pub fn list_for_day(ctx: &OpContext<'_>, date: NaiveDate) -> ServiceResult<Table> {
        let snapshot = ctx.authorized(Action::ViewTransactions)?;
        if date != ctx.today() {
            ctx.session
                .authorize(Action::ViewAnyDate, Permissions::from_snapshot(&snapshot))
                .map_err(|_| {
                    OpsError::Unauthorized(format!(
                        "{} may only view today's transactions",
                        ctx.session.role
                    ))
                })?;
        }
        let key = day_key(date);
        Ok(snapshot
            .table(Sheet::Transactions)
            .filtered(|row| row.get("date") == key))
    }
}
