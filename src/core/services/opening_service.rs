//! Start-of-day balances in `daily_openings`.

use chrono::NaiveDate;
use tracing::info;

use crate::{
    core::session::{Action, Permissions},
    domain::{day_key, DailyOpening},
    errors::OpsError,
    storage::{Sheet, Snapshot},
};

use super::{OpContext, ServiceResult};

pub struct OpeningService;

fn find(snapshot: &Snapshot, date: NaiveDate) -> Option<DailyOpening> {
    let key = day_key(date);
    snapshot
        .table(Sheet::DailyOpenings)
        .rows()
        .find(|row| row.get("date") == key)
        .and_then(|row| DailyOpening::from_row(&row))
}

fn validate(opening: &DailyOpening) -> ServiceResult<()> {
    let fields = [
        ("cash_open", opening.cash_open),
        ("pos_open", opening.pos_open),
        ("transfer_open", opening.transfer_open),
        ("gas_open_kg", opening.gas_open_kg),
    ];
    match fields
        .iter()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
    {
        Some((name, _)) => Err(OpsError::InvalidInput(format!("{name} must be zero or more"))),
        None => Ok(()),
    }
}

impl OpeningService {
    /// The opening row for `date`, if the day was opened.
    pub fn get(ctx: &OpContext<'_>, date: NaiveDate) -> ServiceResult<Option<DailyOpening>> {
        let snapshot = ctx.authorized(Action::ViewOpening)?;
        if date != ctx.today() {
            ctx.session
                .authorize(Action::ViewAnyDate, Permissions::from_snapshot(&snapshot))?;
        }
        Ok(find(&snapshot, date))
    }

    /// Appends the opening row for a day that has none yet.
    pub fn open_day(ctx: &OpContext<'_>, mut opening: DailyOpening) -> ServiceResult<DailyOpening> {
        let snapshot = ctx.authorized(Action::SetOpening)?;
        validate(&opening)?;
        if find(&snapshot, opening.date).is_some() {
            return Err(OpsError::InvalidInput(format!(
                "{} is already opened; use update instead",
                day_key(opening.date)
            )));
        }
        if opening.attendant.trim().is_empty() {
            opening.attendant = ctx.session.username.clone();
        }
        ctx.store.append(Sheet::DailyOpenings, &opening.to_record())?;
        info!(date = %day_key(opening.date), cash = opening.cash_open, "day opened");
        Ok(opening)
    }

    /// Rewrites the sheet with `opening` replacing that day's row.
    pub fn update(ctx: &OpContext<'_>, opening: DailyOpening) -> ServiceResult<()> {
        let snapshot = ctx.authorized(Action::EditOpening)?;
        validate(&opening)?;
        let key = day_key(opening.date);
        let mut table = snapshot.table(Sheet::DailyOpenings).clone();
        let index = table
            .position(|row| row.get("date") == key)
            .ok_or_else(|| OpsError::NotFound(format!("no opening recorded for {key}")))?;
        table.replace(index, &opening.to_record());
        ctx.store.overwrite(Sheet::DailyOpenings, &table)?;
        info!(date = %key, "opening updated");
        Ok(())
    }
}
