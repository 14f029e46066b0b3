//! End-of-day physical counts and their variance against expectations.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    core::{balance::ExpectedBalances, session::Action},
    domain::{day_key, ClosingCount},
    errors::OpsError,
    storage::Sheet,
};

use super::{summary_service::balances_for, OpContext, ServiceResult};

const TOLERANCE: f64 = 0.005;

/// Counted minus expected, per counted channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variance {
    pub date: NaiveDate,
    pub expected: ExpectedBalances,
    pub cash_counted: f64,
    pub gas_measured_kg: f64,
    pub cash_variance: f64,
    pub gas_variance_kg: f64,
}

impl Variance {
    pub fn is_balanced(&self) -> bool {
        self.cash_variance.abs() < TOLERANCE && self.gas_variance_kg.abs() < TOLERANCE
    }
}

pub struct ClosingService;

impl ClosingService {
    pub fn record(
        ctx: &OpContext<'_>,
        date: NaiveDate,
        cash_counted: f64,
        gas_measured_kg: f64,
        notes: &str,
    ) -> ServiceResult<Variance> {
        for (label, value) in [("cash counted", cash_counted), ("gas measured", gas_measured_kg)] {
            if !value.is_finite() || value < 0.0 {
                return Err(OpsError::InvalidInput(format!("{label} must be zero or more")));
            }
        }
        let snapshot = ctx.authorized(Action::RecordClosing)?;
        let expected = balances_for(&snapshot, date);
        let count = ClosingCount {
            date,
            cash_counted,
            gas_measured_kg,
            notes: notes.trim().to_string(),
        };
        ctx.store.append(Sheet::ClosingCounts, &count.to_record())?;

        let variance = Variance {
            date,
            expected,
            cash_counted,
            gas_measured_kg,
            cash_variance: cash_counted - expected.cash,
            gas_variance_kg: gas_measured_kg - expected.gas_kg,
        };
        if variance.is_balanced() {
            info!(date = %day_key(date), "day closed balanced");
        } else {
            warn!(
                date = %day_key(date),
                cash = variance.cash_variance,
                gas_kg = variance.gas_variance_kg,
                "day closed with variance"
            );
        }
        Ok(variance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::Clock;
    use crate::core::services::test_support::{admin, attendant, clock, store};
    use crate::core::services::OpeningService;
    use crate::domain::DailyOpening;
    use crate::storage::LedgerStore;

    #[test]
    fn variance_is_counted_minus_expected() {
        let store = store();
        let clock = clock();
        let session = admin();
        let ctx = OpContext::new(&store, &clock, &session);
        OpeningService::open_day(
            &ctx,
            DailyOpening {
                cash_open: 5000.0,
                gas_open_kg: 20.0,
                ..DailyOpening::new(clock.today())
            },
        )
        .unwrap();

        let variance = ClosingService::record(&ctx, clock.today(), 4800.0, 20.0, "short").unwrap();
        assert_eq!(variance.cash_variance, -200.0);
        assert_eq!(variance.gas_variance_kg, 0.0);
        assert!(!variance.is_balanced());

        let rows = store.read_all().unwrap();
        let closing = rows.table(Sheet::ClosingCounts);
        assert_eq!(closing.len(), 1);
        assert_eq!(closing.rows().next().unwrap().get("notes"), "short");
    }

    #[test]
    fn attendants_cannot_close() {
        let store = store();
        let clock = clock();
        let session = attendant();
        let ctx = OpContext::new(&store, &clock, &session);
        assert!(matches!(
            ClosingService::record(&ctx, clock.today(), 0.0, 0.0, ""),
            Err(OpsError::Unauthorized(_))
        ));
    }
}
