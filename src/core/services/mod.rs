//! Operations the shell invokes. Each takes an explicit [`OpContext`].

pub mod closing_service;
pub mod opening_service;
pub mod pricing_service;
pub mod summary_service;
pub mod transaction_service;

pub use closing_service::{ClosingService, Variance};
pub use opening_service::OpeningService;
pub use pricing_service::{FeeKind, PricingService};
pub use summary_service::{DaySummary, SummaryService};
pub use transaction_service::TransactionService;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    errors::OpsError,
    storage::{LedgerStore, Snapshot},
};

use super::{
    clock::Clock,
    session::{Action, Permissions, Session},
};

pub type ServiceResult<T> = Result<T, OpsError>;

/// Store, clock and session an operation runs against.
#[derive(Clone, Copy)]
pub struct OpContext<'a> {
    pub store: &'a dyn LedgerStore,
    pub clock: &'a dyn Clock,
    pub session: &'a Session,
}

impl<'a> OpContext<'a> {
    pub fn new(store: &'a dyn LedgerStore, clock: &'a dyn Clock, session: &'a Session) -> Self {
        Self {
            store,
            clock,
            session,
        }
    }

    pub fn snapshot(&self) -> ServiceResult<Arc<Snapshot>> {
        self.store.read_all()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Reads the ledger and checks `action` against the session and the
    /// ledger's permission flags.
    pub fn authorized(&self, action: Action) -> ServiceResult<Arc<Snapshot>> {
        let snapshot = self.snapshot()?;
        self.session
            .authorize(action, Permissions::from_snapshot(&snapshot))?;
        Ok(snapshot)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use crate::core::clock::FixedClock;
    use crate::core::session::Session;
    use crate::domain::Role;
    use crate::storage::{LedgerStore, MemoryBackend, RetryPolicy, SheetStore};

    use super::PricingService;

    pub fn store() -> SheetStore<MemoryBackend> {
        let store = SheetStore::new(
            MemoryBackend::new(),
            Duration::from_secs(300),
            RetryPolicy::immediate(2),
        );
        store.ensure_all().unwrap();
        PricingService::seed_defaults(&store).unwrap();
        store
    }

    pub fn clock() -> FixedClock {
        FixedClock::at("2024-05-01T10:00:00+01:00").unwrap()
    }

    pub fn admin() -> Session {
        Session::new("admin", "ADMIN", Role::Admin)
    }

    pub fn attendant() -> Session {
        Session::new("attendant", "SALES", Role::Attendant)
    }
}
