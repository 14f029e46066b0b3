use std::fmt;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{Role, UserRecord},
    errors::OpsError,
    storage::{Sheet, Snapshot},
};

use super::settings::{flag, ATTENDANT_STOCK_IN_FLAG};

/// Something a session may try to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    RecordSale,
    RecordStockIn,
    RecordAdjustment,
    ViewTransactions,
    ViewAnyDate,
    ViewOpening,
    SetOpening,
    EditOpening,
    EditPricing,
    ViewDashboard,
    RecordClosing,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::RecordSale => "record sales",
            Action::RecordStockIn => "record gas stock-in",
            Action::RecordAdjustment => "record corrections and refunds",
            Action::ViewTransactions => "view transactions",
            Action::ViewAnyDate => "view other days",
            Action::ViewOpening => "view opening balances",
            Action::SetOpening => "set opening balances",
            Action::EditOpening => "edit opening balances",
            Action::EditPricing => "edit pricing",
            Action::ViewDashboard => "view the dashboard",
            Action::RecordClosing => "record closing counts",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ledger-driven switches that widen what attendants may do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub attendant_stock_in: bool,
}

impl Permissions {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            attendant_stock_in: flag(snapshot, ATTENDANT_STOCK_IN_FLAG, false),
        }
    }
}

/// The logged-in user. Passed explicitly to every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    pub fn new(username: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Resolves `name` against the active rows of `config_users`.
    pub fn login(snapshot: &Snapshot, name: &str) -> Result<Self, OpsError> {
        let user = snapshot
            .table(Sheet::ConfigUsers)
            .rows()
            .filter_map(|row| UserRecord::from_row(&row))
            .find(|user| user.active && user.matches(name))
            .ok_or_else(|| OpsError::Unauthorized(format!("no active user named `{}`", name.trim())))?;
        let session = Self::new(user.username, user.display_name, user.role);
        info!(user = %session.username, role = %session.role, session = %session.id, "logged in");
        Ok(session)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn can(&self, action: Action, permissions: Permissions) -> bool {
        match (self.role, action) {
            (Role::Admin, _) => true,
            (
                Role::Attendant,
                Action::RecordSale | Action::ViewTransactions | Action::ViewOpening,
            ) => true,
            (Role::Attendant, Action::RecordStockIn) => permissions.attendant_stock_in,
            (Role::Attendant, _) => false,
        }
    }

    pub fn authorize(&self, action: Action, permissions: Permissions) -> Result<(), OpsError> {
        if self.can(action, permissions) {
            Ok(())
        } else {
            Err(OpsError::Unauthorized(format!(
                "{} ({}) may not {}",
                self.username, self.role, action
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Record, Table};
    use crate::storage::schema::{PRICE_HEADERS, USER_HEADERS};

    fn users() -> Snapshot {
        let mut table = Table::new(USER_HEADERS);
        for (name, role, display, active) in [
            ("admin", "admin", "ADMIN", "1"),
            ("attendant", "attendant", "SALES", "TRUE"),
            ("former", "attendant", "Old Hand", "0"),
        ] {
            table.push(
                &Record::new()
                    .with("username", name)
                    .with("role", role)
                    .with("display_name", display)
                    .with("active", active),
            );
        }
        Snapshot::empty().with(Sheet::ConfigUsers, table)
    }

    #[test]
    fn login_matches_username_or_display_name() {
        let snapshot = users();
        assert_eq!(Session::login(&snapshot, "ADMIN").unwrap().role, Role::Admin);
        let sales = Session::login(&snapshot, "sales").unwrap();
        assert_eq!(sales.username, "attendant");
        assert_eq!(sales.role, Role::Attendant);
    }

    #[test]
    fn inactive_or_unknown_users_are_refused() {
        let snapshot = users();
        assert!(matches!(Session::login(&snapshot, "former"), Err(OpsError::Unauthorized(_))));
        assert!(matches!(Session::login(&snapshot, "ghost"), Err(OpsError::Unauthorized(_))));
        assert!(matches!(Session::login(&snapshot, "  "), Err(OpsError::Unauthorized(_))));
    }

    #[test]
    fn attendant_scope() {
        let attendant = Session::new("attendant", "SALES", Role::Attendant);
        let none = Permissions::default();
        assert!(attendant.can(Action::RecordSale, none));
        assert!(attendant.can(Action::ViewOpening, none));
        for action in [
            Action::ViewAnyDate,
            Action::SetOpening,
            Action::EditOpening,
            Action::EditPricing,
            Action::RecordAdjustment,
            Action::ViewDashboard,
            Action::RecordClosing,
            Action::RecordStockIn,
        ] {
            assert!(matches!(
                attendant.authorize(action, none),
                Err(OpsError::Unauthorized(_))
            ));
        }
    }

    #[test]
    fn stock_in_flag_opens_stock_in_for_attendants() {
        let mut prices = Table::new(PRICE_HEADERS);
        prices.push(
            &Record::new()
                .with("key", ATTENDANT_STOCK_IN_FLAG)
                .with("value", "1.0"),
        );
        let snapshot = Snapshot::empty().with(Sheet::ConfigPrices, prices);
        let permissions = Permissions::from_snapshot(&snapshot);
        assert!(permissions.attendant_stock_in);

        let attendant = Session::new("attendant", "SALES", Role::Attendant);
        assert!(attendant.authorize(Action::RecordStockIn, permissions).is_ok());
        assert!(attendant.authorize(Action::RecordClosing, permissions).is_err());
    }
}
