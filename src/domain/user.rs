use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{common::is_truthy, table::RowView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Attendant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Attendant => "attendant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "attendant" => Ok(Role::Attendant),
            other => Err(format!("unknown role `{}`", other)),
        }
    }
}

/// A `config_users` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub role: Role,
    pub display_name: String,
    pub active: bool,
}

impl UserRecord {
    /// Rows with an unrecognised role are skipped.
    pub fn from_row(row: &RowView<'_>) -> Option<Self> {
        let role = row.get("role").parse().ok()?;
        Some(Self {
            username: row.get("username").trim().to_string(),
            role,
            display_name: row.get("display_name").trim().to_string(),
            active: is_truthy(row.get("active")),
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        let needle = name.trim();
        !needle.is_empty()
            && (self.username.eq_ignore_ascii_case(needle)
                || self.display_name.eq_ignore_ascii_case(needle))
    }
}
