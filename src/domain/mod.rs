//! Typed views over ledger rows.
//!
//! Everything persisted is a row of strings in a named sheet. The types here
//! give those rows names and units while keeping the raw tabular shape
//! (`Table`, `Record`) available for the aggregation code that works directly
//! on columns.

pub mod closing;
pub mod common;
pub mod fees;
pub mod opening;
pub mod table;
pub mod transaction;
pub mod user;

pub use closing::ClosingCount;
pub use common::{coerce_number, day_key, format_number, is_truthy};
pub use fees::FeeTier;
pub use opening::DailyOpening;
pub use table::{Record, RowView, Table};
pub use transaction::{Category, ChannelDeltas, PaymentMethod, TransactionRecord};
pub use user::{Role, UserRecord};
