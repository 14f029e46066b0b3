//! Fee lookup, balance derivation, settlement and the services built on them.

pub mod balance;
pub mod clock;
pub mod fees;
pub mod recorder;
pub mod services;
pub mod session;
pub mod settings;

pub use balance::{expected_balances, ExpectedBalances};
pub use clock::{Clock, FixedClock, SystemClock};
pub use fees::{fixed_fee, tier_fee, FeeSchedule};
pub use recorder::{build_transaction, AdjustmentKind, Memo, TransactionInput};
pub use services::OpContext;
pub use session::{Action, Permissions, Session};
