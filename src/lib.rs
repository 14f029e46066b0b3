#![doc(test(attr(deny(warnings))))]

//! Agent Ledger keeps the books of a small cash-agent and gas outlet: fee
//! schedules, transaction settlement across cash/POS/transfer/gas channels,
//! expected balances, and day opening and closing, over a sheet-shaped store.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Agent Ledger tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
