#![doc(test(attr(deny(warnings))))]

//! Cashflow Core projects household cash flow: when incomes are paid, when
//! bills fall due, and how an account balance moves day by day and across
//! pay periods.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod report;
pub mod schedule;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Cashflow Core tracing initialized.");
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
