//! Ledger domain models, persistence-friendly types, and calendar helpers.

pub mod account;
pub mod bill;
pub mod calendar;
pub mod income;
#[allow(clippy::module_inception)]
pub mod ledger;

pub use account::Account;
pub use bill::Bill;
pub use calendar::DateWindow;
pub use income::{Income, PayFrequency, PaySchedule};
pub use ledger::{Ledger, CURRENT_SCHEMA_VERSION};
