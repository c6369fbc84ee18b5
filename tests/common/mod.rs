#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use cashflow_core::{
    config::ConfigManager,
    ledger::{Account, Bill, Income, Ledger, PaySchedule},
    storage::JsonStorage,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated storage and config backed by a unique directory for each test.
pub fn setup_test_env() -> (JsonStorage, ConfigManager) {
    let base = temp_base();
    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    let config = ConfigManager::with_base_dir(base).expect("create config manager");
    (storage, config)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Two accounts: a joint account with rent, utilities and a twice-monthly
/// salary, and a savings account with a monthly transfer in.
pub fn household_ledger() -> Ledger {
    let mut ledger = Ledger::new("Household");
    let joint = ledger.add_account(Account::new("Joint"));
    let savings = ledger.add_account(Account::new("Savings"));

    ledger.add_bill(Bill::new(joint, "Rent", "Sam", 1, dec!(1450.00)));
    ledger.add_bill(Bill::new(joint, "Power", "Alex", 18, dec!(96.40)));
    ledger.add_bill(Bill::new(joint, "Card", "Alex", 31, dec!(250.00)));
    ledger.add_income(Income::new(
        joint,
        "Salary",
        dec!(1725.35),
        PaySchedule::TwiceMonthly {
            first_day: 15,
            second_day: 30,
        },
    ));
    ledger.add_income(Income::new(
        savings,
        "Transfer",
        dec!(200),
        PaySchedule::Monthly {
            seed: date(2024, 1, 3),
        },
    ));
    ledger
}
