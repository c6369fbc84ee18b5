//! Daily cash-flow projection with a running balance.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::{
    calendar::{next_month, previous_month},
    Account, Bill, DateWindow, Income,
};

/// Decimal places kept on reported balances.
pub const BALANCE_SCALE: u32 = 2;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub income: Decimal,
    pub bills: Decimal,
    pub net: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReportTotals {
    pub income: Decimal,
    pub bills: Decimal,
    pub net: Decimal,
    pub closing_balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub account_id: Uuid,
    pub account_name: String,
    pub starting_balance: Decimal,
    pub days: Vec<DailyRecord>,
}

impl AccountReport {
    pub fn totals(&self) -> ReportTotals {
        let mut totals = ReportTotals::default();
        for day in &self.days {
            totals.income += day.income;
            totals.bills += day.bills;
        }
        totals.net = totals.income - totals.bills;
        totals.closing_balance = (self.starting_balance + totals.net).round_dp(BALANCE_SCALE);
        totals
    }

    pub fn record_for(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.days.iter().find(|record| record.date == date)
    }

    /// Days whose closing balance is below zero.
    pub fn overdrawn_days(&self) -> impl Iterator<Item = &DailyRecord> {
        self.days
            .iter()
            .filter(|record| record.balance < Decimal::ZERO)
    }
}

/// Report for one calendar month across the selected accounts.
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub year: i32,
    pub month: u32,
    pub window: DateWindow,
    pub starting_balance: Decimal,
    pub accounts: Vec<AccountReport>,
    pub previous: (i32, u32),
    pub next: (i32, u32),
}

impl MonthReport {
    pub fn new(
        year: i32,
        month: u32,
        window: DateWindow,
        starting_balance: Decimal,
        accounts: Vec<AccountReport>,
    ) -> Self {
        Self {
            year,
            month,
            window,
            starting_balance,
            accounts,
            previous: previous_month(year, month),
            next: next_month(year, month),
        }
    }
}

/// Sums the pay amounts of `incomes` per pay date inside `window`.
pub fn income_by_date<'a>(
    incomes: impl IntoIterator<Item = &'a Income>,
    window: DateWindow,
) -> BTreeMap<NaiveDate, Decimal> {
    let mut totals = BTreeMap::new();
    for income in incomes {
        for date in income.pay_dates_in(window) {
            *totals.entry(date).or_insert(Decimal::ZERO) += income.amount;
        }
    }
    totals
}

/// Sums bill amounts per due date inside `window`, one occurrence per month.
pub fn bills_by_date<'a>(
    bills: impl IntoIterator<Item = &'a Bill>,
    window: DateWindow,
) -> BTreeMap<NaiveDate, Decimal> {
    let mut totals = BTreeMap::new();
    for bill in bills {
        for (year, month) in window.months() {
            match bill.due_date_in(year, month) {
                Some(due) if window.contains(due) => {
                    *totals.entry(due).or_insert(Decimal::ZERO) += bill.amount;
                }
                Some(_) => {}
                None => tracing::debug!(
                    bill = %bill.name,
                    due_day = bill.due_day,
                    year,
                    month,
                    "due day absent from month; skipping"
                ),
            }
        }
    }
    totals
}

/// Walks every day in `window`, applying income and bills to a running balance.
pub fn build_account_report<'a>(
    account: &Account,
    bills: impl IntoIterator<Item = &'a Bill>,
    incomes: impl IntoIterator<Item = &'a Income>,
    window: DateWindow,
    starting_balance: Decimal,
) -> AccountReport {
    let income_map = income_by_date(incomes, window);
    let bill_map = bills_by_date(bills, window);

    let mut balance = starting_balance;
    let days = window
        .days()
        .map(|date| {
            let income = income_map.get(&date).copied().unwrap_or(Decimal::ZERO);
            let bills = bill_map.get(&date).copied().unwrap_or(Decimal::ZERO);
            let net = income - bills;
            balance += net;
            DailyRecord {
                date,
                income,
                bills,
                net,
                balance: balance.round_dp(BALANCE_SCALE),
            }
        })
        .collect();

    AccountReport {
        account_id: account.id,
        account_name: account.name.clone(),
        starting_balance,
        days,
    }
}
