//! Income and bills attributed to pay periods instead of single days.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{Bill, Income};
use crate::schedule::PayPeriod;

use super::daily::{bills_by_date, income_by_date};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PeriodSummary {
    pub start: NaiveDate,
    /// Exclusive: the first day of the following period.
    pub end: NaiveDate,
    pub income: Decimal,
    pub bills_due: Decimal,
    pub net: Decimal,
}

/// Sums pay amounts and bill due amounts falling inside each period, sorted by
/// period start.
pub fn summarize_periods(
    periods: &[PayPeriod],
    bills: &[&Bill],
    incomes: &[&Income],
) -> Vec<PeriodSummary> {
    let mut summaries: Vec<PeriodSummary> = periods
        .iter()
        .filter(|period| period.len_days() > 0)
        .map(|period| {
            let window = period.window();
            let income: Decimal = income_by_date(incomes.iter().copied(), window)
                .values()
                .sum();
            let bills_due: Decimal = bills_by_date(bills.iter().copied(), window)
                .values()
                .sum();
            PeriodSummary {
                start: period.start,
                end: period.end,
                income,
                bills_due,
                net: income - bills_due,
            }
        })
        .collect();
    summaries.sort_by_key(|summary| summary.start);
    summaries
}
