//! Calendar helpers shared by the schedule engine and the report builders.
//!
//! Every constructor here is non-clamping unless its name says otherwise: a
//! day that does not exist in a month yields `None` instead of being pulled
//! back to the month's last day.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::BudgetError;

/// Number of days in the given month, accounting for leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_next| first_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Builds `day` in the given month, or `None` when the month is too short.
pub fn date_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Moves `date` by whole months, clamping the day to the target month's length.
///
/// Only used to size horizons; pay and due dates never go through here.
/// Returns `None` when the result falls outside the representable calendar.
pub fn shift_month_clamped(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date
        .year()
        .checked_mul(12)?
        .checked_add(date.month0() as i32)?
        .checked_add(months)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Inclusive range of calendar dates `[start, end]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BudgetError> {
        if end < start {
            return Err(BudgetError::Validation(format!(
                "window end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering every day of a calendar month.
    pub fn month(year: i32, month: u32) -> Result<Self, BudgetError> {
        let start = date_in_month(year, month, 1)
            .ok_or_else(|| BudgetError::Validation(format!("invalid month {year}-{month:02}")))?;
        let end = date_in_month(year, month, days_in_month(year, month))
            .ok_or_else(|| BudgetError::Validation(format!("invalid month {year}-{month:02}")))?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every calendar day in the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |day| *day <= self.end)
    }

    /// Every `(year, month)` the window touches, in order.
    pub fn months(&self) -> MonthIter {
        MonthIter {
            current: Some((self.start.year(), self.start.month())),
            last: (self.end.year(), self.end.month()),
        }
    }
}

/// Iterator returned by [`DateWindow::months`].
#[derive(Debug, Clone)]
pub struct MonthIter {
    current: Option<(i32, u32)>,
    last: (i32, u32),
}

impl Iterator for MonthIter {
    type Item = (i32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = if current < self.last {
            Some(next_month(current.0, current.1))
        } else {
            None
        };
        Some(current)
    }
}
