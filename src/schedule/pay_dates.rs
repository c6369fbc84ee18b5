//! Pay-date enumeration for every supported cadence.

use chrono::{Datelike, Duration, NaiveDate};

use crate::ledger::{calendar::date_in_month, DateWindow, Income, PaySchedule};

/// Dates reached by stepping a fixed number of days from a seed, limited to a window.
///
/// The sequence starts at the first stepped date on or after the window start
/// (the seed itself when the seed lies inside or after the window) and ends at
/// the last stepped date on or before the window end. Clone it to replay the
/// sequence from the beginning.
#[derive(Debug, Clone)]
pub struct IntervalPayDates {
    next: Option<NaiveDate>,
    step: Duration,
    end: NaiveDate,
}

impl IntervalPayDates {
    pub fn new(seed: NaiveDate, step_days: i64, window: DateWindow) -> Self {
        let step_days = step_days.max(1);
        Self {
            next: Some(first_on_or_after(seed, step_days, window.start)),
            step: Duration::days(step_days),
            end: window.end,
        }
    }
}

impl Iterator for IntervalPayDates {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.take()?;
        if current > self.end {
            return None;
        }
        self.next = current.checked_add_signed(self.step);
        Some(current)
    }
}

/// Steps `seed` forward by whole intervals until it reaches `start`. Seeds that
/// are already on or after `start` are returned unchanged, never stepped back.
fn first_on_or_after(seed: NaiveDate, step_days: i64, start: NaiveDate) -> NaiveDate {
    if seed >= start {
        return seed;
    }
    let gap = (start - seed).num_days();
    let steps = (gap + step_days - 1) / step_days;
    seed + Duration::days(steps * step_days)
}

/// Dates in `window` that fall on any of `days`, one candidate per day per month.
/// Days that do not exist in a month are skipped for that month.
fn fixed_day_dates(window: DateWindow, days: &[u32]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for (year, month) in window.months() {
        for &day in days {
            match date_in_month(year, month, day) {
                Some(date) if window.contains(date) => dates.push(date),
                Some(_) => {}
                None => tracing::debug!(year, month, day, "pay day absent from month; skipping"),
            }
        }
    }
    dates
}

/// Every pay date the schedule produces inside `window`, sorted ascending.
pub fn pay_dates_in(schedule: &PaySchedule, window: DateWindow) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = match *schedule {
        PaySchedule::Weekly { seed } => IntervalPayDates::new(seed, 7, window).collect(),
        PaySchedule::Biweekly { seed } => IntervalPayDates::new(seed, 14, window).collect(),
        PaySchedule::Monthly { seed } => fixed_day_dates(window, &[seed.day()]),
        PaySchedule::TwiceMonthly {
            first_day,
            second_day,
        } => fixed_day_dates(window, &[first_day, second_day]),
    };
    dates.sort_unstable();
    dates
}

impl Income {
    pub fn pay_dates_in(&self, window: DateWindow) -> Vec<NaiveDate> {
        let dates = pay_dates_in(&self.schedule, window);
        tracing::debug!(
            income = %self.name,
            frequency = %self.frequency(),
            count = dates.len(),
            "enumerated pay dates"
        );
        dates
    }
}
