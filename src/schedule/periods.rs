//! Partitioning of a rolling horizon into pay periods.
//!
//! Periods are half-open spans `[start, end)`: a date on a boundary belongs to
//! the period that starts there, so every date in the horizon lands in exactly
//! one period.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::BudgetError;
use crate::ledger::{
    calendar::{first_of_month, shift_month_clamped},
    DateWindow, PaySchedule,
};

use super::pay_dates::pay_dates_in;

pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// How far outside the horizon to search for the pay dates that bound the
/// first and last twice-monthly periods. A configured day can be missing from
/// at most two consecutive months.
const BOUNDARY_SEARCH_MONTHS: i32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PayPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Final calendar day inside the period.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start).max(self.start)
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The period as an inclusive window, for reuse with the pay-date enumerator.
    pub fn window(&self) -> DateWindow {
        DateWindow {
            start: self.start,
            end: self.last_day(),
        }
    }
}

/// Splits `[from, from + horizon_months)` into consecutive pay periods.
///
/// The first period is the one containing `from`; the last one is the first
/// whose end reaches the horizon end.
pub fn partition_periods(
    schedule: &PaySchedule,
    from: NaiveDate,
    horizon_months: u32,
) -> Result<Vec<PayPeriod>, BudgetError> {
    if horizon_months == 0 {
        return Err(BudgetError::Validation(
            "period horizon must cover at least one month".into(),
        ));
    }
    schedule.validate()?;
    let horizon_end = i32::try_from(horizon_months)
        .ok()
        .and_then(|months| shift_month_clamped(from, months))
        .ok_or_else(|| {
            BudgetError::Validation(format!(
                "period horizon of {horizon_months} months from {from} is out of range"
            ))
        })?;

    let periods = match *schedule {
        PaySchedule::Weekly { seed } => interval_periods(seed, 7, from, horizon_end)?,
        PaySchedule::Biweekly { seed } => interval_periods(seed, 14, from, horizon_end)?,
        PaySchedule::Monthly { .. } => calendar_month_periods(from, horizon_end)?,
        PaySchedule::TwiceMonthly { .. } => pay_date_periods(schedule, from, horizon_end)?,
    };

    tracing::debug!(
        frequency = %schedule.frequency(),
        %from,
        %horizon_end,
        count = periods.len(),
        "partitioned pay periods"
    );
    Ok(periods)
}

/// Latest date on the seed's stepping grid that is on or before `reference`.
/// The grid extends before the seed as well as after it.
fn cycle_start_linear(anchor: NaiveDate, reference: NaiveDate, interval_days: i64) -> NaiveDate {
    let diff = reference - anchor;
    let steps = diff.num_days().div_euclid(interval_days);
    anchor + Duration::days(steps * interval_days)
}

fn interval_periods(
    seed: NaiveDate,
    interval_days: i64,
    from: NaiveDate,
    horizon_end: NaiveDate,
) -> Result<Vec<PayPeriod>, BudgetError> {
    let step = Duration::days(interval_days);
    let mut start = cycle_start_linear(seed, from, interval_days);
    let mut periods = Vec::new();
    while start < horizon_end {
        let end = start
            .checked_add_signed(step)
            .ok_or_else(|| out_of_range(start))?;
        periods.push(PayPeriod { start, end });
        start = end;
    }
    Ok(periods)
}

fn calendar_month_periods(
    from: NaiveDate,
    horizon_end: NaiveDate,
) -> Result<Vec<PayPeriod>, BudgetError> {
    let mut start = first_of_month(from);
    let mut periods = Vec::new();
    while start < horizon_end {
        let end = shift_month_clamped(start, 1).ok_or_else(|| out_of_range(start))?;
        periods.push(PayPeriod { start, end });
        start = end;
    }
    Ok(periods)
}

fn out_of_range(date: NaiveDate) -> BudgetError {
    BudgetError::Validation(format!("pay periods around {date} exceed the supported calendar"))
}

/// Periods bounded by consecutive enumerated pay dates, so boundaries follow
/// the same non-clamping rule as the pay dates themselves.
fn pay_date_periods(
    schedule: &PaySchedule,
    from: NaiveDate,
    horizon_end: NaiveDate,
) -> Result<Vec<PayPeriod>, BudgetError> {
    let search = DateWindow::new(
        shift_month_clamped(from, -BOUNDARY_SEARCH_MONTHS).ok_or_else(|| out_of_range(from))?,
        shift_month_clamped(horizon_end, BOUNDARY_SEARCH_MONTHS)
            .ok_or_else(|| out_of_range(horizon_end))?,
    )?;
    let dates = pay_dates_in(schedule, search);
    let first = dates.iter().rposition(|date| *date <= from).ok_or_else(|| {
        BudgetError::Validation(format!("schedule produces no pay date on or before {from}"))
    })?;

    let periods: Vec<PayPeriod> = dates[first..]
        .windows(2)
        .map(|pair| PayPeriod {
            start: pair[0],
            end: pair[1],
        })
        .take_while(|period| period.start < horizon_end)
        .collect();

    match periods.last() {
        Some(last) if last.end >= horizon_end => Ok(periods),
        _ => Err(BudgetError::Validation(format!(
            "schedule produces no pay date on or after {horizon_end}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_contiguous(periods: &[PayPeriod]) {
        for pair in periods.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap between {pair:?}");
        }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let schedule = PaySchedule::Monthly {
            seed: date(2024, 1, 1),
        };
        assert!(partition_periods(&schedule, date(2024, 1, 1), 0).is_err());
    }

    #[test]
    fn oversized_horizon_is_rejected() {
        let schedule = PaySchedule::Monthly {
            seed: date(2024, 1, 1),
        };
        for horizon in [u32::MAX, i32::MAX as u32 + 1, 4_000_000] {
            let err = partition_periods(&schedule, date(2024, 1, 1), horizon)
                .expect_err("horizon beyond the calendar must fail");
            assert!(matches!(err, BudgetError::Validation(_)), "unexpected error: {err:?}");
        }
    }

    #[test]
    fn biweekly_periods_align_to_seed_grid() {
        let schedule = PaySchedule::Biweekly {
            seed: date(2024, 1, 5),
        };
        let periods = partition_periods(&schedule, date(2024, 1, 10), 1).unwrap();
        assert_eq!(periods[0].start, date(2024, 1, 5));
        assert_eq!(periods[0].end, date(2024, 1, 19));
        assert!(periods.iter().all(|period| period.len_days() == 14));
        assert!(periods.last().unwrap().end >= date(2024, 2, 10));
        assert_contiguous(&periods);
    }

    #[test]
    fn weekly_periods_extend_before_seed() {
        let schedule = PaySchedule::Weekly {
            seed: date(2024, 3, 15),
        };
        let periods = partition_periods(&schedule, date(2024, 3, 1), 1).unwrap();
        assert_eq!(periods[0].start, date(2024, 3, 1));
        assert!(periods.iter().any(|period| period.start == date(2024, 3, 15)));
    }

    #[test]
    fn monthly_periods_are_calendar_months() {
        let schedule = PaySchedule::Monthly {
            seed: date(2024, 1, 20),
        };
        let periods = partition_periods(&schedule, date(2024, 1, 1), 12).unwrap();
        assert_eq!(periods.len(), 12);
        assert_eq!(periods[0].start, date(2024, 1, 1));
        assert_eq!(periods[0].end, date(2024, 2, 1));
        assert_eq!(periods[1].len_days(), 29);
        assert_eq!(periods[11].end, date(2025, 1, 1));
        assert_contiguous(&periods);

        // A mid-month start also needs the month the horizon ends in.
        let periods = partition_periods(&schedule, date(2024, 1, 20), 12).unwrap();
        assert_eq!(periods.len(), 13);
        assert_eq!(periods[0].start, date(2024, 1, 1));
    }

    #[test]
    fn twice_monthly_periods_run_between_pay_dates() {
        let schedule = PaySchedule::TwiceMonthly {
            first_day: 1,
            second_day: 15,
        };
        let periods = partition_periods(&schedule, date(2024, 6, 10), 1).unwrap();
        assert_eq!(
            periods,
            vec![
                PayPeriod {
                    start: date(2024, 6, 1),
                    end: date(2024, 6, 15)
                },
                PayPeriod {
                    start: date(2024, 6, 15),
                    end: date(2024, 7, 1)
                },
                PayPeriod {
                    start: date(2024, 7, 1),
                    end: date(2024, 7, 15)
                },
            ]
        );
    }

    #[test]
    fn twice_monthly_missing_day_merges_periods() {
        let schedule = PaySchedule::TwiceMonthly {
            first_day: 15,
            second_day: 31,
        };
        let periods = partition_periods(&schedule, date(2024, 4, 1), 1).unwrap();
        assert_eq!(periods[0].start, date(2024, 3, 31));
        assert_eq!(periods[0].end, date(2024, 4, 15));
        assert_eq!(periods[1].start, date(2024, 4, 15));
        assert_eq!(periods[1].end, date(2024, 5, 15));
        assert_contiguous(&periods);
    }

    #[test]
    fn period_membership_is_half_open() {
        let period = PayPeriod {
            start: date(2024, 6, 1),
            end: date(2024, 6, 15),
        };
        assert!(period.contains(date(2024, 6, 1)));
        assert!(period.contains(date(2024, 6, 14)));
        assert!(!period.contains(date(2024, 6, 15)));
        assert_eq!(period.last_day(), date(2024, 6, 14));
    }
}
