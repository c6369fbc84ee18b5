use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BudgetError;

/// Supported pay cadences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    Weekly,
    Biweekly,
    Monthly,
    TwiceMonthly,
}

impl PayFrequency {
    pub const ALL: [PayFrequency; 4] = [
        PayFrequency::Weekly,
        PayFrequency::Biweekly,
        PayFrequency::Monthly,
        PayFrequency::TwiceMonthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::Biweekly => "biweekly",
            PayFrequency::Monthly => "monthly",
            PayFrequency::TwiceMonthly => "twice_monthly",
        }
    }

    /// Whether schedules of this cadence are anchored on a seed date rather than a day pair.
    pub fn uses_seed(self) -> bool {
        !matches!(self, PayFrequency::TwiceMonthly)
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayFrequency {
    type Err = BudgetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        PayFrequency::ALL
            .into_iter()
            .find(|freq| freq.as_str() == normalized)
            .ok_or_else(|| BudgetError::Validation(format!("unsupported frequency `{value}`")))
    }
}

/// When an income is paid. Seeded cadences step from an anchor date;
/// twice-monthly incomes land on two fixed days of every month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum PaySchedule {
    Weekly { seed: NaiveDate },
    Biweekly { seed: NaiveDate },
    Monthly { seed: NaiveDate },
    TwiceMonthly { first_day: u32, second_day: u32 },
}

impl PaySchedule {
    /// Builds a schedule from the flat record shape: a frequency plus a
    /// nullable seed date and a nullable day-of-month pair.
    pub fn from_parts(
        frequency: PayFrequency,
        seed: Option<NaiveDate>,
        days: Option<(u32, u32)>,
    ) -> Result<Self, BudgetError> {
        let schedule = match (frequency, seed, days) {
            (PayFrequency::TwiceMonthly, None, Some((first_day, second_day))) => {
                PaySchedule::TwiceMonthly {
                    first_day,
                    second_day,
                }
            }
            (PayFrequency::TwiceMonthly, Some(_), _) => {
                return Err(BudgetError::Validation(
                    "twice_monthly incomes take a day pair, not a seed date".into(),
                ))
            }
            (PayFrequency::TwiceMonthly, None, None) => {
                return Err(BudgetError::Validation(
                    "twice_monthly incomes need two days of the month".into(),
                ))
            }
            (freq, Some(_), Some(_)) => {
                return Err(BudgetError::Validation(format!(
                    "{freq} incomes take a seed date, not a day pair"
                )))
            }
            (freq, None, _) => {
                return Err(BudgetError::Validation(format!(
                    "{freq} incomes need a seed date"
                )))
            }
            (PayFrequency::Weekly, Some(seed), None) => PaySchedule::Weekly { seed },
            (PayFrequency::Biweekly, Some(seed), None) => PaySchedule::Biweekly { seed },
            (PayFrequency::Monthly, Some(seed), None) => PaySchedule::Monthly { seed },
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Checks constraints the type cannot express on its own.
    pub fn validate(&self) -> Result<(), BudgetError> {
        if let PaySchedule::TwiceMonthly {
            first_day,
            second_day,
        } = *self
        {
            for day in [first_day, second_day] {
                if !(1..=31).contains(&day) {
                    return Err(BudgetError::Validation(format!(
                        "day of month {day} is outside 1..=31"
                    )));
                }
            }
            if first_day == second_day {
                return Err(BudgetError::Validation(format!(
                    "twice_monthly days must differ (both are {first_day})"
                )));
            }
        }
        Ok(())
    }

    pub fn frequency(&self) -> PayFrequency {
        match self {
            PaySchedule::Weekly { .. } => PayFrequency::Weekly,
            PaySchedule::Biweekly { .. } => PayFrequency::Biweekly,
            PaySchedule::Monthly { .. } => PayFrequency::Monthly,
            PaySchedule::TwiceMonthly { .. } => PayFrequency::TwiceMonthly,
        }
    }

    pub fn seed(&self) -> Option<NaiveDate> {
        match *self {
            PaySchedule::Weekly { seed }
            | PaySchedule::Biweekly { seed }
            | PaySchedule::Monthly { seed } => Some(seed),
            PaySchedule::TwiceMonthly { .. } => None,
        }
    }

    pub fn days(&self) -> Option<(u32, u32)> {
        match *self {
            PaySchedule::TwiceMonthly {
                first_day,
                second_day,
            } => Some((first_day, second_day)),
            _ => None,
        }
    }

    /// Fixed stepping interval in days for weekly and biweekly schedules.
    pub fn interval_days(&self) -> Option<i64> {
        match self {
            PaySchedule::Weekly { .. } => Some(7),
            PaySchedule::Biweekly { .. } => Some(14),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match *self {
            PaySchedule::Weekly { seed } => format!("Weekly from {seed}"),
            PaySchedule::Biweekly { seed } => format!("Every 2 weeks from {seed}"),
            PaySchedule::Monthly { seed } => format!("Monthly on day {}", seed.day()),
            PaySchedule::TwiceMonthly {
                first_day,
                second_day,
            } => format!("Days {first_day} and {second_day}"),
        }
    }
}

/// A recurring credit into an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Income {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub schedule: PaySchedule,
}

impl Income {
    pub fn new(
        account_id: Uuid,
        name: impl Into<String>,
        amount: Decimal,
        schedule: PaySchedule,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name: name.into(),
            amount,
            schedule,
        }
    }

    pub fn frequency(&self) -> PayFrequency {
        self.schedule.frequency()
    }
}
