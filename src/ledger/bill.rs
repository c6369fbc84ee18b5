use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar::date_in_month;

/// A recurring monthly obligation debited on a fixed day of the month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bill {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub owner: String,
    pub due_day: u32,
    pub amount: Decimal,
}

impl Bill {
    pub fn new(
        account_id: Uuid,
        name: impl Into<String>,
        owner: impl Into<String>,
        due_day: u32,
        amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            name: name.into(),
            owner: owner.into(),
            due_day,
            amount,
        }
    }

    /// Due date within the given month. A due day past the end of the month
    /// means the bill does not fall due that month.
    pub fn due_date_in(&self, year: i32, month: u32) -> Option<NaiveDate> {
        date_in_month(year, month, self.due_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn due_date_skips_short_months() {
        let bill = Bill::new(Uuid::new_v4(), "Rent", "Sam", 31, dec!(1200));
        assert_eq!(bill.due_date_in(2024, 4), None);
        assert_eq!(bill.due_date_in(2024, 2), None);
        assert_eq!(
            bill.due_date_in(2024, 5),
            NaiveDate::from_ymd_opt(2024, 5, 31)
        );
    }

    #[test]
    fn leap_day_bill_only_due_in_leap_years() {
        let bill = Bill::new(Uuid::new_v4(), "Gym", "Alex", 29, dec!(30));
        assert!(bill.due_date_in(2024, 2).is_some());
        assert!(bill.due_date_in(2023, 2).is_none());
    }
}
