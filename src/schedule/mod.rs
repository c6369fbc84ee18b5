//! Pay-date and pay-period projection.

pub mod pay_dates;
pub mod periods;

pub use pay_dates::{pay_dates_in, IntervalPayDates};
pub use periods::{partition_periods, PayPeriod, DEFAULT_HORIZON_MONTHS};
