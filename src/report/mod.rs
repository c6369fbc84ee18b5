//! Report assembly: daily running balances and per-period summaries.

pub mod daily;
pub mod period;

pub use daily::{
    bills_by_date, build_account_report, income_by_date, AccountReport, DailyRecord, MonthReport,
    ReportTotals, BALANCE_SCALE,
};
pub use period::{summarize_periods, PeriodSummary};
