use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::ledger::{Bill, DateWindow, Income, Ledger};
use crate::report::{build_account_report, summarize_periods, MonthReport, PeriodSummary};
use crate::schedule::partition_periods;

use super::{ServiceError, ServiceResult};

/// Which accounts a month report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountSelection {
    #[default]
    All,
    One(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub year: i32,
    pub month: u32,
    pub accounts: AccountSelection,
    /// Applied independently to every selected account.
    pub starting_balance: Decimal,
}

impl ReportRequest {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            accounts: AccountSelection::All,
            starting_balance: Decimal::ZERO,
        }
    }

    pub fn for_month_of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn with_account(mut self, accounts: AccountSelection) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_starting_balance(mut self, starting_balance: Decimal) -> Self {
        self.starting_balance = starting_balance;
        self
    }
}

/// Pay-period breakdown for one income's account.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub income_id: Uuid,
    pub income_name: String,
    pub account_id: Uuid,
    pub account_name: String,
    pub periods: Vec<PeriodSummary>,
}

pub struct ReportService;

impl ReportService {
    pub fn month_report(ledger: &Ledger, request: &ReportRequest) -> ServiceResult<MonthReport> {
        let window = DateWindow::month(request.year, request.month)?;
        let accounts = match request.accounts {
            AccountSelection::All => ledger.accounts_by_name(),
            AccountSelection::One(id) => vec![ledger
                .account(id)
                .ok_or(ServiceError::NotFound { kind: "account", id })?],
        };

        let reports = accounts
            .into_iter()
            .map(|account| {
                build_account_report(
                    account,
                    ledger.bills_for(account.id),
                    ledger.incomes_for(account.id),
                    window,
                    request.starting_balance,
                )
            })
            .collect();

        tracing::debug!(
            year = request.year,
            month = request.month,
            "month report assembled"
        );
        Ok(MonthReport::new(
            request.year,
            request.month,
            window,
            request.starting_balance,
            reports,
        ))
    }

    /// Splits the horizon into the income's pay periods and totals every
    /// income and bill of its account per period.
    pub fn period_report(
        ledger: &Ledger,
        income_id: Uuid,
        from: NaiveDate,
        horizon_months: u32,
    ) -> ServiceResult<PeriodReport> {
        let income = ledger.income(income_id).ok_or(ServiceError::NotFound {
            kind: "income",
            id: income_id,
        })?;
        let account = ledger.account(income.account_id).ok_or(ServiceError::NotFound {
            kind: "account",
            id: income.account_id,
        })?;

        let periods = partition_periods(&income.schedule, from, horizon_months)?;
        let bills: Vec<&Bill> = ledger.bills_for(account.id).collect();
        let incomes: Vec<&Income> = ledger.incomes_for(account.id).collect();

        Ok(PeriodReport {
            income_id,
            income_name: income.name.clone(),
            account_id: account.id,
            account_name: account.name.clone(),
            periods: summarize_periods(&periods, &bills, &incomes),
        })
    }
}

/// Parses a user-supplied starting balance. Blank input means zero; anything
/// unparsable also yields zero plus a warning for the caller to show.
pub fn parse_starting_balance(raw: &str) -> (Decimal, Option<String>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (Decimal::ZERO, None);
    }
    let cleaned = trimmed.replace(',', "");
    let parsed = cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned));
    match parsed {
        Ok(value) => (value, None),
        Err(_) => {
            tracing::warn!(input = trimmed, "invalid starting balance; defaulting to 0");
            (
                Decimal::ZERO,
                Some(format!(
                    "Invalid starting balance `{trimmed}`, defaulting to 0"
                )),
            )
        }
    }
}
