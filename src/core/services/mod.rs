pub mod account_service;
pub mod bill_service;
pub mod income_service;
pub mod report_service;

pub use account_service::AccountService;
pub use bill_service::{BillService, NewBill};
pub use income_service::{IncomeService, NewIncome};
pub use report_service::{
    parse_starting_balance, AccountSelection, PeriodReport, ReportRequest, ReportService,
};

use uuid::Uuid;

use crate::errors::BudgetError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("{0}")]
    Invalid(String),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
}

fn require_name(field: &str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::Invalid(format!("{field} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn require_account(ledger: &crate::ledger::Ledger, id: Uuid) -> ServiceResult<()> {
    ledger
        .account(id)
        .map(|_| ())
        .ok_or(ServiceError::NotFound { kind: "account", id })
}
