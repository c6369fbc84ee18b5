use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ledger::{Income, Ledger, PaySchedule};

use super::{require_account, require_name, ServiceError, ServiceResult};

/// Unvalidated input for a new income.
#[derive(Debug, Clone)]
pub struct NewIncome {
    pub account_id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub schedule: PaySchedule,
}

pub struct IncomeService;

impl IncomeService {
    pub fn add(ledger: &mut Ledger, input: NewIncome) -> ServiceResult<Uuid> {
        let name = require_name("income name", &input.name)?;
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::Invalid(
                "income amount must be positive".into(),
            ));
        }
        input.schedule.validate()?;
        require_account(ledger, input.account_id)?;

        let income = Income::new(input.account_id, name, input.amount, input.schedule);
        tracing::info!(
            income = %income.name,
            frequency = %income.frequency(),
            "income added"
        );
        Ok(ledger.add_income(income))
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<Income> {
        let removed = ledger
            .remove_income(id)
            .ok_or(ServiceError::NotFound { kind: "income", id })?;
        tracing::info!(income = %removed.name, %id, "income removed");
        Ok(removed)
    }

    pub fn list(ledger: &Ledger) -> Vec<&Income> {
        ledger.incomes_by_seed()
    }
}
