use uuid::Uuid;

use crate::ledger::{Account, Ledger};

use super::{require_name, ServiceError, ServiceResult};

pub struct AccountService;

impl AccountService {
    pub fn add(ledger: &mut Ledger, name: &str) -> ServiceResult<Uuid> {
        let name = require_name("account name", name)?;
        Self::validate_name(ledger, &name)?;
        let id = ledger.add_account(Account::new(name.clone()));
        tracing::info!(account = %name, %id, "account added");
        Ok(id)
    }

    /// Deletes the account along with its bills and incomes.
    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<Account> {
        let removed = ledger
            .remove_account(id)
            .ok_or(ServiceError::NotFound { kind: "account", id })?;
        tracing::info!(account = %removed.name, %id, "account removed");
        Ok(removed)
    }

    pub fn list(ledger: &Ledger) -> Vec<&Account> {
        ledger.accounts_by_name()
    }

    /// Resolves an account by id or, failing that, by case-insensitive name.
    pub fn resolve<'a>(ledger: &'a Ledger, reference: &str) -> ServiceResult<&'a Account> {
        if let Ok(id) = Uuid::parse_str(reference.trim()) {
            return ledger
                .account(id)
                .ok_or(ServiceError::NotFound { kind: "account", id });
        }
        ledger
            .account_by_name(reference)
            .ok_or_else(|| ServiceError::Invalid(format!("Account `{reference}` not found")))
    }

    fn validate_name(ledger: &Ledger, candidate: &str) -> ServiceResult<()> {
        if ledger.account_by_name(candidate).is_some() {
            Err(ServiceError::Invalid(format!(
                "Account `{candidate}` already exists"
            )))
        } else {
            Ok(())
        }
    }
}
