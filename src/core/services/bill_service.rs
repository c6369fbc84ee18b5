use rust_decimal::Decimal;
use uuid::Uuid;

use crate::ledger::{Bill, Ledger};

use super::{require_account, require_name, ServiceError, ServiceResult};

/// Unvalidated input for a new bill.
#[derive(Debug, Clone)]
pub struct NewBill {
    pub account_id: Uuid,
    pub name: String,
    pub owner: String,
    pub due_day: u32,
    pub amount: Decimal,
}

pub struct BillService;

impl BillService {
    pub fn add(ledger: &mut Ledger, input: NewBill) -> ServiceResult<Uuid> {
        let name = require_name("bill name", &input.name)?;
        let owner = require_name("bill owner", &input.owner)?;
        if !(1..=31).contains(&input.due_day) {
            return Err(ServiceError::Invalid(format!(
                "due day {} must be between 1 and 31",
                input.due_day
            )));
        }
        if input.amount <= Decimal::ZERO {
            return Err(ServiceError::Invalid("bill amount must be positive".into()));
        }
        require_account(ledger, input.account_id)?;

        let bill = Bill::new(input.account_id, name, owner, input.due_day, input.amount);
        tracing::info!(bill = %bill.name, due_day = bill.due_day, "bill added");
        Ok(ledger.add_bill(bill))
    }

    pub fn remove(ledger: &mut Ledger, id: Uuid) -> ServiceResult<Bill> {
        let removed = ledger
            .remove_bill(id)
            .ok_or(ServiceError::NotFound { kind: "bill", id })?;
        tracing::info!(bill = %removed.name, %id, "bill removed");
        Ok(removed)
    }

    pub fn list(ledger: &Ledger) -> Vec<&Bill> {
        ledger.bills_by_due_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Account;
    use rust_decimal_macros::dec;

    fn ledger_with_account() -> (Ledger, Uuid) {
        let mut ledger = Ledger::new("Bills");
        let account = ledger.add_account(Account::new("Checking"));
        (ledger, account)
    }

    fn rent(account_id: Uuid) -> NewBill {
        NewBill {
            account_id,
            name: "Rent".into(),
            owner: "Sam".into(),
            due_day: 1,
            amount: dec!(1200),
        }
    }

    #[test]
    fn out_of_range_due_day_is_rejected() {
        let (mut ledger, account) = ledger_with_account();
        for due_day in [0, 32] {
            let input = NewBill {
                due_day,
                ..rent(account)
            };
            assert!(BillService::add(&mut ledger, input).is_err());
        }
        assert!(ledger.bills.is_empty());
    }

    #[test]
    fn non_positive_amount_is_rejected() {
        let (mut ledger, account) = ledger_with_account();
        let input = NewBill {
            amount: dec!(0),
            ..rent(account)
        };
        assert!(BillService::add(&mut ledger, input).is_err());
    }

    #[test]
    fn unknown_account_is_not_found() {
        let (mut ledger, _) = ledger_with_account();
        let err = BillService::add(&mut ledger, rent(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { kind: "account", .. }));
    }

    #[test]
    fn list_is_ordered_by_due_day() {
        let (mut ledger, account) = ledger_with_account();
        BillService::add(
            &mut ledger,
            NewBill {
                name: "Phone".into(),
                due_day: 20,
                amount: dec!(45),
                ..rent(account)
            },
        )
        .unwrap();
        let rent_id = BillService::add(&mut ledger, rent(account)).unwrap();
        let listed = BillService::list(&ledger);
        assert_eq!(listed[0].id, rent_id);
        assert_eq!(listed[1].name, "Phone");

        let removed = BillService::remove(&mut ledger, rent_id).unwrap();
        assert_eq!(removed.name, "Rent");
        assert_eq!(ledger.bills.len(), 1);
    }
}
