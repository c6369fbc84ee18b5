use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{account::Account, bill::Bill, income::Income};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Persistence root: every account plus the bills and incomes that hang off them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub incomes: Vec<Income>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            bills: Vec::new(),
            incomes: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_bill(&mut self, bill: Bill) -> Uuid {
        let id = bill.id;
        self.bills.push(bill);
        self.touch();
        id
    }

    pub fn add_income(&mut self, income: Income) -> Uuid {
        let id = income.id;
        self.incomes.push(income);
        self.touch();
        id
    }

    /// Removes an account together with every bill and income attached to it.
    pub fn remove_account(&mut self, id: Uuid) -> Option<Account> {
        let index = self.accounts.iter().position(|account| account.id == id)?;
        let removed = self.accounts.remove(index);
        self.bills.retain(|bill| bill.account_id != id);
        self.incomes.retain(|income| income.account_id != id);
        self.touch();
        Some(removed)
    }

    pub fn remove_bill(&mut self, id: Uuid) -> Option<Bill> {
        let index = self.bills.iter().position(|bill| bill.id == id)?;
        self.touch();
        Some(self.bills.remove(index))
    }

    pub fn remove_income(&mut self, id: Uuid) -> Option<Income> {
        let index = self.incomes.iter().position(|income| income.id == id)?;
        self.touch();
        Some(self.incomes.remove(index))
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    /// Case-insensitive lookup by account name.
    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        let needle = name.trim().to_ascii_lowercase();
        self.accounts
            .iter()
            .find(|account| account.name.trim().to_ascii_lowercase() == needle)
    }

    pub fn bill(&self, id: Uuid) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == id)
    }

    pub fn income(&self, id: Uuid) -> Option<&Income> {
        self.incomes.iter().find(|income| income.id == id)
    }

    pub fn bills_for(&self, account_id: Uuid) -> impl Iterator<Item = &Bill> {
        self.bills
            .iter()
            .filter(move |bill| bill.account_id == account_id)
    }

    pub fn incomes_for(&self, account_id: Uuid) -> impl Iterator<Item = &Income> {
        self.incomes
            .iter()
            .filter(move |income| income.account_id == account_id)
    }

    pub fn accounts_by_name(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.iter().collect();
        accounts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        accounts
    }

    pub fn bills_by_due_day(&self) -> Vec<&Bill> {
        let mut bills: Vec<&Bill> = self.bills.iter().collect();
        bills.sort_by(|a, b| a.due_day.cmp(&b.due_day).then_with(|| a.name.cmp(&b.name)));
        bills
    }

    /// Incomes ordered by seed date; day-pair schedules have no seed and sort first.
    pub fn incomes_by_seed(&self) -> Vec<&Income> {
        let mut incomes: Vec<&Income> = self.incomes.iter().collect();
        incomes.sort_by_key(|income| (income.schedule.seed(), income.name.clone()));
        incomes
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PaySchedule;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn removing_account_cascades_to_bills_and_incomes() {
        let mut ledger = Ledger::new("Household");
        let checking = ledger.add_account(Account::new("Checking"));
        let savings = ledger.add_account(Account::new("Savings"));
        ledger.add_bill(Bill::new(checking, "Rent", "Sam", 1, dec!(1200)));
        ledger.add_bill(Bill::new(savings, "Insurance", "Sam", 5, dec!(90)));
        ledger.add_income(Income::new(
            checking,
            "Salary",
            dec!(2500),
            PaySchedule::Biweekly {
                seed: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            },
        ));

        let removed = ledger.remove_account(checking).expect("account exists");
        assert_eq!(removed.name, "Checking");
        assert_eq!(ledger.bills.len(), 1);
        assert!(ledger.incomes.is_empty());
        assert!(ledger.remove_account(checking).is_none());
    }

    #[test]
    fn incomes_without_seed_sort_first() {
        let mut ledger = Ledger::new("Order");
        let account = ledger.add_account(Account::new("Main"));
        ledger.add_income(Income::new(
            account,
            "Contract",
            dec!(100),
            PaySchedule::Monthly {
                seed: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            },
        ));
        ledger.add_income(Income::new(
            account,
            "Salary",
            dec!(100),
            PaySchedule::TwiceMonthly {
                first_day: 1,
                second_day: 15,
            },
        ));
        let names: Vec<_> = ledger
            .incomes_by_seed()
            .into_iter()
            .map(|income| income.name.as_str())
            .collect();
        assert_eq!(names, vec!["Salary", "Contract"]);
    }
}
