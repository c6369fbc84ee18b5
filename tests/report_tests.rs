mod common;

use cashflow_core::{
    core::services::{AccountSelection, ReportRequest, ReportService},
    ledger::PaySchedule,
    report::summarize_periods,
    schedule::partition_periods,
};
use common::{date, household_ledger};
use rust_decimal_macros::dec;

#[test]
fn february_report_skips_missing_days() {
    let ledger = household_ledger();
    let request = ReportRequest::new(2024, 2).with_starting_balance(dec!(100));
    let report = ReportService::month_report(&ledger, &request).unwrap();

    let joint = &report.accounts[0];
    assert_eq!(joint.account_name, "Joint");
    assert_eq!(joint.days.len(), 29);
    // Salary on the 30th and the card bill on the 31st do not exist in February.
    let totals = joint.totals();
    assert_eq!(totals.income, dec!(1725.35));
    assert_eq!(totals.bills, dec!(1546.40));
    assert_eq!(totals.closing_balance, dec!(278.95));

    let rent_day = joint.record_for(date(2024, 2, 1)).unwrap();
    assert_eq!(rent_day.balance, dec!(-1350.00));
    assert_eq!(joint.overdrawn_days().count(), 14);
}

#[test]
fn savings_account_reported_separately() {
    let ledger = household_ledger();
    let savings = ledger.account_by_name("savings").unwrap().id;
    let request = ReportRequest::new(2024, 3)
        .with_account(AccountSelection::One(savings))
        .with_starting_balance(dec!(1000));
    let report = ReportService::month_report(&ledger, &request).unwrap();

    assert_eq!(report.accounts.len(), 1);
    let account = &report.accounts[0];
    assert_eq!(account.record_for(date(2024, 3, 2)).unwrap().balance, dec!(1000));
    assert_eq!(account.record_for(date(2024, 3, 3)).unwrap().balance, dec!(1200));
    assert_eq!(account.totals().closing_balance, dec!(1200));
}

#[test]
fn december_navigation_wraps_year() {
    let ledger = household_ledger();
    let report = ReportService::month_report(&ledger, &ReportRequest::new(2024, 12)).unwrap();
    assert_eq!(report.previous, (2024, 11));
    assert_eq!(report.next, (2025, 1));
}

#[test]
fn twice_monthly_periods_follow_pay_dates() {
    let ledger = household_ledger();
    let salary = ledger
        .incomes
        .iter()
        .find(|income| income.name == "Salary")
        .unwrap();
    let report =
        ReportService::period_report(&ledger, salary.id, date(2024, 1, 20), 2).unwrap();

    let starts: Vec<_> = report.periods.iter().map(|period| period.start).collect();
    assert_eq!(
        starts,
        vec![
            date(2024, 1, 15),
            date(2024, 1, 30),
            date(2024, 2, 15),
            date(2024, 3, 15),
        ]
    );
    // February has no 30th, so its second half runs straight to March 15.
    assert_eq!(report.periods[2].end, date(2024, 3, 15));
    assert_eq!(report.periods[1].bills_due, dec!(1700.00));
    assert_eq!(report.periods[2].bills_due, dec!(1546.40));
    for period in &report.periods {
        assert_eq!(period.income, dec!(1725.35));
    }
}

#[test]
fn weekly_periods_sum_weekly_pay() {
    let ledger = household_ledger();
    let joint = ledger.account_by_name("Joint").unwrap();
    let schedule = PaySchedule::Weekly {
        seed: date(2024, 6, 7),
    };
    let periods = partition_periods(&schedule, date(2024, 6, 1), 1).unwrap();
    assert_eq!(periods[0].start, date(2024, 5, 31));
    assert_eq!(periods.len(), 5);

    let bills: Vec<_> = ledger.bills_for(joint.id).collect();
    let summaries = summarize_periods(&periods, &bills, &[]);
    let total_bills: rust_decimal::Decimal = summaries.iter().map(|s| s.bills_due).sum();
    // Card on May 31, rent on June 1 and July 1, power on June 18.
    assert_eq!(total_bills, dec!(3246.40));
}
