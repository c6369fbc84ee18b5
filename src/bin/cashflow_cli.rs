use std::{env, error::Error, process, str::FromStr};

use chrono::{Datelike, Local, NaiveDate};
use colored::Colorize;
use rust_decimal::Decimal;
use strsim::levenshtein;
use uuid::Uuid;

use cashflow_core::{
    config::ConfigManager,
    core::services::{
        parse_starting_balance, AccountSelection, AccountService, BillService, IncomeService,
        NewBill, NewIncome, ReportRequest, ReportService,
    },
    init,
    ledger::{Ledger, PayFrequency, PaySchedule},
    report::{AccountReport, MonthReport},
    storage::{JsonStorage, StorageBackend},
};

type CliResult<T> = Result<T, Box<dyn Error>>;

const COMMANDS: [&str; 6] = ["account", "bill", "income", "report", "periods", "help"];

const USAGE: &str = "Usage: cashflow_cli [--ledger NAME] <command>
Commands:
  account add <name> | account list | account remove <id|name>
  bill add <account> <name> <owner> <due_day> <amount> | bill list | bill remove <id>
  income add <account> <name> <amount> <frequency> <seed|day1 day2>
  income list | income remove <id>
  report [--year Y] [--month M] [--account ID|all] [--starting-balance X]
  periods <income> [--from YYYY-MM-DD] [--horizon MONTHS]
  help";

fn main() {
    init();

    if let Err(err) = run() {
        eprintln!("{} {err}", "Error:".bright_red());
        process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let ledger_flag = take_option(&mut args, "--ledger")?;

    let mut args = args.into_iter();
    let command = match args.next() {
        Some(command) => command,
        None => {
            print_usage();
            process::exit(1);
        }
    };
    let rest: Vec<String> = args.collect();

    if command == "help" {
        println!("{USAGE}");
        return Ok(());
    }
    if !COMMANDS.contains(&command.as_str()) {
        suggest_command(&command);
        print_usage();
        process::exit(1);
    }

    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    let storage = JsonStorage::new(
        Some(manager.data_root(&config)),
        Some(config.backup_retention),
    )?;
    let ledger_name = ledger_flag.unwrap_or_else(|| config.default_ledger.clone());
    let loaded = storage.load_or_create(&ledger_name)?;
    for warning in &loaded.warnings {
        eprintln!("{} {warning}", "Warning:".bright_yellow());
    }
    let mut session = Session {
        storage,
        ledger_name,
        ledger: loaded.ledger,
        horizon_months: config.horizon_months,
        currency: config.currency.clone(),
    };

    match command.as_str() {
        "account" => session.account(rest),
        "bill" => session.bill(rest),
        "income" => session.income(rest),
        "report" => session.report(rest),
        "periods" => session.periods(rest),
        _ => Err(usage("help")),
    }
}

struct Session {
    storage: JsonStorage,
    ledger_name: String,
    ledger: Ledger,
    horizon_months: u32,
    currency: String,
}

impl Session {
    fn save(&self) -> CliResult<()> {
        self.storage.save(&self.ledger, &self.ledger_name)?;
        Ok(())
    }

    fn account(&mut self, args: Vec<String>) -> CliResult<()> {
        match args.first().map(String::as_str) {
            Some("add") => {
                let name = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
                let id = AccountService::add(&mut self.ledger, &name)?;
                self.save()?;
                println!("Added account {} ({id})", name.trim());
            }
            Some("list") => {
                let accounts = AccountService::list(&self.ledger);
                if accounts.is_empty() {
                    println!("No accounts.");
                }
                for account in accounts {
                    println!("{}  {}", account.id, account.name);
                }
            }
            Some("remove") => {
                let reference = required(&args, 1, "account remove <id|name>")?;
                let id = AccountService::resolve(&self.ledger, reference)?.id;
                let removed = AccountService::remove(&mut self.ledger, id)?;
                self.save()?;
                println!("Removed account {} and its bills and incomes", removed.name);
            }
            _ => return Err(usage("account add <name> | account list | account remove <id|name>")),
        }
        Ok(())
    }

    fn bill(&mut self, args: Vec<String>) -> CliResult<()> {
        match args.first().map(String::as_str) {
            Some("add") => {
                let spec = "bill add <account> <name> <owner> <due_day> <amount>";
                let account_id = AccountService::resolve(&self.ledger, required(&args, 1, spec)?)?.id;
                let input = NewBill {
                    account_id,
                    name: required(&args, 2, spec)?.to_string(),
                    owner: required(&args, 3, spec)?.to_string(),
                    due_day: parse_value(required(&args, 4, spec)?, "due day")?,
                    amount: parse_value(required(&args, 5, spec)?, "amount")?,
                };
                let id = BillService::add(&mut self.ledger, input)?;
                self.save()?;
                println!("Added bill {id}");
            }
            Some("list") => {
                let bills = BillService::list(&self.ledger);
                if bills.is_empty() {
                    println!("No bills.");
                }
                for bill in bills {
                    println!(
                        "{}  day {:>2}  {:>10}  {} ({}) [{}]",
                        bill.id,
                        bill.due_day,
                        format_amount(bill.amount),
                        bill.name,
                        bill.owner,
                        self.account_name(bill.account_id)
                    );
                }
            }
            Some("remove") => {
                let id = parse_id(required(&args, 1, "bill remove <id>")?)?;
                let removed = BillService::remove(&mut self.ledger, id)?;
                self.save()?;
                println!("Removed bill {}", removed.name);
            }
            _ => return Err(usage("bill add ... | bill list | bill remove <id>")),
        }
        Ok(())
    }

    fn income(&mut self, args: Vec<String>) -> CliResult<()> {
        match args.first().map(String::as_str) {
            Some("add") => {
                let spec = "income add <account> <name> <amount> <frequency> <seed|day1 day2>";
                let account_id = AccountService::resolve(&self.ledger, required(&args, 1, spec)?)?.id;
                let name = required(&args, 2, spec)?.to_string();
                let amount: Decimal = parse_value(required(&args, 3, spec)?, "amount")?;
                let frequency = PayFrequency::from_str(required(&args, 4, spec)?)?;
                let schedule = if frequency.uses_seed() {
                    let seed = parse_date(required(&args, 5, spec)?)?;
                    PaySchedule::from_parts(frequency, Some(seed), None)?
                } else {
                    let first: u32 = parse_value(required(&args, 5, spec)?, "day")?;
                    let second: u32 = parse_value(required(&args, 6, spec)?, "day")?;
                    PaySchedule::from_parts(frequency, None, Some((first, second)))?
                };
                let id = IncomeService::add(
                    &mut self.ledger,
                    NewIncome {
                        account_id,
                        name,
                        amount,
                        schedule,
                    },
                )?;
                self.save()?;
                println!("Added income {id}");
            }
            Some("list") => {
                let incomes = IncomeService::list(&self.ledger);
                if incomes.is_empty() {
                    println!("No incomes.");
                }
                for income in incomes {
                    println!(
                        "{}  {:>10}  {}  {} [{}]",
                        income.id,
                        format_amount(income.amount),
                        income.schedule.label(),
                        income.name,
                        self.account_name(income.account_id)
                    );
                }
            }
            Some("remove") => {
                let id = parse_id(required(&args, 1, "income remove <id>")?)?;
                let removed = IncomeService::remove(&mut self.ledger, id)?;
                self.save()?;
                println!("Removed income {}", removed.name);
            }
            _ => return Err(usage("income add ... | income list | income remove <id>")),
        }
        Ok(())
    }

    fn report(&mut self, mut args: Vec<String>) -> CliResult<()> {
        let today = Local::now().date_naive();
        let year = match take_option(&mut args, "--year")? {
            Some(raw) => parse_value(&raw, "year")?,
            None => today.year(),
        };
        let month = match take_option(&mut args, "--month")? {
            Some(raw) => parse_value(&raw, "month")?,
            None => today.month(),
        };
        let selection = match take_option(&mut args, "--account")? {
            None => AccountSelection::All,
            Some(raw) if raw.eq_ignore_ascii_case("all") => AccountSelection::All,
            Some(raw) => AccountSelection::One(AccountService::resolve(&self.ledger, &raw)?.id),
        };
        let starting_balance = match take_option(&mut args, "--starting-balance")? {
            Some(raw) => {
                let (value, warning) = parse_starting_balance(&raw);
                if let Some(message) = warning {
                    eprintln!("{} {message}", "Warning:".bright_yellow());
                }
                value
            }
            None => Decimal::ZERO,
        };
        reject_extra(&args)?;

        let request = ReportRequest::new(year, month)
            .with_account(selection)
            .with_starting_balance(starting_balance);
        let report = ReportService::month_report(&self.ledger, &request)?;
        print_month_report(&report, &self.currency);
        Ok(())
    }

    fn periods(&mut self, mut args: Vec<String>) -> CliResult<()> {
        let from = match take_option(&mut args, "--from")? {
            Some(raw) => parse_date(&raw)?,
            None => Local::now().date_naive(),
        };
        let horizon = match take_option(&mut args, "--horizon")? {
            Some(raw) => parse_value(&raw, "horizon")?,
            None => self.horizon_months,
        };
        let reference = required(&args, 0, "periods <income> [--from DATE] [--horizon N]")?;
        let income_id = self.resolve_income(reference)?;
        reject_extra(&args[1..])?;

        let report = ReportService::period_report(&self.ledger, income_id, from, horizon)?;
        println!(
            "{}",
            format!(
                "=== {} periods for {} ({}) ===",
                report.income_name, report.account_name, self.currency
            )
            .bold()
        );
        println!(
            "{:<12} {:<12} {:>12} {:>12} {:>12}",
            "Start", "End", "Income", "Bills", "Net"
        );
        for period in &report.periods {
            println!(
                "{:<12} {:<12} {:>12} {:>12} {}",
                period.start.to_string(),
                period.end.to_string(),
                format_amount(period.income),
                format_amount(period.bills_due),
                colour_balance(period.net)
            );
        }
        Ok(())
    }

    fn resolve_income(&self, reference: &str) -> CliResult<Uuid> {
        if let Ok(id) = Uuid::parse_str(reference) {
            return Ok(id);
        }
        let needle = reference.trim().to_ascii_lowercase();
        self.ledger
            .incomes
            .iter()
            .find(|income| income.name.to_ascii_lowercase() == needle)
            .map(|income| income.id)
            .ok_or_else(|| format!("Income `{reference}` not found").into())
    }

    fn account_name(&self, id: Uuid) -> &str {
        self.ledger
            .account(id)
            .map(|account| account.name.as_str())
            .unwrap_or("?")
    }
}

fn print_month_report(report: &MonthReport, currency: &str) {
    let title = NaiveDate::from_ymd_opt(report.year, report.month, 1)
        .map(|first| first.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", report.year, report.month));
    println!("{}", format!("=== {title} ===").bold());
    if report.accounts.is_empty() {
        println!("No accounts.");
    }
    for account in &report.accounts {
        print_account_report(account, currency);
    }
    println!(
        "Previous: {}-{:02}  Next: {}-{:02}",
        report.previous.0, report.previous.1, report.next.0, report.next.1
    );
}

fn print_account_report(account: &AccountReport, currency: &str) {
    println!();
    println!(
        "{} (starting balance {} {currency})",
        account.account_name.bold(),
        format_amount(account.starting_balance)
    );
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12}",
        "Date", "Income", "Bills", "Net", "Balance"
    );
    for day in &account.days {
        println!(
            "{:<12} {:>12} {:>12} {:>12} {}",
            day.date.to_string(),
            format_amount(day.income),
            format_amount(day.bills),
            format_amount(day.net),
            colour_balance(day.balance)
        );
    }
    let totals = account.totals();
    println!(
        "Totals ({currency}): income {}  bills {}  net {}  closing {}",
        format_amount(totals.income),
        format_amount(totals.bills),
        format_amount(totals.net),
        colour_balance(totals.closing_balance)
    );
}

fn format_amount(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn colour_balance(value: Decimal) -> String {
    let text = format!("{:>12}", format_amount(value));
    if value < Decimal::ZERO {
        text.bright_red().to_string()
    } else {
        text
    }
}

/// Removes `flag` and its value from `args`, wherever it appears.
fn take_option(args: &mut Vec<String>, flag: &str) -> CliResult<Option<String>> {
    let Some(index) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    if index + 1 >= args.len() {
        return Err(format!("`{flag}` expects a value").into());
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Ok(Some(value))
}

fn required<'a>(args: &'a [String], index: usize, spec: &str) -> CliResult<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| usage(spec))
}

fn reject_extra(args: &[String]) -> CliResult<()> {
    match args.first() {
        Some(extra) => Err(format!("Unexpected argument `{extra}`").into()),
        None => Ok(()),
    }
}

fn parse_value<T: FromStr>(raw: &str, what: &str) -> CliResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| format!("Invalid {what} `{raw}`").into())
}

fn parse_date(raw: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date `{raw}`, expected YYYY-MM-DD").into())
}

fn parse_id(raw: &str) -> CliResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("Invalid id `{raw}`").into())
}

fn usage(spec: &str) -> Box<dyn Error> {
    format!("Usage: cashflow_cli {spec}").into()
}

fn suggest_command(input: &str) {
    eprintln!(
        "{} Unknown command `{input}`. Type `help` to see available commands.",
        "Warning:".bright_yellow()
    );
    let best = COMMANDS
        .iter()
        .map(|name| (levenshtein(name, input), *name))
        .min_by_key(|(distance, _)| *distance);
    if let Some((distance, name)) = best {
        if distance <= 3 {
            eprintln!("Did you mean `{name}`?");
        }
    }
}

fn print_usage() {
    eprintln!("{USAGE}");
}
