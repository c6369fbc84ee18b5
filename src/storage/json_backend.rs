use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, backups_dir_in, ensure_dir, ledgers_dir_in, write_atomic},
    errors::BudgetError,
    ledger::{Ledger, CURRENT_SCHEMA_VERSION},
};

use super::{BackupInfo, LoadReport, Result, StorageBackend};

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    ledgers_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = root.unwrap_or_else(app_data_dir);
        ensure_dir(&root)?;
        let ledgers_dir = ledgers_dir_in(&root);
        let backups_dir = backups_dir_in(&root);
        ensure_dir(&ledgers_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root,
            ledgers_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.ledgers_dir
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    pub fn backup_path(&self, name: &str, backup_name: &str) -> PathBuf {
        self.backup_dir(name).join(backup_name)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    /// Slugs of every stored ledger, sorted.
    pub fn list_ledgers(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.ledgers_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Loads the named ledger, or starts an empty one when nothing is stored yet.
    pub fn load_or_create(&self, name: &str) -> Result<LoadReport> {
        if self.ledger_path(name).exists() {
            self.load(name)
        } else {
            tracing::info!(ledger = name, "no stored ledger; starting a new one");
            Ok(LoadReport {
                ledger: Ledger::new(name),
                warnings: Vec::new(),
            })
        }
    }

    fn write_backup_file(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let path = dir.join(backup_file_name(name, self.next_backup_stamp(name)?, note));
        let json = serde_json::to_string_pretty(ledger)?;
        write_atomic(&path, &json)?;
        self.prune_backups(name, &path)?;
        Ok(path)
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        ensure_dir(&dir)?;
        let backup = dir.join(backup_file_name(name, self.next_backup_stamp(name)?, None));
        fs::copy(path, &backup)?;
        self.prune_backups(name, &backup)
    }

    /// Current time, bumped past the newest existing backup so stamps stay
    /// strictly increasing even within one millisecond.
    fn next_backup_stamp(&self, name: &str) -> Result<DateTime<Utc>> {
        let now = Utc::now().trunc_subsecs(3);
        let newest = self
            .list_backups(name)?
            .into_iter()
            .find_map(|backup| backup.created_at);
        Ok(match newest {
            Some(newest) if newest >= now => newest + Duration::milliseconds(1),
            _ => now,
        })
    }

    fn prune_backups(&self, name: &str, keep: &Path) -> Result<()> {
        let backups = self.list_backups(name)?;
        let stale = backups
            .iter()
            .filter(|entry| entry.path != keep)
            .skip(self.retention.saturating_sub(1));
        for entry in stale {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(path = %entry.path.display(), %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<PathBuf> {
        let path = self.ledger_path(name);
        self.backup_existing_file(name, &path)?;
        save_ledger_to_path(ledger, &path)?;
        tracing::info!(ledger = name, path = %path.display(), "ledger saved");
        Ok(path)
    }

    fn load(&self, name: &str) -> Result<LoadReport> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Err(BudgetError::InvalidRef(format!("ledger `{name}` not found")));
        }
        let ledger = load_ledger_from_path(&path)?;
        let warnings = ledger_warnings(&ledger);
        for warning in &warnings {
            tracing::warn!(ledger = name, "{warning}");
        }
        Ok(LoadReport { ledger, warnings })
    }

    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|stem| stem.to_str()) {
                Some(file_name) => file_name.to_string(),
                None => continue,
            };
            entries.push(BackupInfo {
                created_at: parse_backup_timestamp(&file_name),
                name: file_name,
                path,
            });
        }
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(entries)
    }

    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<PathBuf> {
        self.write_backup_file(ledger, name, note)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger> {
        let backup_path = self.backup_path(name, backup_name);
        if !backup_path.exists() {
            return Err(BudgetError::InvalidRef(format!(
                "backup `{backup_name}` not found"
            )));
        }
        let ledger = load_ledger_from_path(&backup_path)?;
        save_ledger_to_path(&ledger, &self.ledger_path(name))?;
        Ok(ledger)
    }
}

/// Writes the ledger to `path` by staging to a temporary file and renaming it into place.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    write_atomic(path, &json)?;
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    if ledger.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(BudgetError::UnsupportedSchema(ledger.schema_version));
    }
    Ok(ledger)
}

/// Detects dangling references and invalid schedules within a ledger snapshot.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let account_ids: HashSet<_> = ledger.accounts.iter().map(|a| a.id).collect();
    let mut warnings = Vec::new();

    for bill in &ledger.bills {
        if !account_ids.contains(&bill.account_id) {
            warnings.push(format!(
                "bill {} references unknown account {}",
                bill.id, bill.account_id
            ));
        }
        if !(1..=31).contains(&bill.due_day) {
            warnings.push(format!(
                "bill {} has due day {} outside 1..=31",
                bill.id, bill.due_day
            ));
        }
    }
    for income in &ledger.incomes {
        if !account_ids.contains(&income.account_id) {
            warnings.push(format!(
                "income {} references unknown account {}",
                income.id, income.account_id
            ));
        }
        if let Err(err) = income.schedule.validate() {
            warnings.push(format!("income {} has an invalid schedule: {err}", income.id));
        }
    }
    warnings
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

fn backup_file_name(name: &str, stamp: DateTime<Utc>, note: Option<&str>) -> String {
    let timestamp = stamp.format(BACKUP_TIMESTAMP_FORMAT);
    let mut stem = format!("{}_{}", canonical_name(name), timestamp);
    if let Some(label) = sanitize_backup_note(note) {
        stem.push('_');
        stem.push_str(&label);
    }
    format!("{stem}.{LEDGER_EXTENSION}")
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Finds the `YYYYmmdd_HHMMSSmmm` pair in a backup file name, wherever a note
/// or slug places it. Second-precision stamps are accepted too.
fn parse_backup_timestamp(file_name: &str) -> Option<DateTime<Utc>> {
    let stem = file_name.strip_suffix(&format!(".{LEDGER_EXTENSION}"))?;
    let parts: Vec<&str> = stem.split('_').collect();
    parts.windows(2).rev().find_map(|pair| {
        let (date, time) = (pair[0], pair[1]);
        if !is_digits(date, 8) || !(is_digits(time, 9) || is_digits(time, 6)) {
            return None;
        }
        let (clock, millis) = time.split_at(6);
        let naive =
            NaiveDateTime::parse_from_str(&format!("{date}{clock}"), "%Y%m%d%H%M%S").ok()?;
        let millis: i64 = if millis.is_empty() { 0 } else { millis.parse().ok()? };
        Some(DateTime::from_naive_utc_and_offset(naive, Utc) + Duration::milliseconds(millis))
    })
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Account, Bill};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn storage_with_temp_dir(retention: usize) -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(retention))
            .expect("json storage");
        (storage, temp)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let mut ledger = Ledger::new("Household");
        let account = ledger.add_account(Account::new("Checking"));
        ledger.add_bill(Bill::new(account, "Rent", "Sam", 1, dec!(1200.00)));
        storage.save(&ledger, "household").expect("save ledger");

        let report = storage.load("household").expect("load ledger");
        assert!(report.warnings.is_empty());
        assert_eq!(report.ledger.name, "Household");
        assert_eq!(report.ledger.bills[0].amount, dec!(1200.00));
        assert_eq!(storage.list_ledgers().unwrap(), vec!["household".to_string()]);
    }

    #[test]
    fn load_reports_dangling_references() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let mut ledger = Ledger::new("Broken");
        ledger.add_bill(Bill::new(uuid::Uuid::new_v4(), "Orphan", "Sam", 3, dec!(10)));
        storage.save(&ledger, "broken").expect("save ledger");
        let report = storage.load("broken").expect("load ledger");
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("unknown account"));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let (storage, _guard) = storage_with_temp_dir(3);
        let mut ledger = Ledger::new("Future");
        ledger.schema_version = CURRENT_SCHEMA_VERSION + 1;
        let path = storage.ledger_path("future");
        save_ledger_to_path(&ledger, &path).unwrap();
        let err = load_ledger_from_path(&path).expect_err("future schema must fail");
        assert!(matches!(err, BudgetError::UnsupportedSchema(_)));
    }

    #[test]
    fn backup_timestamp_survives_notes() {
        let parsed = parse_backup_timestamp("home_20240601_101500_before-import.json");
        assert_eq!(
            parsed.map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            Some("2024-06-01 10:15:00".to_string())
        );
        assert!(parse_backup_timestamp("home.json").is_none());

        let precise = parse_backup_timestamp("home_20240601_101500250.json").unwrap();
        assert_eq!(precise.format("%H:%M:%S%.3f").to_string(), "10:15:00.250");
    }

    #[test]
    fn rapid_backups_keep_the_newest() {
        let (storage, _guard) = storage_with_temp_dir(2);
        let ledger = Ledger::new("Rapid");
        let mut written = Vec::new();
        for note in ["zulu", "alpha", "mike"] {
            let path = storage.backup(&ledger, "rapid", Some(note)).expect("backup");
            assert!(path.exists(), "fresh backup {} was pruned", path.display());
            written.push(path);
        }
        let kept: Vec<_> = storage
            .list_backups("rapid")
            .unwrap()
            .into_iter()
            .map(|backup| backup.path)
            .collect();
        assert_eq!(kept, vec![written[2].clone(), written[1].clone()]);
    }

    #[test]
    fn notes_are_slugged() {
        assert_eq!(
            sanitize_backup_note(Some("  Before June import! ")),
            Some("before-june-import".to_string())
        );
        assert_eq!(sanitize_backup_note(Some("   ")), None);
    }
}
