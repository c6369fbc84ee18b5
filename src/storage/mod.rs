pub mod json_backend;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{errors::BudgetError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, BudgetError>;

/// A loaded ledger plus any integrity warnings found while reading it.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub ledger: Ledger,
    pub warnings: Vec<String>,
}

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
}

/// Abstraction over persistence backends capable of storing ledgers and backups.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<PathBuf>;
    fn load(&self, name: &str) -> Result<LoadReport>;
    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>>;
    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<PathBuf>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger>;
}

pub use json_backend::{load_ledger_from_path, save_ledger_to_path, JsonStorage};
