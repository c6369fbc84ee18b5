use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::utils::{app_data_dir, config_file_in, ensure_dir, write_atomic},
    errors::BudgetError,
    schedule::DEFAULT_HORIZON_MONTHS,
};

const DEFAULT_LEDGER: &str = "household";
const DEFAULT_BACKUP_RETENTION: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Currency code shown next to report amounts.
    pub currency: String,
    pub default_ledger: String,
    /// Months covered by period reports when no horizon is given.
    pub horizon_months: u32,
    /// Overrides where ledgers and backups are stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            default_ledger: DEFAULT_LEDGER.into(),
            horizon_months: DEFAULT_HORIZON_MONTHS,
            data_dir: None,
            backup_retention: DEFAULT_BACKUP_RETENTION,
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, BudgetError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, BudgetError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, BudgetError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let mut config: Config = serde_json::from_str(&data)?;
        if config.horizon_months == 0 {
            tracing::warn!(
                "configured horizon of 0 months is unusable; using {}",
                DEFAULT_HORIZON_MONTHS
            );
            config.horizon_months = DEFAULT_HORIZON_MONTHS;
        }
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), BudgetError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    /// Directory holding ledgers and backups for `config`.
    pub fn data_root(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| self.base.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
