use anyhow::{Context, Result};
use chrono::NaiveDate;
use izettle_visma::config::DEFAULT_VOUCHER_TEXT;
use izettle_visma::{DateWindow, ReconcileConfig, UserMapping, UserMappings};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigAccounts {
    pub ledger: u32,
    #[serde(default)]
    pub bank: Vec<u32>,
    pub other_income: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigBookkeeping {
    #[serde(default = "default_project")]
    pub uncategorized_project: String,
    #[serde(default = "default_voucher_text")]
    pub voucher_text: String,
}

impl Default for ConfigBookkeeping {
    fn default() -> Self {
        ConfigBookkeeping {
            uncategorized_project: default_project(),
            voucher_text: default_voucher_text(),
        }
    }
}

fn default_project() -> String {
    "1".to_owned()
}

fn default_voucher_text() -> String {
    DEFAULT_VOUCHER_TEXT.to_owned()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigWindow {
    pub from: NaiveDate,
    /// Days before today that are still left alone.
    #[serde(default = "default_lag_days")]
    pub lag_days: u32,
}

fn default_lag_days() -> u32 {
    2
}

#[derive(Debug, Deserialize)]
#[serde(try_from = "RawConfigUsers")]
pub struct ConfigUsers {
    pub separator: String,
    pub mappings: UserMappings,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigUsers {
    #[serde(default = "default_separator")]
    separator: String,
    #[serde(default)]
    mappings: Vec<(String, String)>,
}

fn default_separator() -> String {
    ".".to_owned()
}

impl TryFrom<RawConfigUsers> for ConfigUsers {
    type Error = String;

    fn try_from(raw: RawConfigUsers) -> Result<Self, Self::Error> {
        if raw.mappings.is_empty() {
            return Err("users section must map at least one iZettle user".to_string());
        }
        let mappings = raw
            .mappings
            .into_iter()
            .map(|(izettle, visma)| UserMapping::new(izettle, visma))
            .collect();
        let mappings = UserMappings::new(mappings).map_err(|error| error.to_string())?;
        Ok(ConfigUsers {
            separator: raw.separator,
            mappings,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSnapshot {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub accounts: ConfigAccounts,
    #[serde(default)]
    pub bookkeeping: ConfigBookkeeping,
    pub window: ConfigWindow,
    pub users: ConfigUsers,
    #[serde(default)]
    pub snapshot: ConfigSnapshot,
}

/// Looked up in this order when no config file is given.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["izettle-visma.toml", ".izettle-visma.toml"];

impl Config {
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads a config file. A relative snapshot `dir` is taken relative to the file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        if let Some(dir) = config.snapshot.dir.as_mut()
            && let Some(config_dir) = path.parent()
        {
            let resolved = config_dir.join(&*dir);
            *dir = resolved;
        }
        Ok(config)
    }

    pub fn find_in(dir: &Path) -> Result<Option<Self>> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .map(|path| Self::load_from_file(&path))
            .transpose()
    }

    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig::new(
            self.accounts.ledger,
            self.accounts.other_income,
            self.users.mappings.clone(),
        )
        .with_bank_accounts(self.accounts.bank.iter().copied())
        .with_uncategorized_project(&self.bookkeeping.uncategorized_project)
        .with_voucher_text(&self.bookkeeping.voucher_text)
    }

    pub fn window(&self, today: NaiveDate) -> DateWindow {
        DateWindow::with_lag(self.window.from, today, self.window.lag_days)
    }

    pub fn snapshot_dir(&self) -> Option<&Path> {
        self.snapshot.dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[accounts]
ledger = 1690
bank = [1930, 1940]
other_income = 3110

[bookkeeping]
uncategorized_project = "7"

[window]
from = "2021-01-01"
lag_days = 3

[users]
mappings = [
    ["DaltonZ", "DaltonZ"],
    ["ZnollK", "ZØK"],
]

[snapshot]
dir = "data"
"#;

    #[test]
    fn parse_full_config() {
        let config = Config::parse(FULL).unwrap();
        let reconcile = config.reconcile_config();

        assert_eq!(reconcile.ledger_account, 1690);
        assert!(reconcile.bank_accounts.contains(&1940));
        assert_eq!(reconcile.other_income_account, 3110);
        assert_eq!(reconcile.uncategorized_project, "7");
        assert_eq!(reconcile.voucher_text, DEFAULT_VOUCHER_TEXT);
        assert!(reconcile.user_mappings.contains("ZnollK", "ZØK"));
        assert_eq!(config.users.separator, ".");

        let window = config.window("2021-03-10".parse().unwrap());
        assert_eq!(window.from, "2021-01-01".parse::<NaiveDate>().unwrap());
        assert_eq!(window.to, "2021-03-07".parse::<NaiveDate>().unwrap());

        assert_eq!(config.snapshot_dir(), Some(Path::new("data")));
    }

    #[test]
    fn defaults() {
        let config = Config::parse(
            r#"
[accounts]
ledger = 1690
other_income = 3110

[window]
from = "2021-01-01"

[users]
separator = " "
mappings = [["Zenith", "Zenith"]]
"#,
        )
        .unwrap();

        assert_eq!(config.window.lag_days, 2);
        assert!(config.accounts.bank.is_empty());
        assert_eq!(config.bookkeeping.uncategorized_project, "1");
        assert_eq!(config.users.separator, " ");
        assert_eq!(config.snapshot_dir(), None);
    }

    #[test]
    fn duplicate_mapping_is_rejected() {
        let err = Config::parse(
            r#"
[accounts]
ledger = 1690
other_income = 3110

[window]
from = "2021-01-01"

[users]
mappings = [["Zenith", "Zenith"], ["Zenith", "ZIK"]]
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("more than one cost center"), "{err}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse(
            r#"
[accounts]
ledger = 1690
other_income = 3110
legder = 1

[window]
from = "2021-01-01"

[users]
mappings = [["Zenith", "Zenith"]]
"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("legder"), "{err}");
    }

    #[test]
    fn snapshot_dir_is_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("izettle-visma.toml");
        std::fs::write(&path, FULL).unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.accounts.ledger, 1690);
        assert_eq!(config.snapshot_dir(), Some(dir.path().join("data").as_path()));
    }

    #[test]
    fn find_in_tries_hidden_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::find_in(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(".izettle-visma.toml"), FULL).unwrap();
        let config = Config::find_in(dir.path()).unwrap().unwrap();

        assert_eq!(config.bookkeeping.uncategorized_project, "7");
    }

    #[test]
    fn load_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("izettle-visma.toml");
        std::fs::write(&path, "[accounts]\nledger = \"x\"\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();

        assert!(err.to_string().contains("izettle-visma.toml"), "{err}");
    }
}
