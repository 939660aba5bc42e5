use anyhow::{Context, Result};
use chrono::NaiveDate;
use movs_finance::RuleTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_movs_home;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Statement files used when none are given on the command line.
    pub data_paths: Vec<String>,
    /// Seed date of the running balance (default 2008-01-01).
    pub epoch: Option<NaiveDate>,
    /// TOML rule table replacing the built-in one.
    pub rules: Option<String>,
}

impl Config {
    pub fn rule_table(&self) -> Result<RuleTable> {
        match &self.rules {
            Some(path) => load_rule_table(Path::new(path)),
            None => Ok(RuleTable::builtin()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_movs_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn load_rule_table(path: &Path) -> Result<RuleTable> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse rule table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let cfg = parse_config("data_paths = [\"a.txt\"]\n").unwrap();
        assert_eq!(cfg.data_paths, vec!["a.txt".to_string()]);
        assert_eq!(cfg.epoch, None);
        assert_eq!(cfg.rules, None);
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let cfg = Config {
            data_paths: vec!["/data/BPOL.txt".into(), "/data/buoni.xlsx".into()],
            epoch: NaiveDate::from_ymd_opt(2010, 1, 1),
            rules: Some("/data/rules.toml".into()),
        };
        let s = toml::to_string_pretty(&cfg).unwrap();
        assert!(s.contains("epoch = \"2010-01-01\""), "{s}");
        assert_eq!(parse_config(&s).unwrap(), cfg);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let err = parse_config("epoch = \"yesterday\"").unwrap_err();
        assert!(format!("{err:#}").contains("parse config.toml"));
    }

    #[test]
    fn test_builtin_rules_without_override() {
        let table = Config::default().rule_table().unwrap();
        assert_eq!(table, RuleTable::builtin());
    }
}
