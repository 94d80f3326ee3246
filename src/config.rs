use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::retry::RetryPolicy;
use crate::domain::fee::FeeSettings;
use crate::ledger::DEFAULT_RETENTION_SECS;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainCfg {
    #[serde(default = "default_lcd_url")]
    pub lcd_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default = "default_factory_address")]
    pub factory_address: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_lcd_url() -> String {
    "https://terra-classic-lcd.publicnode.com".to_string()
}

fn default_chain_id() -> String {
    "columbus-5".to_string()
}

// Terra Classic mainnet Terraswap factory
fn default_factory_address() -> String {
    "terra1jkndu9w5attpz09ut02sgey5dd3e8sq5watzm0".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ChainCfg {
    fn default() -> Self {
        Self {
            lcd_url: default_lcd_url(),
            chain_id: default_chain_id(),
            factory_address: default_factory_address(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreCfg {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Records older than this horizon are eligible for the purge reaper.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: i64,
}

fn default_db_path() -> String {
    "swaps.db".to_string()
}

fn default_retention_secs() -> i64 {
    DEFAULT_RETENTION_SECS
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            retention_secs: default_retention_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryCfg {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

impl Default for RetryCfg {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryCfg {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainCfg,
    #[serde(default)]
    pub fees: FeeSettings,
    #[serde(default)]
    pub store: StoreCfg,
    #[serde(default)]
    pub retry: RetryCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        let cfg: Self = toml::from_str(&s).context("parse Config.toml")?;
        Ok(cfg)
    }
}
