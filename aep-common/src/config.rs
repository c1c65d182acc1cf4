//! Configuration resolution for the ETL pipeline
//!
//! Settings resolve in priority order: environment (`AEP_*`) > TOML config
//! file > compiled defaults. CLI flags override individual fields on top of
//! the resolved settings (handled by the binary).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{Error, Result};

/// Resolved pipeline settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Portal base URL.
    pub base_url: String,
    /// SQLite connection string for the metric store.
    pub database_url: String,
    /// Directory for raw/formatted artifacts and the validation report.
    pub reports_dir: PathBuf,
    /// Base inter-request delay between successful country fetches.
    pub throttle_ms: u64,
    /// Attempts per country before downgrading to a placeholder row.
    pub max_retries: u32,
    /// Per-attempt fetch timeout.
    pub fetch_timeout_secs: u64,
    /// Concurrency ceiling for the per-country fan-out.
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://africa-energy-portal.org".to_string(),
            database_url: "sqlite://aep.db?mode=rwc".to_string(),
            reports_dir: PathBuf::from("reports"),
            throttle_ms: 300,
            max_retries: 3,
            fetch_timeout_secs: 60,
            concurrency: 4,
        }
    }
}

/// On-disk TOML shape; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub base_url: Option<String>,
    pub database_url: Option<String>,
    pub reports_dir: Option<PathBuf>,
    pub throttle_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub fetch_timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
}

impl TomlConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read config failed ({}): {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse config failed ({}): {}", path.display(), e)))
    }
}

impl Settings {
    /// Resolve settings from environment and TOML config.
    ///
    /// `config_path` overrides the default location
    /// (`<config dir>/aep-etl/config.toml`). A missing default file is not
    /// an error; an explicitly named file that fails to load is.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        let toml_config = match config_path {
            Some(path) => TomlConfig::load(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => TomlConfig::load(&path)?,
                _ => TomlConfig::default(),
            },
        };

        let defaults = Settings::default();

        Ok(Self {
            base_url: env_string("AEP_BASE_URL")
                .or(toml_config.base_url)
                .unwrap_or(defaults.base_url),
            database_url: env_string("AEP_DATABASE_URL")
                .or(toml_config.database_url)
                .unwrap_or(defaults.database_url),
            reports_dir: env_string("AEP_REPORTS_DIR")
                .map(PathBuf::from)
                .or(toml_config.reports_dir)
                .unwrap_or(defaults.reports_dir),
            throttle_ms: env_parse("AEP_THROTTLE_MS")
                .or(toml_config.throttle_ms)
                .unwrap_or(defaults.throttle_ms),
            max_retries: env_parse("AEP_MAX_RETRIES")
                .or(toml_config.max_retries)
                .unwrap_or(defaults.max_retries),
            fetch_timeout_secs: env_parse("AEP_FETCH_TIMEOUT_SECS")
                .or(toml_config.fetch_timeout_secs)
                .unwrap_or(defaults.fetch_timeout_secs),
            concurrency: env_parse("AEP_CONCURRENCY")
                .or(toml_config.concurrency)
                .unwrap_or(defaults.concurrency),
        })
    }
}

/// Default config file location for the platform.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("aep-etl").join("config.toml"))
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_string(name)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}
