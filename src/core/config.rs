use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate.host";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub access_key: Option<String>,
    pub timeout_secs: u64,
    /// Extra attempts per day on transport errors.
    pub retries: usize,
    /// Maximum number of days fetched at once.
    pub concurrency: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_key: None,
            timeout_secs: 10,
            retries: 0,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Csv,
    Fjall,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DefaultsConfig {
    pub lookback_days: u32,
    pub horizon: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            lookback_days: 30,
            horizon: 5,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            width: 1200,
            height: 600,
        }
    }
}

/// End anchor of the lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceDate {
    Today,
    Fixed(NaiveDate),
}

impl ReferenceDate {
    pub fn resolve(&self) -> NaiveDate {
        match self {
            ReferenceDate::Today => Utc::now().date_naive(),
            ReferenceDate::Fixed(date) => *date,
        }
    }
}

impl From<Option<NaiveDate>> for ReferenceDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(ReferenceDate::Today, ReferenceDate::Fixed)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    /// Pins the lookback window to a fixed end date; today when absent.
    pub reference_date: Option<NaiveDate>,
    pub data_path: Option<String>,
    pub storage: StorageBackend,
    pub defaults: DefaultsConfig,
    pub chart: ChartConfig,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// it has not been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxtrend", "fxtrend")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "fxtrend", "fxtrend")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn reference(&self) -> ReferenceDate {
        self.reference_date.into()
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
