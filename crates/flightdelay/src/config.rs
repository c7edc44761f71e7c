//! Layered settings for the `flightdelay` binary.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file,
//! `FLIGHTDELAY_` environment variables. Nested keys in the environment use
//! `__`, e.g. `FLIGHTDELAY_ANALYTICS__TOP_K=5`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::analytics::DEFAULT_FREQUENT_K;
use crate::error::{Error, Result};

const APP_DIR: &str = "flightdelay";
const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "flights.db";
const ENV_PREFIX: &str = "FLIGHTDELAY_";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where flights are stored.
    pub storage: StorageConfig,
    /// Defaults for the analysis commands.
    pub analytics: AnalyticsConfig,
    /// Sample data generation.
    pub generation: GenerationConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file. Unset means `<data dir>/flightdelay/flights.db`.
    pub database_path: Option<PathBuf>,
}

/// `[analytics]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// `k` for `top` when `-k` is not given.
    pub top_k: i64,
    /// `k` for `frequent` when `-k` is not given.
    pub frequent_k: i64,
    /// Rows printed by `sorted` when `--limit` is not given.
    pub display_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            frequent_k: DEFAULT_FREQUENT_K,
            display_limit: 20,
        }
    }
}

/// `[generation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Flights per batch `generate`.
    pub batch_size: usize,
    /// Flights per `generate --realtime`.
    pub realtime_count: usize,
    /// Fixed seed; unset draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            realtime_count: 10,
            seed: None,
        }
    }
}

impl Config {
    /// Load from the default file location.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load using `config_path` instead of the default file, if given.
    ///
    /// A missing file is not an error; defaults and the environment still
    /// apply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigLoad`] if a source cannot be parsed and
    /// [`Error::ConfigValidation`] if the merged values are unusable.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let path = config_path.unwrap_or_else(Self::default_config_path);
        let config: Self = Self::figment(&path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Provider chain for a given config file.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// `<config dir>/flightdelay/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR)
            .join(CONFIG_FILE_NAME)
    }

    /// `<local data dir>/flightdelay`.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(APP_DIR)
    }

    /// Reject negative `k` defaults and zero sizes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        let signed = [
            ("analytics.top_k", self.analytics.top_k),
            ("analytics.frequent_k", self.analytics.frequent_k),
        ];
        if let Some((name, value)) = signed.into_iter().find(|(_, v)| *v < 0) {
            return Err(invalid(format!("{name} ({value}) must not be negative")));
        }

        let sizes = [
            ("analytics.display_limit", self.analytics.display_limit),
            ("generation.batch_size", self.generation.batch_size),
            ("generation.realtime_count", self.generation.realtime_count),
        ];
        if let Some((name, _)) = sizes.into_iter().find(|(_, v)| *v == 0) {
            return Err(invalid(format!("{name} must be greater than 0")));
        }

        Ok(())
    }

    /// Configured database file, or the default location.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}
