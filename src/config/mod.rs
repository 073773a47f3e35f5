// src/config/mod.rs
pub mod types;

pub use self::types::{Config, CONFIG_FILE};

use crate::auc::AucEvaluator;
use crate::error::{Result, ShieldError};
use std::path::Path;
use tracing::debug;

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and validates a TOML config file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, `Config` if it does not parse
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ShieldError::Io {
            source,
            path: path.to_path_buf(),
        })?;
        let config = Self::parse_toml(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Loads [`CONFIG_FILE`] from the working directory, or the defaults if
    /// there is none.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_local() -> Result<Self> {
        Self::load_in(Path::new("."))
    }

    /// Loads [`CONFIG_FILE`] from `dir`, or the defaults if there is none.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_in(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// # Errors
    /// Returns `Config` on a syntax error, an unknown key or an invalid value.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns `Config` naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.monte_carlo.validate()
    }

    /// # Errors
    /// Returns `Config` if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ShieldError::Config(e.to_string()))
    }

    /// The configured seed, or `fallback` when none is set.
    #[must_use]
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }

    #[must_use]
    pub fn evaluator(&self, seed: u64) -> AucEvaluator {
        AucEvaluator::new(self.auc, self.monte_carlo, seed)
    }
}
