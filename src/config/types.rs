// src/config/types.rs
use crate::auc::AucConfig;
use crate::montecarlo::MonteCarloConfig;
use serde::{Deserialize, Serialize};

/// File looked up in the working directory by [`Config::load_local`].
pub const CONFIG_FILE: &str = "linkshield.toml";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Seed for every random choice; a random one is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub auc: AucConfig,
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
}
