use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

pub const DEFAULT_OWNER: &str = "default";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "R$";

#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Owner used when `--owner` is not given.
    pub owner: Option<String>,
    pub currency_symbol: Option<String>,
    /// Target km/l shown next to the measured average.
    pub fuel_efficiency_goal: Option<f64>,
    /// Where fuel logs are stored.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn owner(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.owner.clone())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string())
    }

    pub fn currency_symbol(&self) -> &str {
        self.currency_symbol
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY_SYMBOL)
    }
}

pub fn load_config() -> Config {
    let Some(dirs) = ProjectDirs::from("", "", "copiloto") else {
        return Config::default();
    };
    load_config_from(&dirs.config_dir().join("config.toml"))
}

fn load_config_from(path: &Path) -> Config {
    let Ok(data) = fs::read_to_string(path) else {
        return Config::default();
    };

    match toml::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Config::default()
        }
    }
}
