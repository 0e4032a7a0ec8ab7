use std::path::{Path, PathBuf};

use farm_core::{BalanceError, GameBalance};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "pumpkin-patch.toml";
pub const DEFAULT_SQLITE_PATH: &str = "pumpkin_patch.sqlite";
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
/// The web client asks for this player id until it creates its own.
pub const DEFAULT_PLAYER_ID: &str = "default";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid balance: {0}")]
    Balance(#[from] BalanceError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub sqlite_path: PathBuf,
    pub seed_default_player: bool,
    pub debug_routes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            sqlite_path: PathBuf::from(DEFAULT_SQLITE_PATH),
            seed_default_player: true,
            debug_routes: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    pub server: ServerConfig,
    pub balance: GameBalance,
}

impl FarmConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// An explicit path must exist. Without one, `pumpkin-patch.toml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.exists() {
                    tracing::info!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config =
            Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse { path, source })?;
        config.balance.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, addr: Option<String>, sqlite_path: Option<PathBuf>) -> Self {
        if let Some(addr) = addr.filter(|addr| !addr.trim().is_empty()) {
            self.server.addr = addr;
        }
        if let Some(path) = sqlite_path.filter(|path| !path.as_os_str().is_empty()) {
            self.server.sqlite_path = path;
        }
        self
    }
}
