use std::env;
use std::path::{Path, PathBuf};

use fleeting_upcloud::{ConnectorConfig, GroupConfig, Settings};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingEnv(&'static str),

    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub group: GroupConfig,
    pub settings: Settings,
}

impl AppConfig {
    /// Load from env vars:
    ///
    /// - `FLEETING_UPCLOUD_CONFIG` (required): path to the group config JSON
    /// - `FLEETING_UPCLOUD_SSH_USERNAME` (optional): login user for new servers
    /// - `FLEETING_UPCLOUD_SSH_KEY_PATH` (optional): private key file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config_path =
            var("FLEETING_UPCLOUD_CONFIG").ok_or(ConfigError::MissingEnv("FLEETING_UPCLOUD_CONFIG"))?;
        let group = load_group_config(Path::new(&config_path))?;

        let key = match var("FLEETING_UPCLOUD_SSH_KEY_PATH") {
            Some(path) => std::fs::read(&path).map_err(|source| ConfigError::Read {
                path: path.into(),
                source,
            })?,
            None => Vec::new(),
        };

        let connector = ConnectorConfig {
            username: var("FLEETING_UPCLOUD_SSH_USERNAME").unwrap_or_default(),
            key,
            ..Default::default()
        };

        Ok(Self {
            group,
            settings: Settings { connector },
        })
    }
}

fn load_group_config(path: &Path) -> Result<GroupConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
