//! Layered server configuration.
//!
//! Sources, lowest priority first:
//! 1. compiled defaults ([`Config::default`])
//! 2. `tasklist.toml` in the working directory, or the file named by
//!    `TASKLIST_CONFIG`
//! 3. `TASKLIST_*` environment variables (`TASKLIST_PORT=8080`)

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "tasklist.toml";
const ENV_PREFIX: &str = "TASKLIST_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: PathBuf::from("data/tasks.db"),
            log_filter: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        let path = std::env::var(format!("{ENV_PREFIX}CONFIG"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::figment(&path).extract()
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }
}
