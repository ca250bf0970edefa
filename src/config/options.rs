// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    pub fetch: FetchOptions,
    pub store: StoreOptions,
}

impl AppOptions {
    /// Load options from a JSON file. Keys left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub base_url: String,
    pub search_path: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            search_path: SEARCH_PATH.to_string(),
            timeout_secs: TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl FetchOptions {
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.search_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// One card set and the catalog file it lives in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetDef {
    pub key: String,
    pub prefix: String,
    pub file: String,
}

impl SetDef {
    pub fn new(key: &str, prefix: &str, file: &str) -> Self {
        Self { key: key.to_string(), prefix: prefix.to_string(), file: file.to_string() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub data_dir: PathBuf,
    pub snapshot_file: String,
    pub sets: Vec<SetDef>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            snapshot_file: SNAPSHOT_FILE.to_string(),
            sets: DEFAULT_SETS.iter().map(|(k, p, f)| SetDef::new(k, p, f)).collect(),
        }
    }
}

impl StoreOptions {
    /// Resolve a user-supplied set by key or prefix, case-insensitive.
    pub fn find_set(&self, name: &str) -> Option<&SetDef> {
        let name = name.trim();
        self.sets
            .iter()
            .find(|s| s.key.eq_ignore_ascii_case(name) || s.prefix.eq_ignore_ascii_case(name))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }
}
