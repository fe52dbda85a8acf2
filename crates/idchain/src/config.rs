//! Runtime configuration, read from the environment.

use std::path::PathBuf;

use idchain_store::FileStoreConfig;

/// Store location when `IDENTITY_STORE_PATH` is unset.
pub const DEFAULT_STORE_PATH: &str = "./data/chains.json";

/// Log filter when `IDENTITY_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

pub const ENV_STORE_PATH: &str = "IDENTITY_STORE_PATH";
pub const ENV_DURABLE_COMMIT: &str = "IDENTITY_DURABLE_COMMIT";
pub const ENV_LOG: &str = "IDENTITY_LOG";

/// Configuration for the service and its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Location of the chain document.
    pub store_path: PathBuf,
    /// Flush each commit to stable storage before it becomes visible.
    pub durable_commit: bool,
    /// `tracing` filter directive for the binary.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            durable_commit: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset and empty values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            store_path: get(ENV_STORE_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            durable_commit: get(ENV_DURABLE_COMMIT)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.durable_commit),
            log_filter: get(ENV_LOG).unwrap_or(defaults.log_filter),
        }
    }

    pub fn store_config(&self) -> FileStoreConfig {
        FileStoreConfig::new(&self.store_path).with_durable_commit(self.durable_commit)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
