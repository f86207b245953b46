use std::{env, path::PathBuf};

const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_PORT: u16 = 8080;
/// Roughly what browsers grant a single origin's local storage.
const DEFAULT_STORAGE_QUOTA: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub storage_quota: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let storage_quota = lookup("APP_STORAGE_QUOTA_BYTES")
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_STORAGE_QUOTA);

        Self {
            data_path,
            port,
            storage_quota,
        }
    }
}
