use std::path::PathBuf;
use std::time::Duration;

use crate::data::loader::{DataSource, FetchOptions};

// ---------------------------------------------------------------------------
// Startup configuration from the environment
// ---------------------------------------------------------------------------

/// Remote CSV to use instead of the built-in dataset.
pub const ENV_DATA_URL: &str = "CINESCOPE_DATA_URL";
/// Local file to load instead of any URL.
pub const ENV_DATA_FILE: &str = "CINESCOPE_DATA_FILE";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "CINESCOPE_FETCH_TIMEOUT_SECS";
pub const ENV_FETCH_RETRIES: &str = "CINESCOPE_FETCH_RETRIES";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub source: DataSource,
    pub fetch: FetchOptions,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = match (get(ENV_DATA_FILE), get(ENV_DATA_URL)) {
            (Some(path), _) => DataSource::File(PathBuf::from(path)),
            (None, Some(url)) => DataSource::Remote(url),
            (None, None) => DataSource::default(),
        };

        let mut fetch = FetchOptions::default();
        let number = |key: &str| get(key).and_then(|v| parse_or_warn::<u64>(key, &v));
        match number(ENV_FETCH_TIMEOUT_SECS) {
            Some(0) => log::warn!("Ignoring {ENV_FETCH_TIMEOUT_SECS}=0: timeout must be positive"),
            Some(secs) => fetch.timeout = Duration::from_secs(secs),
            None => {}
        }
        if let Some(retries) = number(ENV_FETCH_RETRIES) {
            fetch.retries = u32::try_from(retries).unwrap_or(u32::MAX);
        }

        Config { source, fetch }
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {key}={value:?}: not a valid number");
            None
        }
    }
}
