//! Connection settings
//!
//! Stored as a JSON file, by default `<config dir>/cdm-query/settings.json`.
//! Every field is optional; missing fields fall back to a local, unsecured
//! OpenSearch on port 9200.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::correlate::DuplicatePolicy;
use crate::error::{Error, Result};

const SQL_ENDPOINT: &str = "/_plugins/_sql";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_credential")]
    pub username: String,
    #[serde(default = "default_credential")]
    pub password: String,
    #[serde(default)]
    pub use_ssl: bool,
    /// Only meaningful with `use_ssl`; off accepts self-signed certificates.
    #[serde(default)]
    pub verify_certs: bool,
    /// Indices are `<prefix>-metric_desc`, `<prefix>-metric_data`, `<prefix>-param`
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub duplicate_params: DuplicatePolicy,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_credential() -> String {
    "admin".to_string()
}

fn default_index_prefix() -> String {
    "cdmv8dev".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_credential(),
            password: default_credential(),
            use_ssl: false,
            verify_certs: false,
            index_prefix: default_index_prefix(),
            timeout_secs: default_timeout(),
            duplicate_params: DuplicatePolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist. The default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::read(p),
            None => match default_path() {
                Some(p) if p.exists() => Self::read(&p),
                _ => {
                    debug!("no settings file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Configuration(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn endpoint(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, SQL_ENDPOINT)
    }
}

/// `<config dir>/cdm-query/settings.json`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("cdm-query").join("settings.json"))
}
