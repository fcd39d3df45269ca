// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! Every section is optional; an empty file yields [`Config::default`].
//! Any out-of-range value is rejected before the store is opened.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LinkError, LinkResult};

/// Upper bound for `lock_timeout_ms`.
const MAX_LOCK_TIMEOUT_MS: u64 = 60_000;

/// Raw storage section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorageConfig {
    #[serde(default = "default_data_dir")]
    data_dir: String,
    #[serde(default = "default_mappings_file")]
    mappings_file: String,
    #[serde(default = "default_history_file")]
    history_file: String,
    #[serde(default = "default_lock_timeout_ms")]
    lock_timeout_ms: u64,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_mappings_file() -> String {
    "mappings.txt".to_string()
}

fn default_history_file() -> String {
    "history.txt".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    2000 // fail rather than hang behind a stuck writer
}

impl Default for RawStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            mappings_file: default_mappings_file(),
            history_file: default_history_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Raw gateway section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGatewayConfig {
    #[serde(default = "default_bind")]
    bind: String,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for RawGatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    storage: RawStorageConfig,
    #[serde(default)]
    gateway: RawGatewayConfig,
}

/// Validated storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub mappings_file: String,
    pub history_file: String,
    pub lock_timeout: Duration,
}

impl StorageConfig {
    /// Storage rooted at `data_dir` with default file names and timeout.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn mappings_path(&self) -> PathBuf {
        self.data_dir.join(&self.mappings_file)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    /// Sidecar locked for the duration of a table transaction.
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.lock", self.mappings_file))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let raw = RawStorageConfig::default();
        Self {
            data_dir: PathBuf::from(raw.data_dir),
            mappings_file: raw.mappings_file,
            history_file: raw.history_file,
            lock_timeout: Duration::from_millis(raw.lock_timeout_ms),
        }
    }
}

/// Validated gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub bind: IpAddr,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::from([0, 0, 0, 0]),
            port: default_port(),
        }
    }
}

/// Complete validated configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageConfig,
    pub gateway: GatewayConfig,
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> LinkResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LinkError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| LinkError::StorageUnavailable {
                context: "reading config file",
                path: path.to_path_buf(),
                source: e,
            })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> LinkResult<Config> {
        // An empty document parses to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Self::validate(RawConfig::default());
        }

        let raw: RawConfig = serde_yaml::from_str(content).map_err(|e| LinkError::ConfigParse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> LinkResult<Config> {
        Ok(Config {
            storage: Self::validate_storage(raw.storage)?,
            gateway: Self::validate_gateway(raw.gateway)?,
        })
    }

    fn validate_storage(raw: RawStorageConfig) -> LinkResult<StorageConfig> {
        if raw.data_dir.trim().is_empty() {
            return Err(LinkError::ConfigInvalid {
                field: "storage.data_dir",
                value: raw.data_dir,
                reason: "Data directory cannot be empty".to_string(),
            });
        }

        Self::validate_file_name("storage.mappings_file", &raw.mappings_file)?;
        Self::validate_file_name("storage.history_file", &raw.history_file)?;

        if raw.mappings_file == raw.history_file {
            return Err(LinkError::ConfigInvalid {
                field: "storage.history_file",
                value: raw.history_file,
                reason: "History ledger must not share a file with the mappings table"
                    .to_string(),
            });
        }

        if raw.history_file == format!("{}.lock", raw.mappings_file) {
            return Err(LinkError::ConfigInvalid {
                field: "storage.history_file",
                value: raw.history_file,
                reason: "History ledger must not share a file with the table lock".to_string(),
            });
        }

        if raw.lock_timeout_ms == 0 || raw.lock_timeout_ms > MAX_LOCK_TIMEOUT_MS {
            return Err(LinkError::ConfigInvalid {
                field: "storage.lock_timeout_ms",
                value: raw.lock_timeout_ms.to_string(),
                reason: format!("Must be between 1 and {}", MAX_LOCK_TIMEOUT_MS),
            });
        }

        Ok(StorageConfig {
            data_dir: PathBuf::from(raw.data_dir),
            mappings_file: raw.mappings_file,
            history_file: raw.history_file,
            lock_timeout: Duration::from_millis(raw.lock_timeout_ms),
        })
    }

    /// File names live directly inside `data_dir`.
    fn validate_file_name(field: &'static str, name: &str) -> LinkResult<()> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains('/')
            && !name.contains('\\');
        if !plain {
            return Err(LinkError::ConfigInvalid {
                field,
                value: name.to_string(),
                reason: "Must be a plain file name without directory components".to_string(),
            });
        }
        Ok(())
    }

    fn validate_gateway(raw: RawGatewayConfig) -> LinkResult<GatewayConfig> {
        let bind = raw
            .bind
            .parse::<IpAddr>()
            .map_err(|e| LinkError::ConfigInvalid {
                field: "gateway.bind",
                value: raw.bind.clone(),
                reason: e.to_string(),
            })?;

        if raw.port == 0 {
            return Err(LinkError::ConfigInvalid {
                field: "gateway.port",
                value: "0".to_string(),
                reason: "Port 0 is reserved and cannot be used".to_string(),
            });
        }

        Ok(GatewayConfig {
            bind,
            port: raw.port,
        })
    }
}
