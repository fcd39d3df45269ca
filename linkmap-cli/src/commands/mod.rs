// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod history;
pub mod list;
pub mod lookup;
pub mod resolve;
pub mod serve;
pub mod validate;

use std::path::Path;

use linkmap_core::{Config, ConfigLoader, LinkResult, MappingStore};

/// Config file read when `--config` is not given.
const DEFAULT_CONFIG_PATH: &str = "linkmap.yaml";

/// Resolve the effective configuration.
///
/// An explicit `--config` must exist. The default path is optional and falls
/// back to built-in defaults. `--data-dir` wins over the file.
pub fn load_config(explicit: Option<&str>, data_dir: Option<&str>) -> LinkResult<Config> {
    let mut config = match explicit {
        Some(path) => ConfigLoader::load_file(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            ConfigLoader::load_file(DEFAULT_CONFIG_PATH)?
        }
        None => {
            tracing::debug!("No configuration file, using defaults");
            Config::default()
        }
    };

    if let Some(dir) = data_dir {
        config.storage.data_dir = dir.into();
    }
    Ok(config)
}

/// Open the store described by `config`.
pub fn open_store(config: &Config) -> LinkResult<MappingStore> {
    MappingStore::open(config.storage.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_explicit_missing_config_fails() {
        let result = load_config(Some("/nonexistent/linkmap.yaml"), None);
        assert!(matches!(
            result,
            Err(linkmap_core::LinkError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_data_dir_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("linkmap.yaml");
        std::fs::write(&path, "storage:\n  data_dir: /from/file\n").unwrap();

        let config = load_config(path.to_str(), Some("/from/flag")).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/from/flag"));

        let config = load_config(path.to_str(), None).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/from/file"));
    }
}
