//! Application configuration management.
//!
//! Configuration is stored at `~/.config/dexcache/config.json`. Every field
//! is optional; unset fields fall back to the PokeAPI defaults. The
//! `DEXCACHE_API_URL` and `DEXCACHE_CACHE_DIR` environment variables
//! override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_API_BASE_URL, DEFAULT_CATALOG_LIMIT, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "dexcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const ENV_API_URL: &str = "DEXCACHE_API_URL";
const ENV_CACHE_DIR: &str = "DEXCACHE_CACHE_DIR";

/// Subdirectory of the cache dir for catalog and detail records
const RECORDS_SUBDIR: &str = "records";

/// Subdirectory of the cache dir for image blobs
const IMAGES_SUBDIR: &str = "images";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub catalog_limit: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = Some(url);
        }
        if let Some(dir) = var(ENV_CACHE_DIR).filter(|v| !v.is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn catalog_limit(&self) -> u32 {
        self.catalog_limit.unwrap_or(DEFAULT_CATALOG_LIMIT)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn records_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(RECORDS_SUBDIR))
    }

    pub fn images_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join(IMAGES_SUBDIR))
    }
}
