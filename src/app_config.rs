//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// TOML-backed file configuration for harvester defaults.
///
/// Every key is optional; unset keys fall back to built-in defaults, and CLI
/// flags override both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Object endpoint of the collection API.
    pub base_url: Option<String>,
    /// Metadata output file.
    pub output: Option<PathBuf>,
    /// Directory for downloaded images.
    pub images_dir: Option<PathBuf>,
    /// Minimum delay between records in milliseconds.
    pub rate_limit_ms: Option<u64>,
    /// Stored records between checkpoints.
    pub checkpoint_interval: Option<u32>,
    /// Records processed at once.
    pub concurrency: Option<u8>,
    /// Whether `run` downloads images.
    pub download_images: Option<bool>,
    /// Total timeout of a record fetch in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// Total timeout of an image download in seconds.
    pub download_timeout_secs: Option<u64>,
    /// Records between progress log lines.
    pub progress_interval: Option<u32>,
    /// Append logs to this file.
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(1..=32).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=32");
        }

        if let Some(rate_limit) = self.rate_limit_ms
            && rate_limit > 60_000
        {
            bail!("Invalid config value for `rate_limit_ms`: {rate_limit}. Expected range: 0..=60000");
        }
        validate_at_least_one("checkpoint_interval", self.checkpoint_interval)?;
        validate_at_least_one("progress_interval", self.progress_interval)?;
        validate_timeout_secs("fetch_timeout_secs", self.fetch_timeout_secs)?;
        validate_timeout_secs("download_timeout_secs", self.download_timeout_secs)?;

        if let Some(base_url) = self.base_url.as_deref()
            && url::Url::parse(base_url).is_err()
        {
            bail!("Invalid config value for `base_url`: '{base_url}' is not an absolute URL");
        }

        Ok(())
    }
}

fn validate_at_least_one(field: &str, value: Option<u32>) -> Result<()> {
    if value == Some(0) {
        bail!("Invalid config value for `{field}`: 0. Expected a value of at least 1");
    }
    Ok(())
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/harvester/config.toml`
/// 2. `$HOME/.config/harvester/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("harvester")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("harvester")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional: when it is
/// missing, defaults apply.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
            loaded_from_file: true,
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig::default());
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
        loaded_from_file: true,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let cfg: FileConfig = toml::from_str(raw)?;
    cfg.validate()?;
    Ok(cfg)
}
