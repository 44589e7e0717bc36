//! Configuration lifecycle: merge CLI flags over the config file over built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use harvester_core::catalog::DEFAULT_BASE_URL;
use harvester_core::download::constants::{
    DEFAULT_RATE_LIMIT_MS, DOWNLOAD_TIMEOUT_SECS, FETCH_TIMEOUT_SECS,
};
use harvester_core::pipeline::DEFAULT_PROGRESS_INTERVAL;
use harvester_core::{DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_CONCURRENCY};

use crate::app_config::FileConfig;
use crate::cli::{DEFAULT_ID_LIST, DEFAULT_METADATA_FILE, RunArgs};

/// Default directory for downloaded images.
pub(crate) const DEFAULT_IMAGES_DIR: &str = "met-images";

/// Effective settings of a `run` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunSettings {
    pub(crate) input: PathBuf,
    pub(crate) output: PathBuf,
    pub(crate) images_dir: PathBuf,
    pub(crate) base_url: String,
    pub(crate) rate_limit: Duration,
    pub(crate) checkpoint_interval: usize,
    pub(crate) concurrency: usize,
    pub(crate) download_images: bool,
    pub(crate) fetch_timeout: Duration,
    pub(crate) download_timeout: Duration,
    pub(crate) progress_interval: usize,
}

/// Resolves run settings. Precedence: CLI flag, then config file, then default.
///
/// `--no-images` always wins over `download_images = true` in the file.
pub(crate) fn resolve_run_settings(args: &RunArgs, file: Option<&FileConfig>) -> RunSettings {
    let file = file.cloned().unwrap_or_default();

    let download_images = if args.no_images {
        false
    } else {
        file.download_images.unwrap_or(true)
    };

    RunSettings {
        input: args
            .input
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ID_LIST)),
        output: args
            .output
            .clone()
            .or(file.output)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_FILE)),
        images_dir: args
            .images_dir
            .clone()
            .or(file.images_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR)),
        base_url: args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        rate_limit: Duration::from_millis(
            args.rate_limit
                .or(file.rate_limit_ms)
                .unwrap_or(DEFAULT_RATE_LIMIT_MS),
        ),
        checkpoint_interval: args
            .checkpoint_interval
            .or(file.checkpoint_interval)
            .map_or(DEFAULT_CHECKPOINT_INTERVAL, to_usize),
        concurrency: args
            .concurrency
            .or(file.concurrency)
            .map_or(DEFAULT_CONCURRENCY, usize::from),
        download_images,
        fetch_timeout: Duration::from_secs(file.fetch_timeout_secs.unwrap_or(FETCH_TIMEOUT_SECS)),
        download_timeout: Duration::from_secs(
            file.download_timeout_secs.unwrap_or(DOWNLOAD_TIMEOUT_SECS),
        ),
        progress_interval: args
            .progress_interval
            .or(file.progress_interval)
            .map_or(DEFAULT_PROGRESS_INTERVAL, to_usize),
    }
}

/// Resolves the log file: `--log-file` wins over `log_file` in the config file.
pub(crate) fn resolve_log_file(cli_value: Option<&Path>, file: Option<&FileConfig>) -> Option<PathBuf> {
    cli_value
        .map(Path::to_path_buf)
        .or_else(|| file.and_then(|cfg| cfg.log_file.clone()))
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_run_settings_no_config_returns_defaults() {
        let settings = resolve_run_settings(&RunArgs::default(), None);

        assert_eq!(settings.input, PathBuf::from("object_ids.json"));
        assert_eq!(settings.output, PathBuf::from("met_metadata.json"));
        assert_eq!(settings.images_dir, PathBuf::from("met-images"));
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.rate_limit, Duration::from_millis(1000));
        assert_eq!(settings.checkpoint_interval, 10);
        assert_eq!(settings.concurrency, 1);
        assert!(settings.download_images);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(15));
        assert_eq!(settings.download_timeout, Duration::from_secs(30));
        assert_eq!(settings.progress_interval, 25);
    }

    #[test]
    fn test_resolve_run_settings_file_overrides_defaults() {
        let file = FileConfig {
            output: Some(PathBuf::from("data/out.json")),
            rate_limit_ms: Some(0),
            concurrency: Some(4),
            fetch_timeout_secs: Some(5),
            download_images: Some(false),
            ..FileConfig::default()
        };

        let settings = resolve_run_settings(&RunArgs::default(), Some(&file));

        assert_eq!(settings.output, PathBuf::from("data/out.json"));
        assert_eq!(settings.rate_limit, Duration::ZERO);
        assert_eq!(settings.concurrency, 4);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(5));
        assert!(!settings.download_images);
        assert_eq!(settings.images_dir, PathBuf::from("met-images"));
    }

    #[test]
    fn test_resolve_run_settings_cli_overrides_file() {
        let file = FileConfig {
            output: Some(PathBuf::from("from-file.json")),
            rate_limit_ms: Some(5000),
            checkpoint_interval: Some(50),
            concurrency: Some(8),
            ..FileConfig::default()
        };
        let args = RunArgs {
            output: Some(PathBuf::from("from-cli.json")),
            rate_limit: Some(250),
            checkpoint_interval: Some(2),
            concurrency: Some(2),
            ..RunArgs::default()
        };

        let settings = resolve_run_settings(&args, Some(&file));

        assert_eq!(settings.output, PathBuf::from("from-cli.json"));
        assert_eq!(settings.rate_limit, Duration::from_millis(250));
        assert_eq!(settings.checkpoint_interval, 2);
        assert_eq!(settings.concurrency, 2);
    }

    #[test]
    fn test_resolve_run_settings_no_images_flag_wins() {
        let file = FileConfig {
            download_images: Some(true),
            ..FileConfig::default()
        };
        let args = RunArgs {
            no_images: true,
            ..RunArgs::default()
        };

        assert!(!resolve_run_settings(&args, Some(&file)).download_images);
    }

    #[test]
    fn test_resolve_log_file_precedence() {
        let file = FileConfig {
            log_file: Some(PathBuf::from("file.log")),
            ..FileConfig::default()
        };

        assert_eq!(
            resolve_log_file(Some(Path::new("cli.log")), Some(&file)),
            Some(PathBuf::from("cli.log"))
        );
        assert_eq!(
            resolve_log_file(None, Some(&file)),
            Some(PathBuf::from("file.log"))
        );
        assert_eq!(resolve_log_file(None, None), None);
    }
}
