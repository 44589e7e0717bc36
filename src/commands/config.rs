//! Config command handlers: show effective configuration.

use anyhow::Result;

use crate::app::config_manager::resolve_run_settings;
use crate::app_config::LoadedConfig;
use crate::cli::RunArgs;

pub fn run_config_show_command(loaded_config: &LoadedConfig) -> Result<()> {
    let effective = resolve_run_settings(&RunArgs::default(), loaded_config.config.as_ref());

    let resolved_path = loaded_config.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded_config.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("input = {}", effective.input.display());
    println!("output = {}", effective.output.display());
    println!("images_dir = {}", effective.images_dir.display());
    println!("base_url = {}", effective.base_url);
    println!("rate_limit_ms = {}", effective.rate_limit.as_millis());
    println!("checkpoint_interval = {}", effective.checkpoint_interval);
    println!("concurrency = {}", effective.concurrency);
    println!("download_images = {}", effective.download_images);
    println!("fetch_timeout_secs = {}", effective.fetch_timeout.as_secs());
    println!(
        "download_timeout_secs = {}",
        effective.download_timeout.as_secs()
    );
    println!("progress_interval = {}", effective.progress_interval);
    let log_file = loaded_config
        .config
        .as_ref()
        .and_then(|cfg| cfg.log_file.as_ref())
        .map_or_else(|| "<none>".to_string(), |path| path.display().to_string());
    println!("log_file = {log_file}");

    Ok(())
}
