use anyhow::Result;
use clap::Parser;
use tracing::debug;

use crate::ProcessExit;
use crate::app::{command_dispatcher, config_manager, terminal};
use crate::app_config;
use crate::cli::Cli;

pub(crate) async fn run_harvester() -> Result<ProcessExit> {
    let cli = Cli::parse();

    let loaded_config = app_config::load_config(cli.config.as_deref())?;

    let log_file =
        config_manager::resolve_log_file(cli.log_file.as_deref(), loaded_config.config.as_ref());
    let no_color =
        terminal::should_disable_color(terminal::no_color_env_requested(), terminal::is_dumb_terminal());
    terminal::init_tracing(
        terminal::default_log_level(cli.verbose, cli.quiet),
        log_file.as_deref(),
        no_color,
    )?;

    debug!(?cli, "CLI arguments parsed");
    if let Some(path) = loaded_config.path.as_deref().filter(|_| loaded_config.loaded_from_file) {
        debug!(path = %path.display(), "Loaded config file");
    }

    command_dispatcher::dispatch(&cli, &loaded_config).await
}
