//! CLI command routing: runs the subcommand the user invoked and returns the exit outcome.

use anyhow::Result;

use crate::app::{config_manager, harvest_orchestrator};
use crate::app_config::LoadedConfig;
use crate::cli::{Cli, Command, ConfigCommand};
use crate::{ProcessExit, commands};

/// Runs `cli.command` with the loaded configuration.
pub(crate) async fn dispatch(cli: &Cli, loaded_config: &LoadedConfig) -> Result<ProcessExit> {
    match &cli.command {
        Command::Run(run_args) => {
            let settings =
                config_manager::resolve_run_settings(run_args, loaded_config.config.as_ref());
            return harvest_orchestrator::run_harvest(&settings, cli.quiet).await;
        }
        Command::Search(search_args) => {
            commands::run_search_command(search_args, loaded_config.config.as_ref()).await?;
        }
        Command::ExtractIds(args) => commands::run_extract_ids_command(args)?,
        Command::Split(args) => commands::run_split_command(args)?,
        Command::ExportCsv(args) => commands::run_export_csv_command(args)?,
        Command::Config { command } => match command {
            ConfigCommand::Show => commands::run_config_show_command(loaded_config)?,
        },
    }

    Ok(ProcessExit::Success)
}
