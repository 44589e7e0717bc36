//! CLI command handlers.

mod config;
mod export;
mod search;

pub use config::run_config_show_command;
pub use export::{run_export_csv_command, run_extract_ids_command, run_split_command};
pub use search::run_search_command;
