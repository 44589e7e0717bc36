//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use harvester_core::catalog::{DEFAULT_SEARCH_QUERY, DEFAULT_SEARCH_URL};

/// Default ID list for `run` and output of `extract-ids`.
pub const DEFAULT_ID_LIST: &str = "object_ids.json";

/// Default metadata file written by `run` and read by the export commands.
pub const DEFAULT_METADATA_FILE: &str = "met_metadata.json";

/// Default output of `search`.
pub const DEFAULT_SEARCH_OUTPUT: &str = "met_highlight_ids.json";

/// Default directory for `split`.
pub const DEFAULT_SPLIT_DIR: &str = "metadata";

/// Default output of `export-csv`.
pub const DEFAULT_CSV_OUTPUT: &str = "met_objects_with_images.csv";

/// Harvest public-domain catalog records and their images.
///
/// Harvester walks a list of record IDs, fetches each record from the
/// collection API, keeps the public-domain ones that have an image, downloads
/// the image, and appends the metadata to a JSON file it can resume from.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/harvester/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Harvest records listed in an ID file (resumes from existing output)
    Run(RunArgs),

    /// Fetch an ID list from the collection search endpoint
    Search(SearchArgs),

    /// Write the sorted IDs of a metadata file as a JSON array
    ExtractIds(ExtractIdsArgs),

    /// Write one JSON file per record of a metadata file
    Split(SplitArgs),

    /// Write a CSV summary of records that have an image
    ExportCsv(ExportCsvArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the effective run settings and where they came from
    Show,
}

/// Options of the `run` command. Unset values fall back to the config file,
/// then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// JSON file with the record IDs to harvest [default: object_ids.json]
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Metadata output file [default: met_metadata.json]
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Directory for downloaded images [default: met-images]
    #[arg(long, value_name = "DIR")]
    pub images_dir: Option<PathBuf>,

    /// Object endpoint of the collection API
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Minimum delay between records in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, value_name = "MS", value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub rate_limit: Option<u64>,

    /// Save metadata every N stored records [default: 10]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub checkpoint_interval: Option<u32>,

    /// Records processed at once (1-32) [default: 1]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub concurrency: Option<u8>,

    /// Store metadata only, without downloading images
    #[arg(long)]
    pub no_images: bool,

    /// Log progress every N records [default: 25]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub progress_interval: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Query string sent to the search endpoint
    #[arg(long, default_value = DEFAULT_SEARCH_QUERY)]
    pub query: String,

    /// Search endpoint of the collection API
    #[arg(long, value_name = "URL", default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// Where to write the ID list
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SEARCH_OUTPUT)]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractIdsArgs {
    /// Metadata file to read
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_METADATA_FILE)]
    pub input: PathBuf,

    /// Where to write the ID list
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ID_LIST)]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    /// Metadata file to read
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_METADATA_FILE)]
    pub input: PathBuf,

    /// Directory for the per-record files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SPLIT_DIR)]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExportCsvArgs {
    /// Metadata file to read
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_METADATA_FILE)]
    pub input: PathBuf,

    /// Where to write the CSV
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CSV_OUTPUT)]
    pub out: PathBuf,
}
