//! CLI entry point for the harvester tool.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;
mod commands;

/// Process exit outcome of a harvester invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// The command ran to completion.
    Success,
    /// A fatal error stopped the command.
    Failure,
    /// A run was interrupted; the metadata accepted so far was saved.
    Interrupted,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Interrupted => 130,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let exit = match app::runtime::run_harvester().await {
        Ok(exit) => exit,
        Err(error) => {
            eprintln!("error: {error:#}");
            ProcessExit::Failure
        }
    };
    ExitCode::from(exit.code())
}
