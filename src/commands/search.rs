//! Search command handler: fetch an ID list from the collection search endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use harvester_core::CatalogClient;
use harvester_core::catalog::DEFAULT_BASE_URL;
use harvester_core::download::constants::FETCH_TIMEOUT_SECS;
use harvester_core::export::write_id_list;
use tracing::info;

use crate::app_config::FileConfig;
use crate::cli::SearchArgs;

pub async fn run_search_command(args: &SearchArgs, file: Option<&FileConfig>) -> Result<()> {
    let timeout = Duration::from_secs(
        file.and_then(|cfg| cfg.fetch_timeout_secs)
            .unwrap_or(FETCH_TIMEOUT_SECS),
    );
    let base_url = file
        .and_then(|cfg| cfg.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL);
    let client = CatalogClient::with_timeout(base_url, timeout)?;

    let ids = client
        .search_ids(&args.search_url, &args.query)
        .await
        .context("Search request failed")?;
    info!(count = ids.len(), query = %args.query, "Search complete");

    write_id_list(&args.out, &ids)?;
    println!("Wrote {} IDs to {}", ids.len(), args.out.display());
    Ok(())
}
