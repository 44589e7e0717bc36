//! Export command handlers: one-shot transforms over a metadata file.

use anyhow::Result;
use harvester_core::export::{
    export_csv, extract_ids, load_collection, split_records, write_id_list,
};

use crate::cli::{ExportCsvArgs, ExtractIdsArgs, SplitArgs};

pub fn run_extract_ids_command(args: &ExtractIdsArgs) -> Result<()> {
    let records = load_collection(&args.input)?;
    let ids = extract_ids(&records);
    write_id_list(&args.out, &ids)?;
    println!("Wrote {} IDs to {}", ids.len(), args.out.display());
    Ok(())
}

pub fn run_split_command(args: &SplitArgs) -> Result<()> {
    let records = load_collection(&args.input)?;
    let written = split_records(&records, &args.out_dir)?;
    println!("Wrote {written} files to {}", args.out_dir.display());
    Ok(())
}

pub fn run_export_csv_command(args: &ExportCsvArgs) -> Result<()> {
    let records = load_collection(&args.input)?;
    let rows = export_csv(&records, &args.out)?;
    println!(
        "Wrote {rows} of {} records to {}",
        records.len(),
        args.out.display()
    );
    Ok(())
}
