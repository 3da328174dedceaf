use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::{FinrepError, Result};
use crate::importer::{preview_file, upload_file};
use crate::ingest::IngestSummary;
use crate::settings::{get_db_path, load_settings};

fn print_summary(summary: &IngestSummary) {
    println!(
        "{} line items, {} red flags, {} entities",
        summary.line_items, summary.red_flags, summary.entities
    );
    if !summary.ignored_sheets.is_empty() {
        println!("Ignored sheets: {}", summary.ignored_sheets.join(", "));
    }
}

pub fn run(file: &str, month: &str, dry_run: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    if !file_path.is_file() {
        return Err(FinrepError::Other(format!("File not found: {file}")));
    }
    let settings = load_settings();

    if dry_run {
        let summary = preview_file(&file_path, month, settings.entity_scope)?;
        println!("Dry run, nothing saved.");
        print_summary(&summary);
        return Ok(());
    }

    let data_dir = PathBuf::from(&settings.data_dir);
    let conn = get_connection(&get_db_path())?;
    init_db(&conn)?;

    let result = upload_file(&conn, &data_dir, &file_path, month, settings.entity_scope)?;
    if result.duplicate_file {
        println!("This file has already been uploaded (duplicate checksum).");
        return Ok(());
    }

    if let Some(id) = result.report_id {
        println!("File uploaded and processed successfully (report {id}, {month}).");
    }
    print_summary(&result.summary);
    Ok(())
}
