use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::importer::{delete_report, list_reports};
use crate::settings::get_db_path;

pub fn list() -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let reports = list_reports(&conn)?;
    if reports.is_empty() {
        println!("No files uploaded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "File", "Month", "Uploaded", "Status"]);
    for r in &reports {
        let status = if r.is_processed {
            "Processed".green()
        } else {
            "Processing".yellow()
        };
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.filename),
            Cell::new(&r.month),
            Cell::new(&r.upload_date),
            Cell::new(status),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn delete(report_id: i64) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let report = delete_report(&conn, report_id)?;
    println!("Deleted report {} ({}, {})", report.id, report.filename, report.month);
    Ok(())
}
