use std::path::{Path, PathBuf};

use crate::db::get_connection;
use crate::error::Result;
use crate::models::LineItem;
use crate::reports;
use crate::settings::{get_data_dir, get_db_path};

fn default_path(month: &str) -> PathBuf {
    get_data_dir().join("exports").join(format!("pnl-{month}.csv"))
}

pub fn write_csv(items: &[LineItem], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["report_id", "account_name", "category", "month", "actuals"])?;
    for item in items {
        wtr.write_record([
            item.report_id.to_string(),
            item.account_name.clone(),
            item.category.to_string(),
            item.month.clone(),
            format!("{:.2}", item.actuals),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn run(month: &str, output: Option<String>) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let report = reports::require_report(&conn, month)?;
    let items = reports::get_line_items(&conn, report.id, None)?;

    let path = output.map(PathBuf::from).unwrap_or_else(|| default_path(month));
    write_csv(&items, &path)?;
    println!("Wrote {} line items to {}", items.len(), path.display());
    Ok(())
}
