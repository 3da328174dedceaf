use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{get_db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = get_db_path();

    println!("Data dir:      {}", settings.data_dir);
    println!("Database:      {}", db_path.display());
    println!("Entity scope:  {}", settings.entity_scope.key());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `finrep init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let count = |table: &str| -> Result<i64> {
        Ok(conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?)
    };
    let processed: i64 = conn.query_row(
        "SELECT count(*) FROM reports WHERE is_processed = 1",
        [],
        |r| r.get(0),
    )?;
    let latest: Option<String> = conn.query_row(
        "SELECT MAX(month) FROM reports WHERE is_processed = 1",
        [],
        |r| r.get(0),
    )?;

    println!();
    println!("Reports:       {} ({processed} processed)", count("reports")?);
    println!("Latest month:  {}", latest.as_deref().unwrap_or("(none)"));
    println!("Line items:    {}", count("pnl_data")?);
    println!("Red flags:     {}", count("red_flags")?);
    println!("Entities:      {}", count("entity_analysis")?);
    Ok(())
}
