use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "finrep.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    file_path TEXT NOT NULL,
    upload_date TEXT DEFAULT (datetime('now')),
    month TEXT NOT NULL,
    year INTEGER NOT NULL,
    is_processed INTEGER DEFAULT 0,
    checksum TEXT
);

CREATE TABLE IF NOT EXISTS pnl_data (
    id INTEGER PRIMARY KEY,
    report_id INTEGER NOT NULL,
    account_name TEXT NOT NULL,
    category TEXT NOT NULL,
    month TEXT NOT NULL,
    actuals REAL NOT NULL,
    FOREIGN KEY (report_id) REFERENCES reports(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS red_flags (
    id INTEGER PRIMARY KEY,
    report_id INTEGER NOT NULL,
    project_name TEXT NOT NULL,
    country TEXT NOT NULL,
    gpm REAL NOT NULL,
    comment TEXT NOT NULL DEFAULT '',
    FOREIGN KEY (report_id) REFERENCES reports(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS entity_analysis (
    id INTEGER PRIMARY KEY,
    report_id INTEGER NOT NULL,
    entity_name TEXT NOT NULL,
    local_revenue REAL NOT NULL,
    interco_revenue REAL NOT NULL,
    total_revenue REAL NOT NULL,
    local_cost REAL NOT NULL,
    interco_cost REAL NOT NULL,
    total_cost REAL NOT NULL,
    gross_profit REAL NOT NULL,
    gpm REAL NOT NULL,
    FOREIGN KEY (report_id) REFERENCES reports(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_reports_month ON reports(month);
CREATE INDEX IF NOT EXISTS idx_pnl_data_report ON pnl_data(report_id);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
