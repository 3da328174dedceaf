use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::error::{FinrepError, Result};
use crate::ingest::{ingest, EntityScope, IngestContext, IngestSummary};
use crate::models::Report;
use crate::reports::parse_month;
use crate::settings::uploads_dir;
use crate::store::{MemorySink, SqliteSink};
use crate::workbook::Workbook;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn file_name(file_path: &Path) -> String {
    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.xlsx")
        .to_string()
}

/// Copy the upload to `<data_dir>/uploads/<timestamp>_<name>`.
fn store_copy(data_dir: &Path, file_path: &Path) -> Result<PathBuf> {
    let dir = uploads_dir(data_dir);
    std::fs::create_dir_all(&dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let dest = dir.join(format!("{stamp}_{}", file_name(file_path)));
    std::fs::copy(file_path, &dest)?;
    info!(path = %dest.display(), "file saved");
    Ok(dest)
}

fn remove_stored_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => info!(path = %path.display(), "file deleted"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "file not found")
        }
        Err(e) => warn!(path = %path.display(), "could not delete file: {e}"),
    }
}

// ---------------------------------------------------------------------------
// upload_file
// ---------------------------------------------------------------------------

pub struct UploadResult {
    pub report_id: Option<i64>,
    pub summary: IngestSummary,
    pub duplicate_file: bool,
}

/// Store `file_path` as the report for `month` (`YYYY-MM`) and ingest it.
///
/// Either the report ends up processed with all of its records, or the
/// report row, its records and the stored copy are all gone.
pub fn upload_file(
    conn: &Connection,
    data_dir: &Path,
    file_path: &Path,
    month: &str,
    scope: EntityScope,
) -> Result<UploadResult> {
    let (year, _) = parse_month(month)?;

    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt = conn.prepare("SELECT 1 FROM reports WHERE checksum = ?1 AND is_processed = 1")?;
        if stmt.exists([&checksum])? {
            return Ok(UploadResult {
                report_id: None,
                summary: IngestSummary::default(),
                duplicate_file: true,
            });
        }
    }

    let stored = store_copy(data_dir, file_path)?;
    conn.execute(
        "INSERT INTO reports (filename, file_path, month, year, checksum) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file_name(file_path),
            stored.to_string_lossy().to_string(),
            month,
            year,
            checksum,
        ],
    )?;
    let report_id = conn.last_insert_rowid();
    let ctx = IngestContext::new(report_id, year).with_entity_scope(scope);

    match process(conn, &stored, &ctx) {
        Ok(summary) => {
            conn.execute("UPDATE reports SET is_processed = 1 WHERE id = ?1", [report_id])?;
            info!(report_id, records = summary.total(), "report processed");
            Ok(UploadResult {
                report_id: Some(report_id),
                summary,
                duplicate_file: false,
            })
        }
        Err(e) => {
            error!(report_id, "error processing file: {e}");
            conn.execute("DELETE FROM reports WHERE id = ?1", [report_id])?;
            remove_stored_file(&stored);
            Err(e)
        }
    }
}

fn process(conn: &Connection, stored: &Path, ctx: &IngestContext) -> Result<IngestSummary> {
    let workbook = Workbook::open(stored)?;
    let sink = SqliteSink::begin(conn)?;
    ingest(&workbook, ctx, sink)
}

/// Parse a file without touching the database.
pub fn preview_file(file_path: &Path, month: &str, scope: EntityScope) -> Result<IngestSummary> {
    let (year, _) = parse_month(month)?;
    let workbook = Workbook::open(file_path)?;
    let ctx = IngestContext::new(0, year).with_entity_scope(scope);
    let mut mem = MemorySink::new();
    ingest(&workbook, &ctx, &mut mem)
}

// ---------------------------------------------------------------------------
// Listing / deletion
// ---------------------------------------------------------------------------

fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        filename: row.get(1)?,
        file_path: row.get(2)?,
        upload_date: row.get(3)?,
        month: row.get(4)?,
        year: row.get(5)?,
        is_processed: row.get(6)?,
        checksum: row.get(7)?,
    })
}

const REPORT_COLUMNS: &str =
    "id, filename, file_path, upload_date, month, year, is_processed, checksum";

/// Newest upload first.
pub fn list_reports(conn: &Connection) -> Result<Vec<Report>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports ORDER BY upload_date DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], row_to_report)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_report(conn: &Connection, id: i64) -> Result<Option<Report>> {
    let mut stmt = conn.prepare(&format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"))?;
    Ok(stmt.query_row([id], row_to_report).optional()?)
}

/// Delete a report, its records and its stored file.
pub fn delete_report(conn: &Connection, id: i64) -> Result<Report> {
    let report = get_report(conn, id)?.ok_or_else(|| FinrepError::ReportNotFound(id.to_string()))?;
    conn.execute("DELETE FROM reports WHERE id = ?1", [id])?;
    remove_stored_file(Path::new(&report.file_path));
    Ok(report)
}
