use super::{IngestContext, HEADER_LABEL};
use crate::cell::{parse_percent, Cell};
use crate::error::ExtractError;
use crate::models::{Record, RedFlag};
use crate::workbook::Sheet;

// no, account_name, total_revenue, total_cost, gross_profit, gpm, comment
const WIDTH: usize = 7;
const HEADER_ROWS: usize = 1;
const LABEL_COL: usize = 1;
const GPM_COL: usize = 5;
const COMMENT_COL: usize = 6;

pub const UNKNOWN_COUNTRY: &str = "Unknown";

pub fn extract(sheet: &Sheet, ctx: &IngestContext) -> Result<Vec<Record>, ExtractError> {
    let width = sheet.width();
    if width != WIDTH {
        return Err(ExtractError::LayoutMismatch {
            expected: WIDTH,
            found: width,
        });
    }

    let mut records = Vec::new();
    for row in HEADER_ROWS..sheet.rows.len() {
        let Some(label) = sheet.cell(row, LABEL_COL).label() else {
            continue;
        };
        if label == HEADER_LABEL {
            continue;
        }
        let (project_name, country) = split_label(&label);
        records.push(Record::RedFlag(RedFlag {
            report_id: ctx.report_id,
            project_name: project_name.to_string(),
            country: country.to_string(),
            gpm: gpm_value(sheet.cell(row, GPM_COL)),
            comment: comment_text(sheet.cell(row, COMMENT_COL)),
        }));
    }
    Ok(records)
}

/// `"ProjectX_Kenya"` is project `ProjectX` in `Kenya`. Without an underscore
/// the whole label is the project and the country is unknown.
pub fn split_label(label: &str) -> (&str, &str) {
    label.split_once('_').unwrap_or((label, UNKNOWN_COUNTRY))
}

/// Unparseable or missing margins read as 0.
fn gpm_value(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Text(s) => parse_percent(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn comment_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        other => other.label().unwrap_or_default(),
    }
}
