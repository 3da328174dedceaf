use std::path::Path;

use calamine::{Data, Reader};

use crate::cell::Cell;
use crate::error::Result;

static BLANK: Cell = Cell::Blank;

/// A named grid of cells. Row and column 0 correspond to A1.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Widest row, counting trailing blanks the reader kept.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Out-of-range positions read as blank.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    #[cfg(test)]
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Read every sheet of an xlsx/xls/xlsb/ods file, in workbook order.
    pub fn open(path: &Path) -> Result<Self> {
        let mut workbook = calamine::open_workbook_auto(path)?;
        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            let (row_offset, col_offset) = range
                .start()
                .map(|(r, c)| (r as usize, c as usize))
                .unwrap_or((0, 0));
            let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
            for data_row in range.rows() {
                let mut row = vec![Cell::Blank; col_offset];
                row.extend(data_row.iter().map(to_cell));
                rows.push(row);
            }
            sheets.push(Sheet::new(name, rows));
        }
        Ok(Self { sheets })
    }
}

/// Error cells (`#DIV/0!`, `#N/A`) read as blank, dates as their serial number.
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Blank,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_out_of_range_is_blank() {
        let sheet = Sheet::new("s", vec![vec![Cell::text("a")], vec![]]);
        assert_eq!(sheet.cell(0, 0), &Cell::text("a"));
        assert_eq!(sheet.cell(0, 5), &Cell::Blank);
        assert_eq!(sheet.cell(1, 0), &Cell::Blank);
        assert_eq!(sheet.cell(9, 9), &Cell::Blank);
    }

    #[test]
    fn test_width_uses_widest_row() {
        let sheet = Sheet::new(
            "s",
            vec![vec![Cell::Blank; 3], vec![Cell::Blank; 7], vec![]],
        );
        assert_eq!(sheet.width(), 7);
        assert_eq!(Sheet::default().width(), 0);
    }

    #[test]
    fn test_to_cell_mapping() {
        assert_eq!(to_cell(&Data::Empty), Cell::Blank);
        assert_eq!(to_cell(&Data::Int(5)), Cell::Number(5.0));
        assert_eq!(to_cell(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(to_cell(&Data::String("x".into())), Cell::text("x"));
        assert_eq!(to_cell(&Data::Bool(true)), Cell::text("TRUE"));
        assert_eq!(
            to_cell(&Data::Error(calamine::CellErrorType::Div0)),
            Cell::Blank
        );
    }

    #[test]
    fn test_open_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Workbook::open(&dir.path().join("missing.xlsx")).is_err());
    }
}
