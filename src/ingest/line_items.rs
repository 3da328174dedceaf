use tracing::debug;

use super::{IngestContext, HEADER_LABEL};
use crate::cell::Cell;
use crate::classify::{categorize, month_token};
use crate::error::ExtractError;
use crate::models::{LineItem, Record};
use crate::workbook::Sheet;

/// Column map for a sheet with one account per row and one column per month.
#[derive(Debug, Clone, Copy)]
pub struct LineItemLayout {
    pub header_rows: usize,
    pub width: usize,
    pub account_col: usize,
    /// Only rows whose cell in this column equals the token are read.
    pub row_type: Option<(usize, &'static str)>,
    pub months: &'static [(usize, &'static str)],
}

/// account_name, jan..dec, total
pub const PNL_SUMMARY: LineItemLayout = LineItemLayout {
    header_rows: 3,
    width: 14,
    account_col: 0,
    row_type: None,
    months: &[
        (1, "jan"),
        (2, "feb"),
        (3, "mar"),
        (4, "apr"),
        (5, "may"),
        (6, "jun"),
        (7, "jul"),
        (8, "aug"),
        (9, "sep"),
        (10, "oct"),
        (11, "nov"),
        (12, "dec"),
    ],
};

/// id, account_name, type, jan..aug, ytd
pub const RECONCILIATION: LineItemLayout = LineItemLayout {
    header_rows: 1,
    width: 12,
    account_col: 1,
    row_type: Some((2, "Actual HL")),
    months: &[
        (3, "jan"),
        (4, "feb"),
        (5, "mar"),
        (6, "apr"),
        (7, "may"),
        (8, "jun"),
        (9, "jul"),
        (10, "aug"),
    ],
};

pub fn extract(
    sheet: &Sheet,
    layout: &LineItemLayout,
    ctx: &IngestContext,
) -> Result<Vec<Record>, ExtractError> {
    let width = sheet.width();
    if width != layout.width {
        return Err(ExtractError::LayoutMismatch {
            expected: layout.width,
            found: width,
        });
    }

    let mut records = Vec::new();
    for (idx, row) in sheet.rows.iter().enumerate().skip(layout.header_rows) {
        let Some(account_name) = account_label(row, layout) else {
            continue;
        };
        if let Some((col, token)) = layout.row_type {
            if row.get(col).and_then(Cell::as_str) != Some(token) {
                continue;
            }
        }

        let category = categorize(&account_name);
        for &(col, abbrev) in layout.months {
            let Some(actuals) = row.get(col).and_then(month_value) else {
                if row.get(col).is_some_and(|c| !c.is_blank()) {
                    debug!(sheet = %sheet.name, row = idx + 1, col, "skipping non-numeric cell");
                }
                continue;
            };
            records.push(Record::LineItem(LineItem {
                report_id: ctx.report_id,
                account_name: account_name.clone(),
                category,
                month: month_token(ctx.year, abbrev),
                actuals,
            }));
        }
    }
    Ok(records)
}

fn account_label(row: &[Cell], layout: &LineItemLayout) -> Option<String> {
    let label = row.get(layout.account_col)?.label()?;
    (label != HEADER_LABEL).then_some(label)
}

/// A month cell counts only when it holds a finite, non-zero amount.
fn month_value(cell: &Cell) -> Option<f64> {
    cell.amount().filter(|v| *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn ctx() -> IngestContext {
        IngestContext::new(7, 2025)
    }

    fn t(s: &str) -> Cell {
        Cell::text(s)
    }

    fn summary_row(label: Cell, months: &[Cell]) -> Vec<Cell> {
        let mut row = vec![label];
        row.extend(months.iter().cloned());
        row.resize(14, Cell::Blank);
        row
    }

    fn summary_sheet(data: Vec<Vec<Cell>>) -> Sheet {
        let mut rows = vec![
            summary_row(t("Management P&L"), &[]),
            summary_row(Cell::Blank, &[]),
            summary_row(t("Account Name"), &[t("Jan"), t("Feb"), t("Mar")]),
        ];
        rows.extend(data);
        Sheet::new("PnL Summary", rows)
    }

    fn items(records: Vec<Record>) -> Vec<LineItem> {
        records
            .into_iter()
            .map(|r| match r {
                Record::LineItem(item) => item,
                other => panic!("unexpected record {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_summary_row_skips_blank_month() {
        let sheet = summary_sheet(vec![summary_row(
            t("Group Revenue"),
            &[t("1,000"), t(""), t("2,000")],
        )]);
        let got = items(extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap());
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].month, "2025-01");
        assert_eq!(got[0].actuals, 1000.0);
        assert_eq!(got[1].month, "2025-03");
        assert_eq!(got[1].actuals, 2000.0);
        assert!(got.iter().all(|i| i.category == Category::Revenue && i.report_id == 7));
    }

    #[test]
    fn test_blank_account_name_yields_nothing() {
        let sheet = summary_sheet(vec![
            summary_row(Cell::Blank, &[Cell::Number(5.0), Cell::Number(6.0)]),
            summary_row(t("   "), &[Cell::Number(5.0)]),
        ]);
        assert!(extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap().is_empty());
    }

    #[test]
    fn test_header_label_rows_are_skipped() {
        let sheet = summary_sheet(vec![summary_row(t("Account Name"), &[Cell::Number(12.0)])]);
        assert!(extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap().is_empty());
    }

    #[test]
    fn test_zero_and_unparseable_cells_are_skipped() {
        let sheet = summary_sheet(vec![summary_row(
            t("Staff Costs"),
            &[Cell::Number(0.0), t("0.00"), t("n/a"), t("(1,234.50)"), Cell::Number(f64::INFINITY)],
        )]);
        let got = items(extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap());
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].month, "2025-04");
        assert_eq!(got[0].actuals, -1234.50);
        assert_eq!(got[0].category, Category::DirectCosts);
    }

    #[test]
    fn test_total_column_is_not_a_month() {
        let mut row = summary_row(t("Gross Profit"), &[Cell::Number(1.0)]);
        row[13] = Cell::Number(999.0);
        let sheet = summary_sheet(vec![row]);
        let got = items(extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap());
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].actuals, 1.0);
    }

    #[test]
    fn test_short_rows_read_as_blank() {
        let sheet = Sheet::new(
            "PnL Summary",
            vec![vec![], vec![], vec![Cell::Blank; 14], vec![t("Opex"), Cell::Number(3.0)]],
        );
        let got = items(extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap());
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].category, Category::Opex);
    }

    #[test]
    fn test_wider_sheet_is_layout_mismatch() {
        let mut row = summary_row(t("Group Revenue"), &[]);
        row.push(t("notes"));
        let sheet = summary_sheet(vec![row]);
        let err = extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap_err();
        assert!(matches!(err, ExtractError::LayoutMismatch { expected: 14, found: 15 }));
    }

    #[test]
    fn test_narrower_sheet_is_layout_mismatch() {
        let sheet = Sheet::new(
            "PnL Summary",
            vec![vec![], vec![], vec![], vec![t("Opex"), Cell::Number(3.0)]],
        );
        let err = extract(&sheet, &PNL_SUMMARY, &ctx()).unwrap_err();
        assert!(matches!(err, ExtractError::LayoutMismatch { expected: 14, found: 2 }));
    }

    fn recon_row(id: f64, account: &str, kind: &str, months: &[Cell]) -> Vec<Cell> {
        let mut row = vec![Cell::Number(id), t(account), t(kind)];
        row.extend(months.iter().cloned());
        row.resize(12, Cell::Blank);
        row
    }

    #[test]
    fn test_reconciliation_reads_only_actual_hl_rows() {
        let header = recon_row(0.0, "Account Name", "Type", &[t("Jan")]);
        let sheet = Sheet::new(
            "RECONCILIATION",
            vec![
                header,
                recon_row(1.0, "Group Revenue", "Budget", &[Cell::Number(10.0), Cell::Number(20.0)]),
                recon_row(2.0, "Group Revenue", "Actual HL", &[Cell::Number(11.0), Cell::Blank, t("$30")]),
                recon_row(3.0, "Group Revenue", "actual hl", &[Cell::Number(12.0)]),
            ],
        );
        let got = items(extract(&sheet, &RECONCILIATION, &ctx()).unwrap());
        assert_eq!(got.len(), 2);
        assert_eq!((got[0].month.as_str(), got[0].actuals), ("2025-01", 11.0));
        assert_eq!((got[1].month.as_str(), got[1].actuals), ("2025-03", 30.0));
    }

    #[test]
    fn test_narrow_reconciliation_is_layout_mismatch() {
        let sheet = Sheet::new(
            "RECONCILIATION",
            vec![
                vec![t("ID"), t("Account Name"), t("Type"), t("Jan"), t("Feb")],
                vec![Cell::Number(1.0), t("Group Revenue"), t("Actual HL"), Cell::Number(5.0), Cell::Number(6.0)],
            ],
        );
        let err = extract(&sheet, &RECONCILIATION, &ctx()).unwrap_err();
        assert!(matches!(err, ExtractError::LayoutMismatch { expected: 12, found: 5 }));
    }

    #[test]
    fn test_reconciliation_ytd_column_ignored() {
        let mut row = recon_row(1.0, "Net Profit before Tax", "Actual HL", &[]);
        row[11] = Cell::Number(500.0);
        let sheet = Sheet::new("RECONCILIATION", vec![recon_row(0.0, "Account Name", "Type", &[]), row]);
        assert!(extract(&sheet, &RECONCILIATION, &ctx()).unwrap().is_empty());
    }
}
