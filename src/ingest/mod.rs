//! Spreadsheet ingestion: recognizes known sheet layouts by name and turns
//! them into line items, red flags and entity summaries.
//!
//! Cell problems skip the cell, row filters skip the row, a sheet without its
//! entity anchor is skipped with a warning. Anything else raised while
//! extracting a known sheet rolls back every record of the report.

pub mod entities;
pub mod line_items;
pub mod red_flags;

use tracing::{debug, error, info};

use crate::error::{ExtractError, FinrepError, Result};
use crate::models::Record;
use crate::store::RecordSink;
use crate::workbook::{Sheet, Workbook};

pub use entities::EntityScope;

/// Account-name cell text that marks a repeated header row.
pub const HEADER_LABEL: &str = "Account Name";

/// Per-report settings every extractor needs.
#[derive(Debug, Clone, Copy)]
pub struct IngestContext {
    pub report_id: i64,
    /// Year used for the `YYYY-MM` month tokens.
    pub year: i32,
    pub entity_scope: EntityScope,
}

impl IngestContext {
    pub fn new(report_id: i64, year: i32) -> Self {
        Self {
            report_id,
            year,
            entity_scope: EntityScope::default(),
        }
    }

    pub fn with_entity_scope(mut self, scope: EntityScope) -> Self {
        self.entity_scope = scope;
        self
    }
}

// ---------------------------------------------------------------------------
// Layout kinds, matched on exact sheet name
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetLayout {
    PnlSummary,
    Reconciliation,
    RedFlags,
    EntityAnalysis,
}

const ALL_LAYOUTS: &[SheetLayout] = &[
    SheetLayout::PnlSummary,
    SheetLayout::Reconciliation,
    SheetLayout::RedFlags,
    SheetLayout::EntityAnalysis,
];

impl SheetLayout {
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Self::PnlSummary => "PnL Summary",
            Self::Reconciliation => "RECONCILIATION",
            Self::RedFlags => "Red flags",
            Self::EntityAnalysis => "Analysis Per Entity",
        }
    }

    /// Case-sensitive; `"pnl summary"` is not a known layout.
    pub fn for_sheet(name: &str) -> Option<Self> {
        ALL_LAYOUTS.iter().find(|l| l.sheet_name() == name).copied()
    }

    pub fn extract(&self, sheet: &Sheet, ctx: &IngestContext) -> std::result::Result<Vec<Record>, ExtractError> {
        match self {
            Self::PnlSummary => line_items::extract(sheet, &line_items::PNL_SUMMARY, ctx),
            Self::Reconciliation => line_items::extract(sheet, &line_items::RECONCILIATION, ctx),
            Self::RedFlags => red_flags::extract(sheet, ctx),
            Self::EntityAnalysis => Ok(entities::extract(sheet, ctx)),
        }
    }
}

// ---------------------------------------------------------------------------
// ingest
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestSummary {
    pub line_items: usize,
    pub red_flags: usize,
    pub entities: usize,
    /// Sheets present in the workbook with no known layout.
    pub ignored_sheets: Vec<String>,
}

impl IngestSummary {
    fn count(&mut self, record: &Record) {
        match record {
            Record::LineItem(_) => self.line_items += 1,
            Record::RedFlag(_) => self.red_flags += 1,
            Record::Entity(_) => self.entities += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.line_items + self.red_flags + self.entities
    }
}

/// Run every known sheet of `workbook` through its extractor and hand the
/// records to `sink`. Commits once at the end; on the first failing sheet
/// the sink is rolled back and the error names that sheet.
pub fn ingest<S: RecordSink>(workbook: &Workbook, ctx: &IngestContext, mut sink: S) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for sheet in &workbook.sheets {
        let Some(layout) = SheetLayout::for_sheet(&sheet.name) else {
            debug!(sheet = %sheet.name, "no layout for sheet, ignoring");
            summary.ignored_sheets.push(sheet.name.clone());
            continue;
        };

        let before = summary.total();
        let outcome = layout.extract(sheet, ctx).and_then(|records| {
            for record in records {
                summary.count(&record);
                sink.add(record)?;
            }
            Ok(())
        });

        if let Err(source) = outcome {
            error!(sheet = %sheet.name, report_id = ctx.report_id, "error processing sheet: {source}");
            if let Err(e) = sink.rollback() {
                error!(report_id = ctx.report_id, "rollback failed: {e}");
            }
            return Err(FinrepError::Ingest {
                sheet: sheet.name.clone(),
                source,
            });
        }
        info!(
            sheet = %sheet.name,
            report_id = ctx.report_id,
            records = summary.total() - before,
            "processed sheet"
        );
    }

    sink.commit().map_err(FinrepError::Commit)?;
    info!(report_id = ctx.report_id, records = summary.total(), "ingestion committed");
    Ok(summary)
}
