use thiserror::Error;

/// Sheet-level failures. Any of these aborts the whole ingestion.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("layout expects {expected} columns, sheet has {found}")]
    LayoutMismatch { expected: usize, found: usize },

    #[error("could not store record: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Error, Debug)]
pub enum FinrepError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Error processing sheet '{sheet}': {source}")]
    Ingest {
        sheet: String,
        #[source]
        source: ExtractError,
    },

    #[error("Could not commit records: {0}")]
    Commit(#[source] ExtractError),

    #[error("Invalid month '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FinrepError>;
