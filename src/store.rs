use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::ExtractError;
use crate::models::Record;

/// Where the ingestion pipeline puts its records. Nothing is visible to
/// readers until `commit`; `rollback` discards everything added so far.
pub trait RecordSink {
    fn add(&mut self, record: Record) -> Result<(), ExtractError>;
    fn commit(self) -> Result<(), ExtractError>;
    fn rollback(self) -> Result<(), ExtractError>;
}

/// Buffers records in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pending: Vec<Record>,
    committed: Vec<Record>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn committed(&self) -> &[Record] {
        &self.committed
    }
}

impl RecordSink for &mut MemorySink {
    fn add(&mut self, record: Record) -> Result<(), ExtractError> {
        self.pending.push(record);
        Ok(())
    }

    fn commit(self) -> Result<(), ExtractError> {
        self.committed.append(&mut self.pending);
        Ok(())
    }

    fn rollback(self) -> Result<(), ExtractError> {
        self.pending.clear();
        Ok(())
    }
}

/// Writes records inside one immediate transaction on `conn`.
pub struct SqliteSink<'c> {
    tx: Transaction<'c>,
}

impl<'c> SqliteSink<'c> {
    pub fn begin(conn: &'c Connection) -> rusqlite::Result<Self> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        Ok(Self { tx })
    }
}

impl RecordSink for SqliteSink<'_> {
    fn add(&mut self, record: Record) -> Result<(), ExtractError> {
        match record {
            Record::LineItem(item) => {
                self.tx
                    .prepare_cached(
                        "INSERT INTO pnl_data (report_id, account_name, category, month, actuals) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?
                    .execute(rusqlite::params![
                        item.report_id,
                        item.account_name,
                        item.category.as_str(),
                        item.month,
                        item.actuals,
                    ])?;
            }
            Record::RedFlag(flag) => {
                self.tx
                    .prepare_cached(
                        "INSERT INTO red_flags (report_id, project_name, country, gpm, comment) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?
                    .execute(rusqlite::params![
                        flag.report_id,
                        flag.project_name,
                        flag.country,
                        flag.gpm,
                        flag.comment,
                    ])?;
            }
            Record::Entity(e) => {
                self.tx
                    .prepare_cached(
                        "INSERT INTO entity_analysis (report_id, entity_name, local_revenue, interco_revenue, \
                         total_revenue, local_cost, interco_cost, total_cost, gross_profit, gpm) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    )?
                    .execute(rusqlite::params![
                        e.report_id,
                        e.entity_name,
                        e.local_revenue,
                        e.interco_revenue,
                        e.total_revenue,
                        e.local_cost,
                        e.interco_cost,
                        e.total_cost,
                        e.gross_profit(),
                        e.gpm(),
                    ])?;
            }
        }
        Ok(())
    }

    fn commit(self) -> Result<(), ExtractError> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<(), ExtractError> {
        self.tx.rollback()?;
        Ok(())
    }
}
