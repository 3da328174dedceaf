use rusqlite::{Connection, OptionalExtension};

use crate::error::{FinrepError, Result};
use crate::models::{Category, EntitySummary, LineItem, RedFlag, Report, Split};

pub const REVENUE_ACCOUNT: &str = "Group Revenue";
pub const GROSS_PROFIT_ACCOUNT: &str = "Gross Profit";
pub const NET_PROFIT_ACCOUNT: &str = "Net Profit before Tax";

// ---------------------------------------------------------------------------
// Month helpers
// ---------------------------------------------------------------------------

/// `"2025-03"` → `(2025, 3)`.
pub fn parse_month(month: &str) -> Result<(i32, u32)> {
    let invalid = || FinrepError::InvalidMonth(month.to_string());
    let (y, m) = month.split_once('-').ok_or_else(invalid)?;
    if y.len() != 4 || m.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let mon: u32 = m.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&mon) {
        return Err(invalid());
    }
    Ok((year, mon))
}

pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let idx = year * 12 + month as i32 - 1 + delta;
    (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1)
}

pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

fn pct_change(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(prev) if prev != 0.0 => (current - prev) / prev * 100.0,
        _ => 0.0,
    }
}

fn margin(numerator: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        numerator / revenue * 100.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Latest processed report for `month`.
pub fn find_report(conn: &Connection, month: &str) -> Result<Option<Report>> {
    let mut stmt = conn.prepare(
        "SELECT id, filename, file_path, upload_date, month, year, is_processed, checksum \
         FROM reports WHERE month = ?1 AND is_processed = 1 \
         ORDER BY upload_date DESC, id DESC LIMIT 1",
    )?;
    let report = stmt
        .query_row([month], |row| {
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
        })
        .optional()?;
    Ok(report)
}

pub fn require_report(conn: &Connection, month: &str) -> Result<Report> {
    parse_month(month)?;
    find_report(conn, month)?.ok_or_else(|| FinrepError::ReportNotFound(month.to_string()))
}

fn account_actual(conn: &Connection, report: &Report, account: &str) -> Result<Option<f64>> {
    Ok(conn.query_row(
        "SELECT SUM(actuals) FROM pnl_data WHERE report_id = ?1 AND month = ?2 AND account_name = ?3",
        rusqlite::params![report.id, report.month, account],
        |r| r.get(0),
    )?)
}

fn category_total(conn: &Connection, report: &Report, category: Category) -> Result<Option<f64>> {
    Ok(conn.query_row(
        "SELECT SUM(actuals) FROM pnl_data WHERE report_id = ?1 AND month = ?2 AND category = ?3",
        rusqlite::params![report.id, report.month, category.as_str()],
        |r| r.get(0),
    )?)
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Headline figures of one report month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthFigures {
    pub revenue: f64,
    pub direct_costs: f64,
    pub gross_profit: f64,
    pub opex: f64,
    pub net_profit: f64,
    /// Whether the report carried a Gross Profit row for the month.
    pub gross_profit_reported: bool,
}

impl MonthFigures {
    pub fn gpm(&self) -> f64 {
        margin(self.gross_profit, self.revenue)
    }

    pub fn npm(&self) -> f64 {
        margin(self.net_profit, self.revenue)
    }
}

pub fn month_figures(conn: &Connection, report: &Report) -> Result<MonthFigures> {
    let gross_profit = account_actual(conn, report, GROSS_PROFIT_ACCOUNT)?;
    Ok(MonthFigures {
        revenue: account_actual(conn, report, REVENUE_ACCOUNT)?.unwrap_or(0.0),
        direct_costs: category_total(conn, report, Category::DirectCosts)?.unwrap_or(0.0),
        gross_profit: gross_profit.unwrap_or(0.0),
        gross_profit_reported: gross_profit.is_some(),
        opex: category_total(conn, report, Category::Opex)?.unwrap_or(0.0),
        net_profit: account_actual(conn, report, NET_PROFIT_ACCOUNT)?.unwrap_or(0.0),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kpis {
    pub revenue: f64,
    pub revenue_change: f64,
    pub gpm: f64,
    /// Percentage points, not percent.
    pub gpm_change: f64,
    pub opex: f64,
    pub opex_change: f64,
    pub net_profit: f64,
    pub net_profit_change: f64,
}

pub fn kpis(current: &MonthFigures, previous: Option<&MonthFigures>) -> Kpis {
    Kpis {
        revenue: current.revenue,
        revenue_change: pct_change(current.revenue, previous.map(|p| p.revenue)),
        gpm: current.gpm(),
        gpm_change: previous
            .filter(|p| p.gross_profit_reported)
            .map_or(0.0, |p| current.gpm() - p.gpm()),
        opex: current.opex,
        opex_change: pct_change(current.opex, previous.map(|p| p.opex)),
        net_profit: current.net_profit,
        net_profit_change: pct_change(current.net_profit, previous.map(|p| p.net_profit)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthPoint {
    pub month: String,
    pub figures: MonthFigures,
}

/// Figures for up to `months` report months ending at `month`, oldest first.
/// Months without a processed report are left out.
pub fn trend(conn: &Connection, month: &str, months: i32) -> Result<Vec<MonthPoint>> {
    let (year, mon) = parse_month(month)?;
    let mut points = Vec::new();
    for back in (0..months).rev() {
        let (y, m) = shift_month(year, mon, -back);
        let key = month_key(y, m);
        if let Some(report) = find_report(conn, &key)? {
            points.push(MonthPoint {
                month: key,
                figures: month_figures(conn, &report)?,
            });
        }
    }
    Ok(points)
}

pub struct Dashboard {
    pub report: Report,
    pub kpis: Kpis,
    pub monthly: Vec<MonthPoint>,
    pub entities: Vec<EntitySummary>,
    pub red_flags: Vec<RedFlag>,
}

pub fn get_dashboard(conn: &Connection, month: &str) -> Result<Dashboard> {
    let report = require_report(conn, month)?;
    let current = month_figures(conn, &report)?;

    let (year, mon) = parse_month(month)?;
    let (py, pm) = shift_month(year, mon, -1);
    let previous = match find_report(conn, &month_key(py, pm))? {
        Some(prev) => Some(month_figures(conn, &prev)?),
        None => None,
    };

    Ok(Dashboard {
        kpis: kpis(&current, previous.as_ref()),
        monthly: trend(conn, month, 12)?,
        entities: get_entities(conn, report.id)?,
        red_flags: get_red_flags(conn, report.id)?,
        report,
    })
}

pub fn get_entities(conn: &Connection, report_id: i64) -> Result<Vec<EntitySummary>> {
    let mut stmt = conn.prepare(
        "SELECT report_id, entity_name, local_revenue, interco_revenue, total_revenue, \
         local_cost, interco_cost, total_cost \
         FROM entity_analysis WHERE report_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map([report_id], |row| {
        let entity_name: String = row.get(1)?;
        Ok(EntitySummary::new(
            row.get(0)?,
            entity_name,
            Split {
                local: row.get(2)?,
                interco: row.get(3)?,
                total: row.get(4)?,
            },
            Split {
                local: row.get(5)?,
                interco: row.get(6)?,
                total: row.get(7)?,
            },
        ))
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_red_flags(conn: &Connection, report_id: i64) -> Result<Vec<RedFlag>> {
    let mut stmt = conn.prepare(
        "SELECT report_id, project_name, country, gpm, comment \
         FROM red_flags WHERE report_id = ?1 ORDER BY gpm ASC, id",
    )?;
    let rows = stmt.query_map([report_id], |row| {
        Ok(RedFlag {
            report_id: row.get(0)?,
            project_name: row.get(1)?,
            country: row.get(2)?,
            gpm: row.get(3)?,
            comment: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// P&L listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PnlTarget {
    Revenue,
    Costs,
    GrossProfit,
    NetProfit,
}

impl PnlTarget {
    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "revenue" => Ok(Self::Revenue),
            "costs" => Ok(Self::Costs),
            "gross_profit" => Ok(Self::GrossProfit),
            "net_profit" => Ok(Self::NetProfit),
            other => Err(FinrepError::UnknownOption(format!(
                "{other} (expected revenue, costs, gross_profit or net_profit)"
            ))),
        }
    }

    fn clause(&self) -> &'static str {
        match self {
            Self::Revenue => "account_name LIKE '%revenue%'",
            Self::Costs => "category = 'Direct Costs'",
            Self::GrossProfit => "account_name LIKE '%gross profit%'",
            Self::NetProfit => "account_name LIKE '%net profit%'",
        }
    }
}

pub fn get_line_items(conn: &Connection, report_id: i64, target: Option<PnlTarget>) -> Result<Vec<LineItem>> {
    let filter = target.map(|t| format!(" AND {}", t.clause())).unwrap_or_default();
    let sql = format!(
        "SELECT report_id, account_name, category, month, actuals \
         FROM pnl_data WHERE report_id = ?1{filter} ORDER BY id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([report_id], |row| {
        let category: String = row.get(2)?;
        Ok(LineItem {
            report_id: row.get(0)?,
            account_name: row.get(1)?,
            category: Category::from_label(&category).unwrap_or(Category::Other),
            month: row.get(3)?,
            actuals: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

// ---------------------------------------------------------------------------
// Benchmarking
// ---------------------------------------------------------------------------

/// One month of the historical benchmark.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkPoint {
    pub month: String,
    pub revenue: f64,
    pub gpm: f64,
    /// Net profit before tax over revenue.
    pub opm: f64,
    /// Same as `opm`; reports carry no after-tax line.
    pub npm: f64,
    pub yoy_revenue_growth: f64,
    pub yoy_profit_growth: f64,
}

/// Growth against the same month a year earlier; 0 unless that figure is positive.
fn yoy_growth(current: f64, prior: Option<f64>) -> f64 {
    match prior {
        Some(prior) if prior > 0.0 => (current - prior) / prior * 100.0,
        _ => 0.0,
    }
}

/// Margins and year-over-year growth for every report month in the 12 months
/// ending at `month`, oldest first.
pub fn benchmark_history(conn: &Connection, month: &str) -> Result<Vec<BenchmarkPoint>> {
    let mut points = Vec::new();
    for p in trend(conn, month, 12)? {
        let (year, mon) = parse_month(&p.month)?;
        let (py, pm) = shift_month(year, mon, -12);
        let prior = match find_report(conn, &month_key(py, pm))? {
            Some(report) => Some(month_figures(conn, &report)?),
            None => None,
        };
        let f = &p.figures;
        points.push(BenchmarkPoint {
            revenue: f.revenue,
            gpm: f.gpm(),
            opm: f.npm(),
            npm: f.npm(),
            yoy_revenue_growth: yoy_growth(f.revenue, prior.map(|x| x.revenue)),
            yoy_profit_growth: yoy_growth(f.net_profit, prior.map(|x| x.net_profit)),
            month: p.month,
        });
    }
    Ok(points)
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalysisKind {
    Cost,
    Revenue,
    Profitability,
}

impl AnalysisKind {
    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "cost" => Ok(Self::Cost),
            "revenue" => Ok(Self::Revenue),
            "profitability" => Ok(Self::Profitability),
            other => Err(FinrepError::UnknownOption(format!(
                "{other} (expected cost, revenue or profitability)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownItem {
    pub name: String,
    pub amount: f64,
    pub pct: f64,
}

pub struct Breakdown {
    pub items: Vec<BreakdownItem>,
    pub total: f64,
}

/// Per-account totals of one category in the report month, largest first.
pub fn get_breakdown(conn: &Connection, report: &Report, category: Category) -> Result<Breakdown> {
    let mut stmt = conn.prepare(
        "SELECT account_name, SUM(actuals) as total FROM pnl_data \
         WHERE report_id = ?1 AND month = ?2 AND category = ?3 \
         GROUP BY account_name ORDER BY total DESC",
    )?;
    let raw: Vec<(String, f64)> = stmt
        .query_map(rusqlite::params![report.id, report.month, category.as_str()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let total: f64 = raw.iter().map(|(_, t)| t).sum();
    let items = raw
        .into_iter()
        .map(|(name, amount)| BreakdownItem {
            name,
            amount,
            pct: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
        })
        .collect();
    Ok(Breakdown { items, total })
}
