use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{change, money, pct};
use crate::models::Category;
use crate::reports::{self, AnalysisKind, PnlTarget};
use crate::settings::get_db_path;

fn margin_cell(gpm: f64) -> Cell {
    if gpm < 0.0 {
        Cell::new(pct(gpm).red())
    } else {
        Cell::new(pct(gpm))
    }
}

pub fn dashboard(month: &str) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    let d = reports::get_dashboard(&conn, month)?;
    let k = &d.kpis;

    let mut kpi = Table::new();
    kpi.set_header(vec!["KPI", "Value", "vs prior month"]);
    kpi.add_row(vec![Cell::new("Revenue"), Cell::new(money(k.revenue)), Cell::new(change(k.revenue_change, "%"))]);
    kpi.add_row(vec![Cell::new("Gross margin"), Cell::new(pct(k.gpm)), Cell::new(change(k.gpm_change, "pp"))]);
    kpi.add_row(vec![Cell::new("Opex"), Cell::new(money(k.opex)), Cell::new(change(k.opex_change, "%"))]);
    let net_label = if k.net_profit >= 0.0 {
        "Net profit".green().bold()
    } else {
        "Net profit".red().bold()
    };
    kpi.add_row(vec![Cell::new(net_label), Cell::new(money(k.net_profit)), Cell::new(change(k.net_profit_change, "%"))]);
    println!("Dashboard {} ({})\n{kpi}", d.report.month, d.report.filename);

    if !d.monthly.is_empty() {
        let mut trend = Table::new();
        trend.set_header(vec!["Month", "Revenue", "Gross Profit", "Net Profit", "GPM", "NPM"]);
        for p in &d.monthly {
            let f = &p.figures;
            trend.add_row(vec![
                Cell::new(&p.month),
                Cell::new(money(f.revenue)),
                Cell::new(money(f.gross_profit)),
                Cell::new(money(f.net_profit)),
                Cell::new(pct(f.gpm())),
                Cell::new(pct(f.npm())),
            ]);
        }
        println!("\nMonthly trend\n{trend}");
    }

    if !d.entities.is_empty() {
        let mut entities = Table::new();
        entities.set_header(vec!["Entity", "Revenue", "Cost", "Gross Profit", "GPM"]);
        for e in &d.entities {
            entities.add_row(vec![
                Cell::new(&e.entity_name),
                Cell::new(money(e.total_revenue)),
                Cell::new(money(e.total_cost)),
                Cell::new(money(e.gross_profit())),
                margin_cell(e.gpm()),
            ]);
        }
        println!("\nEntities\n{entities}");
    }

    if !d.red_flags.is_empty() {
        let mut flags = Table::new();
        flags.set_header(vec!["Project", "Country", "GPM", "Comment"]);
        for f in &d.red_flags {
            flags.add_row(vec![
                Cell::new(&f.project_name),
                Cell::new(&f.country),
                margin_cell(f.gpm),
                Cell::new(&f.comment),
            ]);
        }
        println!("\n{}\n{flags}", "Red flags".red().bold());
    }
    Ok(())
}

pub fn pnl(month: &str, target: Option<&str>) -> Result<()> {
    let target = target.map(PnlTarget::from_key).transpose()?;
    let conn = get_connection(&get_db_path())?;
    let report = reports::require_report(&conn, month)?;
    let items = reports::get_line_items(&conn, report.id, target)?;

    if items.is_empty() {
        println!("No line items for {month}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Account", "Category", "Month", "Actuals"]);
    for item in &items {
        table.add_row(vec![
            Cell::new(&item.account_name),
            Cell::new(item.category),
            Cell::new(&item.month),
            Cell::new(money(item.actuals)),
        ]);
    }
    println!("P&L {month}\n{table}");
    Ok(())
}

pub fn analysis(month: &str, kind: &str) -> Result<()> {
    let kind = AnalysisKind::from_key(kind)?;
    let conn = get_connection(&get_db_path())?;
    let report = reports::require_report(&conn, month)?;

    let (title, category) = match kind {
        AnalysisKind::Cost => ("Cost breakdown", Category::Opex),
        AnalysisKind::Revenue => ("Revenue breakdown", Category::Revenue),
        AnalysisKind::Profitability => return profitability(&conn, month),
    };

    let breakdown = reports::get_breakdown(&conn, &report, category)?;
    let mut table = Table::new();
    table.set_header(vec!["Account", "Amount", "Share"]);
    for item in &breakdown.items {
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(money(item.amount)),
            Cell::new(pct(item.pct)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(breakdown.total)),
        Cell::new(""),
    ]);
    println!("{title} {month}\n{table}");
    Ok(())
}

pub fn benchmark(month: &str) -> Result<()> {
    let conn = get_connection(&get_db_path())?;
    reports::require_report(&conn, month)?;
    let points = reports::benchmark_history(&conn, month)?;

    let mut table = Table::new();
    table.set_header(vec!["Month", "Revenue", "GPM", "OPM", "NPM", "YoY Revenue", "YoY Profit"]);
    for p in &points {
        table.add_row(vec![
            Cell::new(&p.month),
            Cell::new(money(p.revenue)),
            margin_cell(p.gpm),
            margin_cell(p.opm),
            margin_cell(p.npm),
            Cell::new(change(p.yoy_revenue_growth, "%")),
            Cell::new(change(p.yoy_profit_growth, "%")),
        ]);
    }
    println!("Benchmark, 12 months to {month}\n{table}");
    Ok(())
}

fn profitability(conn: &rusqlite::Connection, month: &str) -> Result<()> {
    let points = reports::trend(conn, month, 12)?;
    let mut table = Table::new();
    table.set_header(vec!["Month", "Revenue", "Direct Costs", "Gross Profit", "Opex", "Net Profit", "GPM", "NPM"]);
    for p in &points {
        let f = &p.figures;
        table.add_row(vec![
            Cell::new(&p.month),
            Cell::new(money(f.revenue)),
            Cell::new(money(f.direct_costs)),
            Cell::new(money(f.gross_profit)),
            Cell::new(money(f.opex)),
            Cell::new(money(f.net_profit)),
            margin_cell(f.gpm()),
            margin_cell(f.npm()),
        ]);
    }
    println!("Profitability, 12 months to {month}\n{table}");
    Ok(())
}
