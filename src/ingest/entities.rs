use serde::{Deserialize, Serialize};
use tracing::warn;

use super::IngestContext;
use crate::cell::Cell;
use crate::models::{EntitySummary, Record, Split};
use crate::workbook::Sheet;

const ANCHOR: &str = "Revenue";
const REVENUE_ROW: &str = "Revenue";
const COST_ROW: &str = "Cost of Sales";

/// How the Revenue / Cost of Sales rows are found for each entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityScope {
    /// First matching row anywhere below the anchor, shared by every entity.
    /// On a multi-entity sheet all entities therefore read the same figures.
    #[default]
    Sheet,
    /// Rows between an entity's label and the next entity's label.
    Entity,
}

impl EntityScope {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Sheet => "sheet",
            Self::Entity => "entity",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "sheet" => Some(Self::Sheet),
            "entity" => Some(Self::Entity),
            _ => None,
        }
    }
}

pub fn extract(sheet: &Sheet, ctx: &IngestContext) -> Vec<Record> {
    let Some(anchor) = (0..sheet.rows.len()).find(|&r| is_anchor(sheet.cell(r, 0))) else {
        warn!(sheet = %sheet.name, "could not find entity data, skipping sheet");
        return Vec::new();
    };

    let labelled: Vec<(usize, String)> = (anchor..sheet.rows.len())
        .filter_map(|r| text_label(sheet.cell(r, 0)).map(|l| (r, l)))
        .collect();

    let entities: Vec<(usize, &str)> = labelled
        .iter()
        .filter(|(_, l)| !l.starts_with(REVENUE_ROW))
        .filter(|(_, l)| ctx.entity_scope == EntityScope::Sheet || l != COST_ROW)
        .map(|(r, l)| (*r, l.as_str()))
        .collect();

    let find = |label: &str, rows: std::ops::Range<usize>| {
        labelled
            .iter()
            .find(|(r, l)| rows.contains(r) && l == label)
            .map(|(r, _)| read_split(sheet, *r))
            .unwrap_or_default()
    };

    let mut records = Vec::with_capacity(entities.len());
    for (i, &(row, name)) in entities.iter().enumerate() {
        let rows = match ctx.entity_scope {
            EntityScope::Sheet => anchor..sheet.rows.len(),
            EntityScope::Entity => {
                let end = entities.get(i + 1).map_or(sheet.rows.len(), |(next, _)| *next);
                row + 1..end
            }
        };
        let revenue = find(REVENUE_ROW, rows.clone());
        let cost = find(COST_ROW, rows);
        records.push(Record::Entity(EntitySummary::new(ctx.report_id, name, revenue, cost)));
    }
    records
}

fn is_anchor(cell: &Cell) -> bool {
    cell.as_str().is_some_and(|s| s.contains(ANCHOR))
}

/// Only text cells label rows; numbers in the first column are ignored.
fn text_label(cell: &Cell) -> Option<String> {
    cell.as_str().and_then(|_| cell.label())
}

/// Columns 1..=3 hold local, interco and total. Anything non-numeric is 0.
fn read_split(sheet: &Sheet, row: usize) -> Split {
    let amount = |col| sheet.cell(row, col).amount().unwrap_or(0.0);
    Split {
        local: amount(1),
        interco: amount(2),
        total: amount(3),
    }
}
