use std::fmt;

/// Coarse P&L bucket derived from an account label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Revenue,
    DirectCosts,
    Opex,
    Profit,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::DirectCosts => "Direct Costs",
            Self::Opex => "Opex",
            Self::Profit => "Profit",
            Self::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Revenue" => Some(Self::Revenue),
            "Direct Costs" => Some(Self::DirectCosts),
            "Opex" => Some(Self::Opex),
            "Profit" => Some(Self::Profit),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Report {
    pub id: i64,
    pub filename: String,
    pub file_path: String,
    pub upload_date: String,
    pub month: String,
    pub year: i32,
    pub is_processed: bool,
    pub checksum: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub report_id: i64,
    pub account_name: String,
    pub category: Category,
    /// `YYYY-MM`
    pub month: String,
    pub actuals: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedFlag {
    pub report_id: i64,
    pub project_name: String,
    pub country: String,
    pub gpm: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub report_id: i64,
    pub entity_name: String,
    pub local_revenue: f64,
    pub interco_revenue: f64,
    pub total_revenue: f64,
    pub local_cost: f64,
    pub interco_cost: f64,
    pub total_cost: f64,
}

/// Local / interco / total amounts read from one Revenue or Cost of Sales row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Split {
    pub local: f64,
    pub interco: f64,
    pub total: f64,
}

impl EntitySummary {
    pub fn new(report_id: i64, entity_name: impl Into<String>, revenue: Split, cost: Split) -> Self {
        Self {
            report_id,
            entity_name: entity_name.into(),
            local_revenue: revenue.local,
            interco_revenue: revenue.interco,
            total_revenue: revenue.total,
            local_cost: cost.local,
            interco_cost: cost.interco,
            total_cost: cost.total,
        }
    }

    pub fn gross_profit(&self) -> f64 {
        self.total_revenue - self.total_cost
    }

    /// Gross margin in percent; 0 unless total revenue is positive.
    pub fn gpm(&self) -> f64 {
        if self.total_revenue > 0.0 {
            self.gross_profit() / self.total_revenue * 100.0
        } else {
            0.0
        }
    }
}

/// Anything the ingestion pipeline hands to a [`crate::store::RecordSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    LineItem(LineItem),
    RedFlag(RedFlag),
    Entity(EntitySummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_summary_derives_profit_and_margin() {
        let e = EntitySummary::new(
            1,
            "Kenya Ltd",
            Split { local: 600.0, interco: 400.0, total: 1000.0 },
            Split { local: 500.0, interco: 250.0, total: 750.0 },
        );
        assert_eq!(e.gross_profit(), 250.0);
        assert_eq!(e.gpm(), 250.0 / 1000.0 * 100.0);
    }

    #[test]
    fn test_entity_summary_zero_revenue_has_zero_margin() {
        let e = EntitySummary::new(1, "Dormant", Split::default(), Split { total: 90.0, ..Split::default() });
        assert_eq!(e.gross_profit(), -90.0);
        assert_eq!(e.gpm(), 0.0);

        let negative = EntitySummary::new(1, "Reversal", Split { total: -10.0, ..Split::default() }, Split::default());
        assert_eq!(negative.gpm(), 0.0);
    }

    #[test]
    fn test_category_label_roundtrip() {
        for cat in [Category::Revenue, Category::DirectCosts, Category::Opex, Category::Profit, Category::Other] {
            assert_eq!(Category::from_label(cat.as_str()), Some(cat));
        }
        assert_eq!(Category::from_label("Cost"), None);
    }
}
