use std::sync::OnceLock;

use regex::Regex;

/// One spreadsheet cell as the extractors see it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Blank,
    Number(f64),
    Text(String),
}

impl Cell {
    #[cfg(test)]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Trimmed label text, or `None` for blank cells. Numeric labels are
    /// rendered the way a spreadsheet would show them.
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Blank => None,
            Self::Number(n) => Some(format_number(*n)),
            Self::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
        }
    }

    /// Raw text content, only for `Text` cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Finite numeric value of the cell. Text goes through [`parse_amount`].
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Blank => None,
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(s) => parse_amount(s),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn currency_symbols() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Sc}").expect("valid currency regex"))
}

/// Normalize accounting-formatted text and parse it.
///
/// Thousands separators and currency symbols are dropped and a value wrapped
/// in parentheses is negative: `"(1,234.50)"` is `-1234.5`, `"$2,500"` is
/// `2500.0`. Returns `None` when the remainder is not a finite number.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = currency_symbols().replace_all(raw, "");
    let s = s.replace(',', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        Some(inner) => -inner.trim().parse::<f64>().ok()?,
        None => s.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Parse a margin like `"12.5%"` or `"-3"`. A single trailing percent sign is
/// stripped; nothing else is normalized.
pub fn parse_percent(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
