use crate::models::Category;

// Checked in order; the first matching keyword wins.
const CATEGORY_KEYWORDS: &[(&str, Category)] = &[
    ("revenue", Category::Revenue),
    ("cost", Category::DirectCosts),
    ("direct cost", Category::DirectCosts),
    ("opex", Category::Opex),
    ("expense", Category::Opex),
    ("profit", Category::Profit),
];

const MONTHS: &[(&str, &str)] = &[
    ("jan", "01"),
    ("feb", "02"),
    ("mar", "03"),
    ("apr", "04"),
    ("may", "05"),
    ("jun", "06"),
    ("jul", "07"),
    ("aug", "08"),
    ("sep", "09"),
    ("oct", "10"),
    ("nov", "11"),
    ("dec", "12"),
];

pub fn categorize(account_name: &str) -> Category {
    let lower = account_name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, cat)| *cat)
        .unwrap_or(Category::Other)
}

/// Two-digit month number for a three-letter abbreviation. Unknown
/// abbreviations fall back to `"01"`.
pub fn month_number(abbrev: &str) -> &'static str {
    let lower = abbrev.to_lowercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, num)| *num)
        .unwrap_or("01")
}

pub fn month_token(year: i32, abbrev: &str) -> String {
    format!("{year:04}-{}", month_number(abbrev))
}
