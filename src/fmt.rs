/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative && abs >= 0.005 {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

pub fn pct(val: f64) -> String {
    format!("{val:.1}%")
}

/// Signed change, e.g. `+4.2%` or `-0.8pp`.
pub fn change(val: f64, unit: &str) -> String {
    format!("{val:+.1}{unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(-0.001), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_pct_and_change() {
        assert_eq!(pct(25.0), "25.0%");
        assert_eq!(pct(-3.26), "-3.3%");
        assert_eq!(change(4.24, "%"), "+4.2%");
        assert_eq!(change(-0.8, "pp"), "-0.8pp");
        assert_eq!(change(0.0, "%"), "+0.0%");
    }
}
