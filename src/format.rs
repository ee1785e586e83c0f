// ---------------------------------------------------------------------------
// Display formatting for metrics, axes and table cells
// ---------------------------------------------------------------------------

/// Placeholder for an undefined value.
pub const NOT_AVAILABLE: &str = "—";

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Millions with two decimals, e.g. `"$12.34 M"`.
pub fn millions(value: f64) -> String {
    format!("${value:.2} M")
}

pub fn opt_millions(value: Option<f64>) -> String {
    value.map(millions).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `"7.5/10"`.
pub fn opt_rating(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}/10"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `"123.45%"`.
pub fn opt_percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Axis tick label for a money axis, e.g. `"$150M"`.
pub fn money_tick(value: f64) -> String {
    format!("${value:.0}M")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(5421), "5,421");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_money_and_rating() {
        assert_eq!(millions(12.346), "$12.35 M");
        assert_eq!(opt_millions(None), NOT_AVAILABLE);
        assert_eq!(opt_rating(Some(7.46)), "7.5/10");
        assert_eq!(opt_percent(Some(400.0)), "400.00%");
        assert_eq!(opt_percent(None), NOT_AVAILABLE);
        assert_eq!(money_tick(150.0), "$150M");
    }
}
