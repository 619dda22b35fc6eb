use crate::models::validation::is_valid_hex_color;
use crate::models::DEFAULT_CURRENCY;

/// Format a price followed by its currency label.
/// Whole amounts drop the decimals: `15 ج.م`, `12.5 ج.م`.
pub fn format_currency(amount: f64, currency: Option<&str>) -> String {
    let currency = currency.filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CURRENCY);
    let number = if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        let fixed = format!("{:.2}", amount);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    format!("{} {}", number, currency)
}

/// Parse `#RGB` or `#RRGGBB` into components
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    if !is_valid_hex_color(hex) {
        return None;
    }
    let digits = &hex[1..];
    let expanded: String = if digits.len() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };
    let num = u32::from_str_radix(&expanded, 16).ok()?;
    Some(((num >> 16) as u8, (num >> 8) as u8, num as u8))
}

/// Darken a hex color by `fraction` (0.0 keeps it, 1.0 gives black)
pub fn darken_color(hex: &str, fraction: f64) -> Option<(u8, u8, u8)> {
    let (r, g, b) = hex_to_rgb(hex)?;
    let factor = (1.0 - fraction).clamp(0.0, 1.0);
    let scale = |c: u8| (c as f64 * factor).floor() as u8;
    Some((scale(r), scale(g), scale(b)))
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value.as_deref().unwrap_or(default).to_string()
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(15.0, None), "15 ج.م");
        assert_eq!(format_currency(12.5, Some("$")), "12.5 $");
        assert_eq!(format_currency(9.99, Some("")), "9.99 ج.م");
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#D97706"), Some((217, 119, 6)));
        assert_eq!(hex_to_rgb("#fff"), Some((255, 255, 255)));
        assert_eq!(hex_to_rgb("D97706"), None);
        assert_eq!(hex_to_rgb("#GGGGGG"), None);
    }

    #[test]
    fn test_darken_color() {
        assert_eq!(darken_color("#D97706", 0.0), Some((217, 119, 6)));
        assert_eq!(darken_color("#D97706", 0.2), Some((173, 95, 4)));
        assert_eq!(darken_color("#ffffff", 1.5), Some((0, 0, 0)));
        assert_eq!(darken_color("nope", 0.2), None);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("مشروبات ساخنة", 8), "مشروب...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-03-01T10:00:00Z"), "Mar 01, 2026");
        assert_eq!(format_date("2026-03-01 10:00"), "2026-03-01");
        assert_eq!(format_date("soon"), "soon");
    }
}
