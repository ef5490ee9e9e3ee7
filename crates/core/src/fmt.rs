//! Formatting utilities shared by the CLI renderers.

/// Format a USD amount compactly (e.g. "$1.23M", "$4.56K", "$7.89").
pub fn format_usd(n: f64) -> String {
    if !n.is_finite() {
        return "—".to_string();
    }
    if n.abs() >= 1_000_000.0 {
        format!("${:.2}M", n / 1_000_000.0)
    } else if n.abs() >= 1_000.0 {
        format!("${:.2}K", n / 1_000.0)
    } else if n != 0.0 && n.abs() < 0.01 {
        format!("${n:.6}")
    } else {
        format!("${n:.2}")
    }
}

/// Token quantity with decimal places adapted to magnitude.
pub fn format_balance(n: f64) -> String {
    if n.abs() >= 100_000.0 {
        format!("{n:.0}")
    } else if n.abs() >= 1000.0 {
        format!("{n:.2}")
    } else if n.abs() >= 1.0 {
        format!("{n:.4}")
    } else {
        format!("{n:.6}")
    }
}

/// Signed percentage, e.g. "+2.50%" / "-0.75%".
pub fn format_percent(n: f64) -> String {
    format!("{n:+.2}%")
}

/// `0x1234…abcd` form for table cells.
pub fn short_address(addr: &str) -> String {
    if addr.len() <= 12 || !addr.is_ascii() {
        return addr.to_string();
    }
    format!("{}…{}", &addr[..6], &addr[addr.len() - 4..])
}

/// Truncate a string to `max` characters, char-boundary safe.
pub fn truncate_str(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1_234_567.0), "$1.23M");
        assert_eq!(format_usd(4_560.0), "$4.56K");
        assert_eq!(format_usd(7.891), "$7.89");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(0.000123), "$0.000123");
        assert_eq!(format_usd(-2_500.0), "$-2.50K");
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(250_000.4), "250000");
        assert_eq!(format_balance(1234.567), "1234.57");
        assert_eq!(format_balance(1.5), "1.5000");
        assert_eq!(format_balance(0.0000016), "0.000002");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(2.5), "+2.50%");
        assert_eq!(format_percent(-0.754), "-0.75%");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
            "0xd8dA…6045"
        );
        assert_eq!(short_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hi", 5), "hi");
        assert_eq!(truncate_str("héllo", 2), "hé");
    }
}
