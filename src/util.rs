// Parsing and formatting helpers.
//
// Storm exports carry padded cells, thousands separators and dates with a
// trailing time part; this module absorbs that so the loader and
// normalizer work with typed values.
use chrono::{Datelike, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Parse a cell into `f64`, forgiving about padding and separators.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a count cell. Exports write counts as `3` or `3.00`; a fractional
/// part or a value outside the `i64` range is rejected.
pub fn parse_count(s: Option<&str>) -> Option<i64> {
    let v = parse_f64_safe(s)?;
    if v.fract() != 0.0 {
        return None;
    }
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    if v < i64::MIN as f64 || v >= i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}

/// Year of a `BGN_DATE` cell such as `4/18/1950 0:00:00`.
pub fn parse_event_year(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, "%m/%d/%Y %H:%M:%S")
        .ok()
        .map(|dt| dt.year())
}

/// Uppercase, trim, and collapse internal whitespace runs to one space.
pub fn normalize_whitespace_upper(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // num-format inserts the separators into the integer part only.
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Horizontal bar proportional to `value / max`, at most `width` cells.
pub fn text_bar(value: f64, max: f64, width: usize) -> String {
    if !(max > 0.0) || !(value > 0.0) {
        return String::new();
    }
    let cells = ((value / max) * width as f64).round() as usize;
    "#".repeat(cells.clamp(1, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_and_separated_numbers() {
        assert_eq!(parse_f64_safe(Some(" 1,250.5 ")), Some(1250.5));
        assert_eq!(parse_f64_safe(Some("0.00")), Some(0.0));
        assert_eq!(parse_f64_safe(Some("12K")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn counts_reject_fractions() {
        assert_eq!(parse_count(Some("3.00")), Some(3));
        assert_eq!(parse_count(Some("-2")), Some(-2));
        assert_eq!(parse_count(Some("2.5")), None);
    }

    #[test]
    fn counts_outside_i64_are_rejected() {
        assert_eq!(parse_count(Some("99999999999999999999")), None);
        assert_eq!(parse_count(Some("-99999999999999999999")), None);
        assert_eq!(parse_count(Some("9223372036854775808")), None);
        assert_eq!(parse_count(Some("1000000000000")), Some(1_000_000_000_000));
    }

    #[test]
    fn event_year_from_storm_date() {
        assert_eq!(parse_event_year(Some("4/18/1950 0:00:00")), Some(1950));
        assert_eq!(parse_event_year(Some("11/30/2011 0:00:00")), Some(2011));
        assert_eq!(parse_event_year(Some("not a date")), None);
    }

    #[test]
    fn whitespace_is_collapsed_and_uppercased() {
        assert_eq!(normalize_whitespace_upper("  tstm   wind\t(g45) "), "TSTM WIND (G45)");
        assert_eq!(normalize_whitespace_upper("   "), "");
    }

    #[test]
    fn numbers_get_separators() {
        assert_eq!(format_number(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(0.0, 1), "0.0");
        assert_eq!(format_int(96_979i64), "96,979");
    }

    #[test]
    fn bars_scale_to_leader() {
        assert_eq!(text_bar(100.0, 100.0, 10), "##########");
        assert_eq!(text_bar(50.0, 100.0, 10), "#####");
        assert_eq!(text_bar(0.1, 100.0, 10), "#");
        assert_eq!(text_bar(0.0, 100.0, 10), "");
    }
}
