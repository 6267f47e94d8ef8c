//! Polars `AnyValue` cell conversions.

use polars::prelude::AnyValue;

/// Converts a cell to its string form; `Null` becomes an empty string.
///
/// Integral floats lose their trailing `.0` so numeric patient ids read back
/// as `"1001"` rather than `"1001.0"`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use comorb_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int64(1001)), "1001");
/// assert_eq!(any_to_string(AnyValue::Float64(1001.0)), "1001");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.trim().to_string(),
        AnyValue::StringOwned(s) => s.trim().to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Formats a float without trailing zeros.
///
/// ```
/// use comorb_common::format_numeric;
///
/// assert_eq!(format_numeric(2.0), "2");
/// assert_eq!(format_numeric(2.50), "2.5");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Reads a category cell as an integer count.
///
/// Booleans map to 0/1, floats must be integral, `Null` is treated as absent
/// (`Some(0)`). Returns `None` for values that are not counts at all.
pub fn any_to_count(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => Some(0),
        AnyValue::Boolean(b) => Some(i64::from(b)),
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::Float32(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        AnyValue::Float64(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        AnyValue::String(s) => parse_count(s),
        AnyValue::StringOwned(s) => parse_count(&s),
        _ => None,
    }
}

/// Reads a score cell as `f64`; `Null` and non-numeric values give `None`.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
}

/// Parses R-style count spellings: integers, integral floats, `TRUE`/`FALSE`,
/// and `NA`/blank as zero.
pub fn parse_count(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    match trimmed {
        "" | "NA" => return Some(0),
        "TRUE" | "true" | "T" => return Some(1),
        "FALSE" | "false" | "F" => return Some(0),
        _ => {}
    }
    if let Ok(count) = trimmed.parse::<i64>() {
        return Some(count);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
}

/// Parses a string as `f64`, returning `None` for blank, `NA` or invalid input.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "NA" {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_strings_are_trimmed() {
        assert_eq!(any_to_string(AnyValue::String(" P1 ")), "P1");
    }

    #[test]
    fn test_format_numeric_keeps_integers() {
        assert_eq!(format_numeric(10.0), "10");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(-0.0), "0");
    }

    #[test]
    fn test_any_to_count() {
        assert_eq!(any_to_count(AnyValue::Null), Some(0));
        assert_eq!(any_to_count(AnyValue::Boolean(true)), Some(1));
        assert_eq!(any_to_count(AnyValue::Int32(2)), Some(2));
        assert_eq!(any_to_count(AnyValue::Float64(1.0)), Some(1));
        assert_eq!(any_to_count(AnyValue::String("TRUE")), Some(1));
        assert_eq!(any_to_count(AnyValue::String("chf")), None);
    }

    #[test]
    fn fractional_float_counts_are_rejected() {
        assert_eq!(any_to_count(AnyValue::Float64(2.0)), Some(2));
        assert_eq!(any_to_count(AnyValue::Float32(-0.0)), Some(0));
        assert_eq!(any_to_count(AnyValue::Float64(1.7)), None);
        assert_eq!(any_to_count(AnyValue::Float32(0.5)), None);
        assert_eq!(any_to_count(AnyValue::String("1.7")), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("NA"), Some(0));
        assert_eq!(parse_count(" 3 "), Some(3));
        assert_eq!(parse_count("2.0"), Some(2));
        assert_eq!(parse_count("2.5"), None);
    }

    #[test]
    fn test_any_to_f64() {
        assert_eq!(any_to_f64(AnyValue::Null), None);
        assert_eq!(any_to_f64(AnyValue::Int64(4)), Some(4.0));
        assert_eq!(any_to_f64(AnyValue::String("-1.5")), Some(-1.5));
        assert_eq!(any_to_f64(AnyValue::String("NA")), None);
    }
}
