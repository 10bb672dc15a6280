// Utility helpers for parsing, ratios and number formatting.
//
// Parsing here is strict: the loader turns every `None` into a schema error,
// so nothing downstream has to deal with text.
use chrono::Month;
use num_format::{Locale, ToFormattedString};

/// Parse a numeric CSV cell. Surrounding whitespace is ignored; anything else
/// that `f64::from_str` rejects (including an empty cell) yields `None`.
pub fn parse_f64(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Parse an integer cell. Accepts `"3"` and also `"3.0"`, which some
/// spreadsheet exports write for whole numbers.
pub fn parse_i64(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// `num / den`, or `None` when the denominator is zero.
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        None
    } else {
        Some(num / den)
    }
}

/// `num / den`, or 0 when the denominator is zero. Used for summary figures.
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    ratio(num, den).unwrap_or(0.0)
}

/// Mean of the defined values; `None` if there are none.
pub fn mean_defined(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Three-letter English month name, e.g. `Jan`.
pub fn month_label(month: u8) -> String {
    match Month::try_from(month) {
        Ok(m) => m.name()[..3].to_string(),
        Err(_) => month.to_string(),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
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

pub fn format_euros(n: f64, decimals: usize) -> String {
    format!("€{}", format_number(n, decimals))
}

/// Format a fraction as a percentage, e.g. `0.5` -> `50.00%`.
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

/// Render an undefined ratio as `n/a` instead of a number.
pub fn format_optional(v: Option<f64>, f: impl Fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_strictly() {
        assert_eq!(parse_f64(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_f64(Some("")), None);
        assert_eq!(parse_f64(Some("abc")), None);
        assert_eq!(parse_f64(Some("NaN")), None);
        assert_eq!(parse_f64(None), None);
    }

    #[test]
    fn parses_whole_floats_as_integers() {
        assert_eq!(parse_i64(Some("7")), Some(7));
        assert_eq!(parse_i64(Some("7.0")), Some(7));
        assert_eq!(parse_i64(Some("7.5")), None);
        assert_eq!(parse_i64(Some("July")), None);
    }

    #[test]
    fn ratio_is_undefined_for_zero_denominator() {
        assert_eq!(ratio(1.0, 0.0), None);
        assert_eq!(ratio(1.0, 4.0), Some(0.25));
        assert_eq!(ratio_or_zero(1.0, 0.0), 0.0);
    }

    #[test]
    fn mean_skips_undefined_values() {
        assert_eq!(mean_defined([Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean_defined([None, None]), None);
    }

    #[test]
    fn formats_like_the_dashboard() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_euros(5000.0, 0), "€5,000");
        assert_eq!(format_percent(0.5, 2), "50.00%");
        assert_eq!(format_optional(None, |v| format_number(v, 2)), "n/a");
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
    }
}
