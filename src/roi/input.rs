//! Lenient numeric coercion for ROI form fields.
//!
//! Form fields never reject input: whatever the user types is read the way
//! a browser's `parseFloat(value) || 0` would read it. The longest numeric
//! prefix wins, and anything unparseable (or zero, or NaN) becomes `0`.

use serde_json::Value;

/// Parse the numeric prefix of `raw`, falling back to `0.0`.
///
/// ```
/// use automation_hub::roi::input::parse_lenient;
/// assert_eq!(parse_lenient(" 12.5kg"), 12.5);
/// assert_eq!(parse_lenient("abc"), 0.0);
/// ```
pub fn parse_lenient(raw: &str) -> f64 {
    let value = numeric_prefix(raw.trim_start()).unwrap_or(f64::NAN);
    if value.is_nan() || value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Coerce a JSON value submitted by a form. Numbers pass through (NaN and
/// zero normalised), strings are parsed leniently, everything else is 0.
pub fn coerce_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => {
            let v = n.as_f64().unwrap_or(0.0);
            if v == 0.0 {
                0.0
            } else {
                v
            }
        }
        Value::String(s) => parse_lenient(s),
        _ => 0.0,
    }
}

fn numeric_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut negative = false;

    if let Some(&sign) = bytes.first() {
        if sign == b'+' || sign == b'-' {
            negative = sign == b'-';
            i = 1;
        }
    }

    if s[i..].starts_with("Infinity") {
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut digits = i - int_start;

    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows.
    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_digits_start = j;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_digits_start {
            i = j;
        }
    }

    s[..i].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_lenient("10"), 10.0);
        assert_eq!(parse_lenient("2.5"), 2.5);
        assert_eq!(parse_lenient("-3"), -3.0);
        assert_eq!(parse_lenient("+4"), 4.0);
    }

    #[test]
    fn test_non_numeric_is_zero() {
        assert_eq!(parse_lenient(""), 0.0);
        assert_eq!(parse_lenient("   "), 0.0);
        assert_eq!(parse_lenient("abc"), 0.0);
        assert_eq!(parse_lenient("."), 0.0);
        assert_eq!(parse_lenient("-"), 0.0);
        assert_eq!(parse_lenient("NaN"), 0.0);
    }

    #[test]
    fn test_prefix_parsing() {
        assert_eq!(parse_lenient("  42 hours"), 42.0);
        assert_eq!(parse_lenient("3.14.15"), 3.14);
        assert_eq!(parse_lenient(".5"), 0.5);
        assert_eq!(parse_lenient("5."), 5.0);
        assert_eq!(parse_lenient("$25"), 0.0);
    }

    #[test]
    fn test_exponent() {
        assert_eq!(parse_lenient("1e3"), 1000.0);
        assert_eq!(parse_lenient("2E-1"), 0.2);
        assert_eq!(parse_lenient("7e"), 7.0);
        assert_eq!(parse_lenient("7e+"), 7.0);
    }

    #[test]
    fn test_infinity() {
        assert_eq!(parse_lenient("Infinity"), f64::INFINITY);
        assert_eq!(parse_lenient("-Infinityx"), f64::NEG_INFINITY);
        assert_eq!(parse_lenient("infinity"), 0.0);
    }

    #[test]
    fn test_negative_zero_normalised() {
        let v = parse_lenient("-0");
        assert_eq!(v, 0.0);
        assert!(v.is_sign_positive());
    }

    #[test]
    fn test_coerce_json_values() {
        assert_eq!(coerce_value(&json!(12)), 12.0);
        assert_eq!(coerce_value(&json!("7.5")), 7.5);
        assert_eq!(coerce_value(&json!(null)), 0.0);
        assert_eq!(coerce_value(&json!(true)), 0.0);
        assert_eq!(coerce_value(&json!(["1"])), 0.0);
    }
}
