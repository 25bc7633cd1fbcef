// Forgiving number parsing for hand-edited uploads and loosely typed documents.
//
// Uploaded spreadsheets and older store documents mix numbers, numeric
// strings and junk. Everything here degrades to zero instead of failing.

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Text parsing
// ---------------------------------------------------------------------------

/// Parse the longest leading decimal number in `raw`, or 0.0.
///
/// `"6.5"` → 6.5, `"6.5 (sv)"` → 6.5, `"n.d."` → 0.0. Non-finite results
/// (overflowing exponents) also collapse to 0.0.
pub fn float_or_zero(raw: &str) -> f64 {
    numeric_prefix(raw.trim(), true)
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parse the leading integer in `raw`, or 0. A fractional part is ignored,
/// so `"3.7"` → 3.
pub fn int_or_zero(raw: &str) -> i32 {
    numeric_prefix(raw.trim(), false)
        .and_then(|prefix| prefix.parse::<i32>().ok())
        .unwrap_or(0)
}

/// Returns the leading slice of `s` that forms a number, if it has at least
/// one digit. With `fractional`, a decimal point and exponent are accepted.
fn numeric_prefix(s: &str, fractional: bool) -> Option<&str> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < len && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if fractional {
        if end < len && bytes[end] == b'.' {
            let frac_start = end + 1;
            let mut frac_end = frac_start;
            while frac_end < len && bytes[frac_end].is_ascii_digit() {
                frac_end += 1;
            }
            if frac_end > frac_start {
                digits += frac_end - frac_start;
                end = frac_end;
            }
        }

        if digits > 0 && end < len && matches!(bytes[end], b'e' | b'E') {
            let mut exp_end = end + 1;
            if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            let exp_digits = exp_end;
            while exp_end < len && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            if exp_end > exp_digits {
                end = exp_end;
            }
        }
    }

    (digits > 0).then(|| &s[..end])
}

// ---------------------------------------------------------------------------
// Serde adapters
// ---------------------------------------------------------------------------

/// Any JSON value: numbers and strings are interpreted, everything else is
/// treated as absent.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    #[allow(dead_code)]
    Other(serde::de::IgnoredAny),
}

impl Loose {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Loose::Number(v) if v.is_finite() => Some(*v),
            Loose::Text(s) if numeric_prefix(s.trim(), true).is_some() => Some(float_or_zero(s)),
            _ => None,
        }
    }
}

/// `#[serde(deserialize_with)]` adapter: number or numeric string, else 0.0.
pub fn de_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Loose::deserialize(deserializer)?.as_f64().unwrap_or(0.0))
}

/// `#[serde(deserialize_with)]` adapter: number or numeric string, else `None`.
pub fn de_opt_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Loose::deserialize(deserializer)?.as_f64())
}

/// `#[serde(deserialize_with)]` adapter: integer-ish value, else 0.
pub fn de_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let value = match Loose::deserialize(deserializer)? {
        Loose::Number(v) if v.is_finite() => v.trunc() as i32,
        Loose::Text(s) => int_or_zero(&s),
        _ => 0,
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
