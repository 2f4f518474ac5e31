//! Number parsing and formatting with the semantics rating markup expects:
//! lenient leading-prefix parsing and fixed two-decimal output.

/// Parses the longest numeric prefix of `text`, ignoring leading whitespace
/// and any trailing characters (`"4.5 stars"` is `4.5`).
///
/// Accepts an optional sign followed by `Infinity` or a decimal literal with
/// optional fraction and exponent. Returns `None` when no prefix is numeric.
/// Hex and other radix prefixes are not recognized, so `"0x1"` is `0`.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start_matches(is_number_whitespace);
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    if s[i..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;

    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // The exponent only counts when at least one digit follows it.
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j.min(bytes.len())..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    s[..i].parse::<f64>().ok()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Whitespace skipped before a number: Unicode space separators, line
/// terminators and the byte order mark.
fn is_number_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{9}'
            | '\u{a}'
            | '\u{b}'
            | '\u{c}'
            | '\u{d}'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

/// Formats `value` with exactly two decimals.
///
/// Exact binary midpoints round away from zero (`0.125` is `"0.13"`), where
/// Rust's formatter would round to even. Negative zero prints as `"0.00"` and
/// magnitudes of 1e21 or more fall back to exponent form (`"1e+21"`).
pub fn format_fixed_2(value: f64) -> String {
    if value == 0.0 {
        return "0.00".to_string();
    }
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if magnitude >= 1e21 {
        return format!("{}{}", sign, format!("{:e}", magnitude).replacen('e', "e+", 1));
    }

    // A two-decimal midpoint is representable only as an odd multiple of 1/8.
    let eighths = magnitude * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let cents = (25 * eighths as u128 + 1) / 2;
        return format!("{}{}.{:02}", sign, cents / 100, cents % 100);
    }

    format!("{}{:.2}", sign, magnitude)
}
