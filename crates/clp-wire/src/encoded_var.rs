// Four-byte encoding of numeric variables.
//
// Integers are stored as their i32 value. Floats are packed into 32 bits so
// that decoding reproduces the exact original text, leading zeros included:
//
// ┌──────┬──────────────────┬────────────────┬─────────────────────┐
// │ bit  │ 31               │ 30..6          │ 5..3     │ 2..0     │
// ├──────┼──────────────────┼────────────────┼──────────┼──────────┤
// │      │ sign (1 = "-")   │ digits (25 b)  │ ndigits-1│ decpos-1 │
// └──────┴──────────────────┴────────────────┴──────────┴──────────┘
//
// `decpos` counts digits to the right of the decimal point. "-012.50" is
// sign=1, digits=1250, ndigits=5, decpos=2.

/// Maximum number of digits a four-byte float may carry.
pub const MAX_FLOAT_DIGITS: u32 = 8;

const FLOAT_DIGITS_MASK: u32 = (1 << 25) - 1;

/// Encode `text` as a four-byte integer variable.
///
/// Only text that decodes back to exactly itself is accepted: no `+` sign,
/// no leading zeros, no `-0`, and the value must fit in an `i32`.
pub fn encode_integer_var(text: &str) -> Option<i32> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if text == "-0" {
        return None;
    }
    text.parse().ok()
}

/// Decode a four-byte integer variable.
pub fn decode_integer_var(value: i32) -> String {
    value.to_string()
}

/// Encode `text` as a four-byte float variable.
///
/// Accepts an optional `-`, then at least one digit, a `.`, and at least one
/// digit, with at most [`MAX_FLOAT_DIGITS`] digits overall.
pub fn encode_float_var(text: &str) -> Option<i32> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let dot = body.find('.')?;
    if dot == 0 || dot == body.len() - 1 {
        return None;
    }

    let mut digits: u32 = 0;
    let mut num_digits: u32 = 0;
    for (i, b) in body.bytes().enumerate() {
        if i == dot {
            continue;
        }
        if !b.is_ascii_digit() {
            return None;
        }
        num_digits += 1;
        if num_digits > MAX_FLOAT_DIGITS {
            return None;
        }
        digits = digits * 10 + u32::from(b - b'0');
    }
    if digits > FLOAT_DIGITS_MASK {
        return None;
    }

    // Both are in 1..=MAX_FLOAT_DIGITS here
    #[allow(clippy::cast_possible_truncation)]
    let decimal_pos = (body.len() - 1 - dot) as u32;

    let mut bits = u32::from(negative) << 31;
    bits |= digits << 6;
    bits |= (num_digits - 1) << 3;
    bits |= decimal_pos - 1;

    #[allow(clippy::cast_possible_wrap)]
    Some(bits as i32)
}

/// Decode a four-byte float variable.
///
/// Returns `None` if the packed fields are inconsistent (more digits than
/// `ndigits`, or a decimal point at or before the first digit), which can
/// only come from corrupted input.
pub fn decode_float_var(value: i32) -> Option<String> {
    #[allow(clippy::cast_sign_loss)]
    let bits = value as u32;
    let negative = bits >> 31 == 1;
    let digits = (bits >> 6) & FLOAT_DIGITS_MASK;
    let num_digits = ((bits >> 3) & 0b111) as usize + 1;
    let decimal_pos = (bits & 0b111) as usize + 1;

    if decimal_pos >= num_digits {
        return None;
    }

    let padded = format!("{digits:0num_digits$}");
    if padded.len() != num_digits {
        return None;
    }

    let split = num_digits - decimal_pos;
    let mut out = String::with_capacity(num_digits + 2);
    if negative {
        out.push('-');
    }
    out.push_str(&padded[..split]);
    out.push('.');
    out.push_str(&padded[split..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_that_roundtrip_are_encoded() {
        for text in ["0", "7", "-7", "2147483647", "-2147483648", "1000"] {
            let encoded = encode_integer_var(text).unwrap_or_else(|| panic!("{text}"));
            assert_eq!(decode_integer_var(encoded), text);
        }
    }

    #[test]
    fn integers_that_would_change_are_rejected() {
        for text in ["", "-", "+1", "01", "-0", "-01", "2147483648", "12a", "1.0"] {
            assert_eq!(encode_integer_var(text), None, "{text:?}");
        }
    }

    #[test]
    fn floats_preserve_exact_text() {
        for text in ["0.5", "-0.5", "3.14159", "012.50", "9.0", "-1234.5678", "0.0000001"] {
            let encoded = encode_float_var(text).unwrap_or_else(|| panic!("{text}"));
            assert_eq!(decode_float_var(encoded).as_deref(), Some(text));
        }
    }

    #[test]
    fn float_layout_matches_documented_bits() {
        #[allow(clippy::cast_sign_loss)]
        let bits = encode_float_var("-012.50").unwrap() as u32;
        assert_eq!(bits >> 31, 1);
        assert_eq!((bits >> 6) & FLOAT_DIGITS_MASK, 1250);
        assert_eq!((bits >> 3) & 0b111, 4);
        assert_eq!(bits & 0b111, 1);
    }

    #[test]
    fn floats_outside_the_format_are_rejected() {
        for text in [
            "1", ".5", "5.", "1.2.3", "1e5", "-", "123456789.0", "99999999.9", "3.3.", "--1.0",
        ] {
            assert_eq!(encode_float_var(text), None, "{text:?}");
        }
    }

    #[test]
    fn largest_float_digit_count_fits() {
        let encoded = encode_float_var("3355443.1").unwrap();
        assert_eq!(decode_float_var(encoded).as_deref(), Some("3355443.1"));
    }

    #[test]
    fn inconsistent_float_fields_fail_to_decode() {
        // ndigits = 1, decpos = 1: the point would sit before every digit.
        assert_eq!(decode_float_var(0b1_000_000), None);
        // digits = 100 with ndigits = 2.
        let bits: u32 = (100 << 6) | (1 << 3);
        #[allow(clippy::cast_possible_wrap)]
        let value = bits as i32;
        assert_eq!(decode_float_var(value), None);
    }
}
