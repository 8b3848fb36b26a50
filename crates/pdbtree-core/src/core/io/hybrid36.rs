//! Hybrid-36 counters for fixed-width integer fields.
//!
//! Values fitting in `width` decimal digits are written as right-justified
//! decimal. Larger values continue in base 36 with an upper-case leading
//! digit, and then again with a lower-case leading digit, so the field never
//! grows wider than `width`.

use thiserror::Error;

const DIGITS_UPPER: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS_LOWER: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Width of the atom serial field (columns 7-11).
pub const SERIAL_WIDTH: usize = 5;
/// Width of the residue sequence number field (columns 23-26).
pub const RESSEQ_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Hy36Error {
    #[error("Value {value} is out of range for a hybrid-36 field of width {width}")]
    OutOfRange { width: usize, value: i64 },
    #[error("Invalid hybrid-36 literal '{text}' for a field of width {width}")]
    InvalidLiteral { width: usize, text: String },
    #[error("Unsupported hybrid-36 width {0} (must be 1..=9)")]
    UnsupportedWidth(usize),
}

fn check_width(width: usize) -> Result<(), Hy36Error> {
    if (1..=9).contains(&width) {
        Ok(())
    } else {
        Err(Hy36Error::UnsupportedWidth(width))
    }
}

fn pow10(width: usize) -> i64 {
    10_i64.pow(width as u32)
}

fn pow36(exp: usize) -> i64 {
    36_i64.pow(exp as u32)
}

/// Smallest value representable in a field of `width` characters.
pub fn min_value(width: usize) -> i64 {
    1 - pow10(width - 1)
}

/// Largest value representable in a field of `width` characters.
pub fn max_value(width: usize) -> i64 {
    pow10(width) + 52 * pow36(width - 1) - 1
}

fn encode_pure(digits: &[u8; 36], width: usize, mut value: i64) -> String {
    let mut buf = vec![b'0'; width];
    for slot in buf.iter_mut().rev() {
        *slot = digits[(value % 36) as usize];
        value /= 36;
    }
    // Only ASCII digits were written.
    String::from_utf8(buf).unwrap_or_default()
}

fn decode_pure(upper: bool, text: &str) -> Option<i64> {
    let mut value: i64 = 0;
    for c in text.bytes() {
        let digit = match c {
            b'0'..=b'9' => c - b'0',
            b'A'..=b'Z' if upper => c - b'A' + 10,
            b'a'..=b'z' if !upper => c - b'a' + 10,
            _ => return None,
        };
        value = value * 36 + i64::from(digit);
    }
    Some(value)
}

/// Encodes `value` into exactly `width` characters.
///
/// # Errors
///
/// Returns [`Hy36Error::OutOfRange`] if `value` lies outside
/// [`min_value`]`..=`[`max_value`] for `width`.
pub fn encode(width: usize, value: i64) -> Result<String, Hy36Error> {
    check_width(width)?;
    let out_of_range = || Hy36Error::OutOfRange { width, value };
    if value < min_value(width) {
        return Err(out_of_range());
    }
    if value < pow10(width) {
        return Ok(format!("{value:>width$}"));
    }
    let block = 26 * pow36(width - 1);
    let offset = 10 * pow36(width - 1);
    let mut i = value - pow10(width);
    if i < block {
        return Ok(encode_pure(DIGITS_UPPER, width, i + offset));
    }
    i -= block;
    if i < block {
        return Ok(encode_pure(DIGITS_LOWER, width, i + offset));
    }
    Err(out_of_range())
}

/// Decodes a hybrid-36 literal of exactly `width` characters.
///
/// A field of `width` blanks decodes to 0.
///
/// # Errors
///
/// Returns [`Hy36Error::InvalidLiteral`] if `text` has the wrong length or
/// contains a character outside the alphabet selected by its first character.
pub fn decode(width: usize, text: &str) -> Result<i64, Hy36Error> {
    check_width(width)?;
    let invalid = || Hy36Error::InvalidLiteral {
        width,
        text: text.to_string(),
    };
    if text.len() != width || !text.is_ascii() {
        return Err(invalid());
    }
    let first = text.as_bytes()[0];
    match first {
        b' ' | b'-' | b'0'..=b'9' => decode_decimal(text).ok_or_else(invalid),
        b'A'..=b'Z' => decode_pure(true, text)
            .map(|v| v - 10 * pow36(width - 1) + pow10(width))
            .ok_or_else(invalid),
        b'a'..=b'z' => decode_pure(false, text)
            .map(|v| v + 16 * pow36(width - 1) + pow10(width))
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn decode_decimal(text: &str) -> Option<i64> {
    let trimmed = text.trim_start_matches(' ');
    if trimmed.is_empty() {
        return Some(0);
    }
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

pub fn encode_serial(value: i64) -> Result<String, Hy36Error> {
    encode(SERIAL_WIDTH, value)
}

pub fn decode_serial(text: &str) -> Result<i64, Hy36Error> {
    decode(SERIAL_WIDTH, &format!("{text:>SERIAL_WIDTH$}"))
}

pub fn encode_resseq(value: i64) -> Result<String, Hy36Error> {
    encode(RESSEQ_WIDTH, value)
}

/// Decodes a residue sequence number, right-justifying short input first.
pub fn decode_resseq(text: &str) -> Result<i64, Hy36Error> {
    decode(RESSEQ_WIDTH, &format!("{text:>RESSEQ_WIDTH$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_range_is_right_justified() {
        assert_eq!(encode(5, 1).unwrap(), "    1");
        assert_eq!(encode(5, 99999).unwrap(), "99999");
        assert_eq!(encode(4, -999).unwrap(), "-999");
        assert_eq!(encode(4, 0).unwrap(), "   0");
    }

    #[test]
    fn first_overflow_values_switch_to_upper_case() {
        assert_eq!(encode(5, 100000).unwrap(), "A0000");
        assert_eq!(encode(4, 10000).unwrap(), "A000");
        assert_eq!(decode(5, "A0000").unwrap(), 100000);
        assert_eq!(decode(4, "A000").unwrap(), 10000);
        assert_eq!(encode(4, 10035).unwrap(), "A00Z");
        assert_eq!(encode(4, 10036).unwrap(), "A010");
    }

    #[test]
    fn tier_boundaries_are_exact() {
        let upper_last = 10_i64.pow(4) + 26 * 36_i64.pow(3) - 1;
        assert_eq!(encode(4, upper_last).unwrap(), "ZZZZ");
        assert_eq!(encode(4, upper_last + 1).unwrap(), "a000");
        assert_eq!(encode(4, max_value(4)).unwrap(), "zzzz");
        assert_eq!(decode(4, "zzzz").unwrap(), max_value(4));
        assert_eq!(decode(5, "zzzzz").unwrap(), max_value(5));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(
            encode(4, max_value(4) + 1),
            Err(Hy36Error::OutOfRange {
                width: 4,
                value: max_value(4) + 1
            })
        );
        assert!(matches!(
            encode(5, -10000),
            Err(Hy36Error::OutOfRange { .. })
        ));
        assert_eq!(encode(5, -9999).unwrap(), "-9999");
    }

    #[test]
    fn invalid_literals_are_rejected() {
        assert!(matches!(
            decode(4, "12"),
            Err(Hy36Error::InvalidLiteral { .. })
        ));
        assert!(decode(4, "A0a0").is_err());
        assert!(decode(4, "a0A0").is_err());
        assert!(decode(4, " 1 2").is_err());
        assert!(decode(4, "1-23").is_err());
        assert!(decode(4, "   -").is_err());
        assert!(decode(4, "#123").is_err());
    }

    #[test]
    fn blank_field_decodes_to_zero() {
        assert_eq!(decode(5, "     ").unwrap(), 0);
        assert_eq!(decode_resseq("").unwrap(), 0);
    }

    #[test]
    fn round_trip_holds_across_all_tiers() {
        for width in [4_usize, 5] {
            let boundaries = [
                min_value(width),
                -1,
                0,
                1,
                pow10(width) - 1,
                pow10(width),
                pow10(width) + 26 * pow36(width - 1) - 1,
                pow10(width) + 26 * pow36(width - 1),
                max_value(width),
            ];
            for value in boundaries {
                let text = encode(width, value).unwrap();
                assert_eq!(text.len(), width);
                assert_eq!(decode(width, &text).unwrap(), value, "width {width}");
            }
            let step = (max_value(width) - min_value(width)) / 997;
            let mut value = min_value(width);
            while value <= max_value(width) {
                let text = encode(width, value).unwrap();
                assert_eq!(decode(width, &text).unwrap(), value);
                value += step;
            }
        }
    }

    #[test]
    fn resseq_helpers_right_justify_short_text() {
        assert_eq!(decode_resseq("12").unwrap(), 12);
        assert_eq!(decode_serial("A0000").unwrap(), 100000);
        assert_eq!(encode_resseq(12).unwrap(), "  12");
    }
}
