//! Tick payload decoder
//!
//! Payload layout: `fmttime;open;high;low;close;volume;percent_change;change`.
//! Empty tokens are skipped, so `a;;b` carries two fields, and anything after
//! the eighth field is ignored.

use super::types::{DecodeError, DecodeMode, TickRecord, FIELD_COUNT, MAX_TIME_LEN};

const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "time",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "percent_change",
    "change",
];

/// Decode a tick payload into a [`TickRecord`]
///
/// Decoding is all-or-nothing: a record is only returned when all eight
/// fields are present and, in [`DecodeMode::Strict`], valid.
pub fn decode(payload: &str, mode: DecodeMode) -> Result<TickRecord, DecodeError> {
    let mut fields = [""; FIELD_COUNT];
    let mut found = 0;
    for (slot, token) in fields
        .iter_mut()
        .zip(payload.split(';').filter(|t| !t.is_empty()))
    {
        *slot = token;
        found += 1;
    }

    if found < FIELD_COUNT {
        return Err(DecodeError::FieldCountMismatch {
            expected: FIELD_COUNT,
            found,
        });
    }

    let float = |idx: usize| parse_float(fields[idx], FIELD_NAMES[idx], mode);

    Ok(TickRecord {
        formatted_time: bounded_time(fields[0], mode)?,
        open: float(1)?,
        high: float(2)?,
        low: float(3)?,
        close: float(4)?,
        volume: parse_int(fields[5], FIELD_NAMES[5], mode)?,
        percent_change: float(6)?,
        change: float(7)?,
    })
}

fn bounded_time(raw: &str, mode: DecodeMode) -> Result<String, DecodeError> {
    if raw.len() <= MAX_TIME_LEN {
        return Ok(raw.to_string());
    }
    match mode {
        DecodeMode::Strict => Err(DecodeError::TimeFieldTooLong { len: raw.len() }),
        DecodeMode::Permissive => {
            let mut end = MAX_TIME_LEN;
            while !raw.is_char_boundary(end) {
                end -= 1;
            }
            Ok(raw[..end].to_string())
        }
    }
}

fn parse_float(raw: &str, field: &'static str, mode: DecodeMode) -> Result<f64, DecodeError> {
    match mode {
        DecodeMode::Permissive => Ok(leading_f64(raw)),
        // Decimal text only: `NaN`, `inf` and overflowing exponents are rejected
        DecodeMode::Strict => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| DecodeError::InvalidNumber {
                field,
                value: raw.to_string(),
            }),
    }
}

fn parse_int(raw: &str, field: &'static str, mode: DecodeMode) -> Result<i64, DecodeError> {
    match mode {
        DecodeMode::Permissive => Ok(leading_i64(raw)),
        DecodeMode::Strict => raw.trim().parse().map_err(|_| DecodeError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Parse the longest numeric prefix of `raw`, 0.0 if there is none
fn leading_f64(raw: &str) -> f64 {
    let s = raw.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let rest = &s[end..];
    for special in ["infinity", "inf", "nan"] {
        if rest
            .get(..special.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(special))
        {
            let value = if special == "nan" {
                f64::NAN
            } else {
                f64::INFINITY
            };
            return if bytes[0] == b'-' { -value } else { value };
        }
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one digit follows it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Parse the longest integer prefix of `raw`, saturating at the `i64` bounds
fn leading_i64(raw: &str) -> i64 {
    let s = raw.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let mut bytes = s.bytes().peekable();
    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for b in bytes.take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    const ES1: &str = "09:30:00;4518.25;4522.00;4517.75;4521.50;12345;0.072;3.25";

    #[test]
    fn test_decode_well_formed_payload() {
        let record = decode(ES1, DecodeMode::Permissive).unwrap();
        assert_eq!(record.formatted_time, "09:30:00");
        assert_eq!(record.open, 4518.25);
        assert_eq!(record.high, 4522.0);
        assert_eq!(record.low, 4517.75);
        assert_eq!(record.close, 4521.5);
        assert_eq!(record.volume, 12345);
        assert_eq!(record.percent_change, 0.072);
        assert_eq!(record.change, 3.25);
    }

    #[test]
    fn test_decode_seven_fields_fails() {
        let err = decode("09:30:00;1;2;3;4;5;6", DecodeMode::Permissive).unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldCountMismatch {
                expected: 8,
                found: 7
            }
        );
    }

    #[test]
    fn test_decode_ignores_fields_after_eighth() {
        let record = decode("09:30:00;1;2;3;4;5;6;7;8", DecodeMode::Permissive).unwrap();
        assert_eq!(record.percent_change, 6.0);
        assert_eq!(record.change, 7.0);
    }

    #[test]
    fn test_decode_empty_payload() {
        let err = decode("", DecodeMode::Permissive).unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldCountMismatch {
                expected: 8,
                found: 0
            }
        );
    }

    #[test]
    fn test_decode_skips_empty_tokens() {
        let record = decode(";09:30:00;;1;2;3;4;5;6;7;", DecodeMode::Permissive).unwrap();
        assert_eq!(record.formatted_time, "09:30:00");
        assert_eq!(record.open, 1.0);
        assert_eq!(record.change, 7.0);

        let err = decode("09:30:00;;;;;;;", DecodeMode::Permissive).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::FieldCountMismatch { found: 1, .. }
        ));
    }

    #[test]
    fn test_permissive_numeric_prefix() {
        let record = decode("t;12.5abc;x;-3e2;  7.25;99bottles;-0.5%;+1.", DecodeMode::Permissive)
            .unwrap();
        assert_eq!(record.open, 12.5);
        assert_eq!(record.high, 0.0);
        assert_eq!(record.low, -300.0);
        assert_eq!(record.close, 7.25);
        assert_eq!(record.volume, 99);
        assert_eq!(record.percent_change, -0.5);
        assert_eq!(record.change, 1.0);
    }

    #[test]
    fn test_leading_f64_edge_cases() {
        assert_eq!(leading_f64(".5"), 0.5);
        assert_eq!(leading_f64("1e"), 1.0);
        assert_eq!(leading_f64("1e+"), 1.0);
        assert_eq!(leading_f64("-"), 0.0);
        assert_eq!(leading_f64("."), 0.0);
        assert_eq!(leading_f64("-inf"), f64::NEG_INFINITY);
        assert_eq!(leading_f64("Infinity"), f64::INFINITY);
        assert!(leading_f64("nan").is_nan());
    }

    #[test]
    fn test_leading_i64_saturates() {
        assert_eq!(leading_i64("99999999999999999999999"), i64::MAX);
        assert_eq!(leading_i64("-99999999999999999999999"), i64::MIN);
        assert_eq!(leading_i64("  -42x"), -42);
        assert_eq!(leading_i64("1.9"), 1);
        assert_eq!(leading_i64("abc"), 0);
    }

    #[test]
    fn test_permissive_truncates_long_time() {
        let long = "x".repeat(40);
        let payload = format!("{long};1;2;3;4;5;6;7");
        let record = decode(&payload, DecodeMode::Permissive).unwrap();
        assert_eq!(record.formatted_time.len(), MAX_TIME_LEN);
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        // 30 ASCII bytes followed by a 2-byte char straddling the limit
        let time = format!("{}é", "a".repeat(30));
        let payload = format!("{time};1;2;3;4;5;6;7");
        let record = decode(&payload, DecodeMode::Permissive).unwrap();
        assert_eq!(record.formatted_time, "a".repeat(30));
    }

    #[test]
    fn test_strict_rejects_long_time() {
        let payload = format!("{};1;2;3;4;5;6;7", "x".repeat(32));
        let err = decode(&payload, DecodeMode::Strict).unwrap_err();
        assert_eq!(err, DecodeError::TimeFieldTooLong { len: 32 });
    }

    #[test]
    fn test_strict_rejects_malformed_number() {
        let err = decode("09:30:00;1;2;3;4.5x;5;6;7", DecodeMode::Strict).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidNumber {
                field: "close",
                value: "4.5x".to_string()
            }
        );

        let err = decode("09:30:00;1;2;3;4;5.0;6;7", DecodeMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidNumber { field: "volume", .. }
        ));
    }

    #[test]
    fn test_strict_rejects_non_finite_numbers() {
        let err = decode("09:30:00;1;2;3;NaN;5;inf;7", DecodeMode::Strict).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidNumber {
                field: "close",
                value: "NaN".to_string()
            }
        );

        let err = decode("09:30:00;1;2;3;4;5;infinity;7", DecodeMode::Strict).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidNumber { field: "percent_change", .. }
        ));

        let err = decode("09:30:00;1e400;2;3;4;5;6;7", DecodeMode::Strict).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidNumber { field: "open", .. }));

        // Permissive keeps the legacy prefix reading
        let record = decode("09:30:00;1;2;3;NaN;5;inf;7", DecodeMode::Permissive).unwrap();
        assert!(record.close.is_nan());
        assert_eq!(record.percent_change, f64::INFINITY);
    }

    #[test]
    fn test_strict_accepts_well_formed_payload() {
        let strict = decode(ES1, DecodeMode::Strict).unwrap();
        let permissive = decode(ES1, DecodeMode::Permissive).unwrap();
        assert_eq!(strict, permissive);
    }
}
